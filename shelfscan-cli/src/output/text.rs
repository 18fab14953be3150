//! Text output formatting with progress bars and colors.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Local, Utc};
use shelfscan_core::{
    AttemptOutcome, NormalizedProduct, OperationKind, RateBudget, ResolutionAttempt,
    ResolutionResult,
};
use shelfscan_fetch::SourceInfo;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

// Progress bar characters
const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';

/// Offers listed before the rest are summarized.
const MAX_OFFERS: usize = 5;

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    bar_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            bar_width: 10,
        }
    }

    /// Formats a found product.
    pub fn format_product(&self, result: &ResolutionResult) -> String {
        let Some(product) = &result.product else {
            return self.format_not_found(result);
        };
        let mut lines = Vec::new();

        // Header: "Funko Pop! Wonder Woman (upcitemdb)"
        let title = product.title.as_deref().unwrap_or("Untitled product");
        let source = result.source.as_deref().unwrap_or("unknown");
        lines.push(format!("{} ({})", self.bold(title), source));

        let codes = Self::codes(product);
        if !codes.is_empty() {
            lines.push(format!("Codes:    {codes}"));
        }
        if let Some(brand) = &product.brand {
            lines.push(format!("Brand:    {}", self.cyan(brand)));
        }
        if let Some(model) = &product.model {
            lines.push(format!("Model:    {model}"));
        }
        if let Some(category) = &product.category {
            lines.push(format!("Category: {category}"));
        }
        if let Some(price) = Self::price_range(product) {
            lines.push(format!("Price:    {}", self.green(&price)));
        }
        if !product.images.is_empty() {
            lines.push(format!("Images:   {}", product.images.len()));
        }

        if !product.offers.is_empty() {
            lines.push(String::new());
            lines.push(self.dim("Offers:"));
            for offer in product.offers.iter().take(MAX_OFFERS) {
                let price = offer.price.map_or_else(
                    || "−".to_string(),
                    |p| format!("{p:.2} {}", offer.currency),
                );
                let mut line = format!("  {:<24} {price}", offer.merchant);
                if let Some(condition) = &offer.condition {
                    line.push_str(&format!(" ({condition})"));
                }
                lines.push(line);
            }
            let more = product.offers.len().saturating_sub(MAX_OFFERS);
            if more > 0 {
                lines.push(self.dim(&format!("  … and {more} more")));
            }
        }

        lines.join("\n")
    }

    /// Formats a miss, saying whether retrying later may help.
    pub fn format_not_found(&self, result: &ResolutionResult) -> String {
        let mut line = format!("{} for this {}", self.bold("No product found"), result.kind);
        if result.had_transient_failure() {
            line.push_str(&format!(
                "\n{}",
                self.yellow("Some sources failed or were rate limited; try again later")
            ));
            if let Some(secs) = result.retry_after_secs() {
                line.push_str(&format!(" (retry after {secs}s)"));
            }
        } else if result.attempts.iter().all(|a| !a.outcome.was_called()) {
            line.push_str(&format!(
                "\n{}",
                self.dim("No source could be asked. Check `shelfscan sources`.")
            ));
        }
        line
    }

    /// Formats the per-source attempt list.
    pub fn format_attempts(&self, attempts: &[ResolutionAttempt]) -> String {
        let mut lines = vec![self.dim("Attempts:")];
        for attempt in attempts {
            let outcome = self.color_outcome(attempt.outcome);
            let mut line = format!("  {:<14} {outcome}", attempt.source);
            if attempt.outcome.was_called() {
                line.push_str(&format!(" {}", self.dim(&format!("{}ms", attempt.duration_ms))));
            }
            if let Some(error) = &attempt.error {
                line.push_str(&format!(" - {error}"));
            }
            lines.push(line);
        }
        lines.join("\n")
    }

    /// Formats the usage snapshot attached to a resolution.
    pub fn format_usage(&self, usage: &BTreeMap<String, RateBudget>, kind: OperationKind) -> String {
        usage
            .iter()
            .map(|(source, budget)| self.format_budget_line(source, kind, budget))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Formats one budget with a bar of what is left.
    pub fn format_budget_line(&self, source: &str, kind: OperationKind, budget: &RateBudget) -> String {
        let remaining = 100.0 - budget.used_percent();
        let bar = self.progress_bar(remaining);
        let left = self.color_for_percent(
            remaining,
            &format!("{}/{} left", budget.remaining, budget.limit),
        );
        let label = format!("{source} {kind}:");
        format!(
            "{label:<22} {bar} {left}  {}",
            self.dim(&format!("resets {}", format_reset_time(budget.window_reset_at)))
        )
    }

    /// Formats a progress bar.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn progress_bar(&self, percent_remaining: f64) -> String {
        let percent = percent_remaining.clamp(0.0, 100.0);
        let filled = ((percent / 100.0) * self.bar_width as f64).round() as usize;
        let empty = self.bar_width.saturating_sub(filled);

        let bar = format!(
            "{}{}",
            BAR_FULL.to_string().repeat(filled),
            BAR_EMPTY.to_string().repeat(empty)
        );

        self.color_for_percent(percent, &bar)
    }

    /// Formats source listing header.
    pub fn format_sources_header(&self) -> String {
        format!(
            "{:<16} {:<14} {:<9} {:<10} {:<8} {}",
            self.bold("Source"),
            self.bold("ID"),
            self.bold("Priority"),
            self.bold("Lookup"),
            self.bold("Search"),
            self.bold("Spacing")
        )
    }

    /// Formats a single source line.
    pub fn format_source_line(&self, info: &SourceInfo) -> String {
        let status = if info.configured {
            self.green("✓")
        } else {
            self.dim("−")
        };
        let left = |kind: OperationKind, budget: Option<&RateBudget>| {
            if !info.kinds.contains(&kind) {
                return "−".to_string();
            }
            budget.map_or_else(|| "−".to_string(), |b| format!("{}/{}", b.remaining, b.limit))
        };

        format!(
            "{:<16} {:<14} {:<9} {:<10} {:<8} {}ms",
            format!("{} {}", info.name, status),
            info.id,
            info.priority,
            left(OperationKind::Lookup, info.lookup_budget.as_ref()),
            left(OperationKind::Search, info.search_budget.as_ref()),
            info.min_spacing_ms
        )
    }

    // ========================================================================
    // Product helpers
    // ========================================================================

    fn codes(product: &NormalizedProduct) -> String {
        [
            ("UPC", &product.upc),
            ("EAN", &product.ean),
            ("GTIN", &product.gtin),
        ]
        .iter()
        .filter_map(|(label, code)| code.as_ref().map(|c| format!("{label} {c}")))
        .collect::<Vec<_>>()
        .join(", ")
    }

    fn price_range(product: &NormalizedProduct) -> Option<String> {
        let currency = &product.currency;
        match (product.lowest_price, product.highest_price) {
            (Some(low), Some(high)) if (high - low).abs() > f64::EPSILON => {
                Some(format!("{low:.2} - {high:.2} {currency}"))
            }
            (Some(price), _) | (None, Some(price)) => Some(format!("{price:.2} {currency}")),
            (None, None) => None,
        }
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn color_outcome(&self, outcome: AttemptOutcome) -> String {
        let text = outcome.as_str();
        match outcome {
            AttemptOutcome::Success => self.green(text),
            AttemptOutcome::RateLimited | AttemptOutcome::TransportFailure => self.red(text),
            AttemptOutcome::NotFound => self.yellow(text),
            _ => self.dim(text),
        }
    }

    fn color_for_percent(&self, percent: f64, text: &str) -> String {
        if !self.use_colors {
            return text.to_string();
        }

        if percent < 20.0 {
            self.red(text)
        } else if percent < 50.0 {
            self.yellow(text)
        } else {
            self.green(text)
        }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

/// Formats a window end as a countdown, or as a local time when it is a
/// day or more away.
fn format_reset_time(resets_at: DateTime<Utc>) -> String {
    let now = Utc::now();
    if resets_at <= now {
        return "now".to_string();
    }

    let diff = resets_at - now;
    if diff < Duration::hours(1) {
        let mins = diff.num_minutes().max(1);
        format!("in {} minute{}", mins, if mins == 1 { "" } else { "s" })
    } else if diff < Duration::hours(24) {
        let hours = diff.num_hours();
        let mins = diff.num_minutes() % 60;
        if mins > 0 {
            format!("in {hours}h {mins}m")
        } else {
            format!("in {} hour{}", hours, if hours == 1 { "" } else { "s" })
        }
    } else {
        let local = resets_at.with_timezone(&Local);
        local.format("%a at %l:%M %p").to_string().trim().to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================
