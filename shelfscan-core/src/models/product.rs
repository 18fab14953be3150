//! Canonical product model.
//!
//! Every vendor payload is mapped into a [`NormalizedProduct`]. The shape is
//! closed: fields a vendor does not expose stay `None`, sequences default to
//! empty, and unknown vendor fields are dropped.

use serde::{Deserialize, Serialize};

/// Currency assumed when a vendor does not report one.
pub const DEFAULT_CURRENCY: &str = "USD";

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

// ============================================================================
// Normalized Product
// ============================================================================

/// Canonical product attributes produced by every adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedProduct {
    /// UPC-A code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upc: Option<String>,
    /// EAN-13 code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ean: Option<String>,
    /// GTIN-14 code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gtin: Option<String>,
    /// Product title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Brand name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Model or MPN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Weight as reported by the vendor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    /// Dimensions as reported by the vendor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
    /// Category path or name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// ISO currency of the price bounds.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Lowest known price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lowest_price: Option<f64>,
    /// Highest known price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highest_price: Option<f64>,
    /// Image URLs, de-duplicated, in vendor order.
    #[serde(default)]
    pub images: Vec<String>,
    /// Merchant offers.
    #[serde(default)]
    pub offers: Vec<Offer>,
}

impl NormalizedProduct {
    /// Creates an empty product with the default currency.
    pub fn new() -> Self {
        Self {
            upc: None,
            ean: None,
            gtin: None,
            title: None,
            description: None,
            brand: None,
            model: None,
            color: None,
            size: None,
            weight: None,
            dimensions: None,
            category: None,
            currency: default_currency(),
            lowest_price: None,
            highest_price: None,
            images: Vec::new(),
            offers: Vec::new(),
        }
    }

    /// Appends image URLs, skipping blanks and duplicates.
    pub fn push_images<I, S>(&mut self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for url in urls {
            if let Some(url) = non_empty(Some(url.as_ref())) {
                if !self.images.contains(&url) {
                    self.images.push(url);
                }
            }
        }
    }

    /// Fills missing price bounds from the offers' prices.
    ///
    /// Bounds already reported by the vendor are kept. Only offers in the
    /// product's currency count; prices in other currencies are not compared.
    pub fn derive_price_bounds(&mut self) {
        let prices = self
            .offers
            .iter()
            .filter(|o| o.currency == self.currency)
            .filter_map(|o| o.price);
        let (low, high) = prices.fold((None::<f64>, None::<f64>), |(low, high), p| {
            (
                Some(low.map_or(p, |l| l.min(p))),
                Some(high.map_or(p, |h| h.max(p))),
            )
        });
        if self.lowest_price.is_none() {
            self.lowest_price = low;
        }
        if self.highest_price.is_none() {
            self.highest_price = high;
        }
    }

    /// Returns true if the product carries a title or any identifier.
    pub fn has_identity(&self) -> bool {
        self.title.is_some() || self.upc.is_some() || self.ean.is_some() || self.gtin.is_some()
    }

    /// Stores a barcode in the identifier field its length implies.
    ///
    /// 8 and 13 digits are EANs, 14 a GTIN, anything else a UPC. Fields
    /// already set are left alone.
    pub fn assign_code(&mut self, code: &str) {
        let Some(code) = non_empty(Some(code)) else {
            return;
        };
        let slot = match code.len() {
            8 | 13 => &mut self.ean,
            14 => &mut self.gtin,
            _ => &mut self.upc,
        };
        if slot.is_none() {
            *slot = Some(code);
        }
    }
}

impl Default for NormalizedProduct {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Offer
// ============================================================================

/// One merchant offer for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    /// Merchant or seller name.
    pub merchant: String,
    /// Current price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// List (strike-through) price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_price: Option<f64>,
    /// ISO currency.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Item condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Availability text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
    /// Link to the offer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Offer {
    /// Creates an offer with only a merchant name.
    pub fn new(merchant: impl Into<String>) -> Self {
        Self {
            merchant: merchant.into(),
            price: None,
            list_price: None,
            currency: default_currency(),
            condition: None,
            availability: None,
            link: None,
        }
    }
}

// ============================================================================
// Coercion Helpers
// ============================================================================

/// Parses a price-like string into a float.
///
/// Currency symbols, ISO prefixes and thousands separators are ignored.
/// A single comma followed by one or two digits is a decimal comma
/// (`"12,99"`). Any other comma that is not a thousands separator, and
/// anything that does not leave a finite, non-negative number (including
/// `"N/A"` and empty strings), yields `None`.
pub fn parse_price(raw: &str) -> Option<f64> {
    let kept: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();
    let cleaned = normalize_commas(&kept)?;
    if cleaned.is_empty() {
        return None;
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0)
}

/// Rewrites commas as either a decimal point or nothing.
fn normalize_commas(kept: &str) -> Option<String> {
    if !kept.contains(',') {
        return Some(kept.to_string());
    }

    let groups: Vec<&str> = kept.split(',').collect();
    if groups.len() == 2
        && !groups[0].is_empty()
        && !kept.contains('.')
        && (1..=2).contains(&groups[1].len())
    {
        return Some(kept.replace(',', "."));
    }

    let thousands = !groups[0].is_empty()
        && groups[1..].iter().enumerate().all(|(i, group)| {
            let digits = if i == groups.len() - 2 {
                group.split('.').next().unwrap_or_default()
            } else {
                group
            };
            digits.len() == 3 && digits.chars().all(|c| c.is_ascii_digit())
        });
    thousands.then(|| kept.replace(',', ""))
}

/// Keeps a vendor float only if it is a usable price.
pub fn sanitize_price(value: Option<f64>) -> Option<f64> {
    value.filter(|p| p.is_finite() && *p >= 0.0)
}

/// Trims a vendor string, treating blanks as absent.
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Returns a valid 3-letter currency code, or the default.
pub fn currency_or_default(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|c| c.len() == 3 && c.chars().all(|ch| ch.is_ascii_alphabetic()))
        .map_or_else(default_currency, str::to_ascii_uppercase)
}

// ============================================================================
// Tests
// ============================================================================
