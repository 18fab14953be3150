//! Fetch context providing access to host APIs.
//!
//! The fetch context is passed to every source call and gives access to the
//! shared HTTP client and the per-call settings.

use std::sync::Arc;
use std::time::Duration;

use crate::host::http::{DEFAULT_TIMEOUT_SECS, HttpClient};

// ============================================================================
// Source Filter
// ============================================================================

/// Which sources a resolution may use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SourceFilter {
    /// Every registered source.
    #[default]
    All,
    /// Only the named sources.
    Only(Vec<String>),
}

impl SourceFilter {
    /// Returns true if the filter admits `source`.
    pub fn allows(&self, source: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(ids) => ids.iter().any(|id| id == source),
        }
    }
}

// ============================================================================
// Fetch Settings
// ============================================================================

/// Settings for source calls.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Which sources to use.
    pub sources: SourceFilter,
    /// Deadline for one source call, pacing excluded.
    pub timeout: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            sources: SourceFilter::All,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl FetchSettings {
    /// Creates settings with custom timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Restricts resolution to the named sources.
    pub fn only_sources(mut self, ids: Vec<String>) -> Self {
        self.sources = SourceFilter::Only(ids);
        self
    }
}

// ============================================================================
// Fetch Context
// ============================================================================

/// Context provided to sources, giving access to host APIs.
pub struct FetchContext {
    /// HTTP client restricted to the vendor hosts.
    pub http: Arc<HttpClient>,
    /// Fetch settings.
    pub settings: FetchSettings,
}

impl FetchContext {
    /// Creates a new fetch context with default settings.
    pub fn new() -> Self {
        Self::with_settings(FetchSettings::default())
    }

    /// Creates a context with custom settings.
    pub fn with_settings(settings: FetchSettings) -> Self {
        Self {
            http: Arc::new(HttpClient::for_vendors(settings.timeout)),
            settings,
        }
    }

    /// Creates a builder for customizing the context.
    pub fn builder() -> FetchContextBuilder {
        FetchContextBuilder::new()
    }

    /// Returns the per-call timeout.
    pub fn timeout(&self) -> Duration {
        self.settings.timeout
    }

    /// Returns true if the settings admit `source`.
    pub fn allows_source(&self, source: &str) -> bool {
        self.settings.sources.allows(source)
    }
}

impl Default for FetchContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FetchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchContext")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Fetch Context Builder
// ============================================================================

/// Builder for constructing a `FetchContext`.
pub struct FetchContextBuilder {
    http: Option<Arc<HttpClient>>,
    settings: FetchSettings,
}

impl FetchContextBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            http: None,
            settings: FetchSettings::default(),
        }
    }

    /// Sets the HTTP client.
    pub fn http(mut self, http: Arc<HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    /// Sets the fetch settings.
    pub fn settings(mut self, settings: FetchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Restricts resolution to the named sources.
    pub fn only_sources(mut self, ids: Vec<String>) -> Self {
        self.settings.sources = SourceFilter::Only(ids);
        self
    }

    /// Sets the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = timeout;
        self
    }

    /// Builds the fetch context.
    pub fn build(self) -> FetchContext {
        let timeout = self.settings.timeout;
        FetchContext {
            http: self
                .http
                .unwrap_or_else(|| Arc::new(HttpClient::for_vendors(timeout))),
            settings: self.settings,
        }
    }
}

impl Default for FetchContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_filter() {
        assert!(SourceFilter::All.allows("ebay"));
        let only = SourceFilter::Only(vec!["upcitemdb".to_string()]);
        assert!(only.allows("upcitemdb"));
        assert!(!only.allows("ebay"));
    }

    #[test]
    fn test_context_builder() {
        let ctx = FetchContext::builder()
            .only_sources(vec!["ebay".to_string()])
            .timeout(Duration::from_secs(10))
            .build();

        assert!(ctx.allows_source("ebay"));
        assert!(!ctx.allows_source("upcitemdb"));
        assert_eq!(ctx.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_default_context() {
        let ctx = FetchContext::new();
        assert_eq!(ctx.settings.sources, SourceFilter::All);
        assert_eq!(ctx.timeout(), Duration::from_secs(5));
    }
}
