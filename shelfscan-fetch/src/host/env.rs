//! Credential lookup.
//!
//! Adapters read their credentials once, at construction, through a
//! [`CredentialSource`]. A missing or blank value reads as absent, which
//! makes the adapter report itself unconfigured rather than fail.

use std::collections::HashMap;

use tracing::trace;

/// Read-only credential store keyed by variable name.
pub trait CredentialSource: Send + Sync {
    /// Returns the raw value for `name`, if set.
    fn raw(&self, name: &str) -> Option<String>;

    /// Returns the trimmed value for `name`, treating blanks as absent.
    fn get(&self, name: &str) -> Option<String> {
        let value = self.raw(name)?;
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    /// Returns the first non-blank value among `names`.
    fn first(&self, names: &[&str]) -> Option<String> {
        names.iter().find_map(|name| {
            let value = self.get(name);
            trace!(name, found = value.is_some(), "Credential lookup");
            value
        })
    }
}

/// Reads credentials from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl CredentialSource for ProcessEnv {
    fn raw(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Fixed credentials, for tests and explicit configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    values: HashMap<String, String>,
}

impl StaticCredentials {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one credential.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl CredentialSource for StaticCredentials {
    fn raw(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_reads_as_absent() {
        let creds = StaticCredentials::new().with("KEY", "   ");
        assert_eq!(creds.get("KEY"), None);
        assert_eq!(creds.get("MISSING"), None);
    }

    #[test]
    fn test_first_takes_precedence_order() {
        let creds = StaticCredentials::new()
            .with("LEGACY", "old")
            .with("PRIMARY", " new ");
        assert_eq!(creds.first(&["PRIMARY", "LEGACY"]).as_deref(), Some("new"));
        assert_eq!(creds.first(&["NOPE", "LEGACY"]).as_deref(), Some("old"));
        assert_eq!(creds.first(&["NOPE"]), None);
    }
}
