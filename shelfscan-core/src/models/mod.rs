//! Domain models for shelfscan.
//!
//! ## Submodules
//!
//! - [`lookup`] - Lookup keys and operation kinds
//! - [`budget`] - Per-source rate budgets
//! - [`product`] - The canonical product shape and coercion helpers
//! - [`resolution`] - Resolution results and route mapping

pub mod budget;
pub mod lookup;
pub mod product;
pub mod resolution;

pub use budget::{BudgetEntry, BudgetSnapshot, RateBudget};
pub use lookup::{LookupKey, OperationKind};
pub use product::{
    DEFAULT_CURRENCY, NormalizedProduct, Offer, currency_or_default, non_empty, parse_price,
    sanitize_price,
};
pub use resolution::{
    AttemptOutcome, LookupBody, LookupResponse, ResolutionAttempt, ResolutionResult,
};

#[cfg(test)]
mod serde_tests;
