// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # shelfscan Core
//!
//! Core types, models, and traits for shelfscan.
//!
//! This crate has no I/O. It provides the vocabulary shared by the budget
//! tracker, the source adapters, the resolver, and the CLI:
//!
//! - Lookup keys and operation kinds
//! - Per-source rate budgets
//! - The canonical product shape and its coercion helpers
//! - Resolution results and their route mapping
//!
//! ## Key Types
//!
//! ### Input
//! - [`LookupKey`] - A product code or a name with optional brand
//! - [`OperationKind`] - `lookup` for codes, `search` for names
//!
//! ### Bookkeeping
//! - [`RateBudget`] - `limit`/`used`/`remaining` within a window
//! - [`BudgetSnapshot`] - Exported counters for persistence
//!
//! ### Output
//! - [`NormalizedProduct`] - Canonical product attributes
//! - [`Offer`] - One merchant offer
//! - [`ResolutionResult`] - Product, source, usage snapshot, attempts
//! - [`LookupResponse`] - 200/404 mapping for a route layer

pub mod error;
pub mod models;
pub mod traits;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Input
    LookupKey,
    OperationKind,
    // Bookkeeping
    BudgetEntry,
    BudgetSnapshot,
    RateBudget,
    // Product
    DEFAULT_CURRENCY,
    NormalizedProduct,
    Offer,
    currency_or_default,
    non_empty,
    parse_price,
    sanitize_price,
    // Resolution
    AttemptOutcome,
    LookupBody,
    LookupResponse,
    ResolutionAttempt,
    ResolutionResult,
};

// Re-export traits
pub use traits::Normalize;
