// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # shelfscan Fetch
//!
//! Rate budgets, source adapters, and the lookup resolver.
//!
//! ## Budget Tracking
//!
//! - [`budget::RateBudgetTracker`] - Per-source, per-kind call budgets
//! - [`budget::ResetPolicy`] - Rolling or UTC-midnight windows
//! - [`pacing::Pacer`] - Adapter-local minimum spacing between calls
//!
//! ## Sources & Resolution
//!
//! - [`source::ProductSource`] - Trait for vendor implementations
//! - [`source::SourceAdapter`] - Pacing, deadline, and budget bookkeeping
//!   around one source
//! - [`resolver::Resolver`] - Tries sources in priority order
//! - [`context::FetchContext`] - Provides access to host APIs
//!
//! ## Host APIs
//!
//! - [`host::http`] - HTTP client with tracing and domain allowlist
//! - [`host::env`] - Credential lookup
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use shelfscan_core::LookupKey;
//! use shelfscan_fetch::{FetchContext, RateBudgetTracker, ResetPolicy, Resolver};
//!
//! let tracker = Arc::new(RateBudgetTracker::new(ResetPolicy::daily()));
//! let resolver = Resolver::new(FetchContext::new(), tracker)
//!     .with_source(Arc::new(UpcItemDbSource::from_env()));
//!
//! let result = resolver.resolve(&LookupKey::code("889698572705")?).await;
//! ```

pub mod budget;
pub mod context;
pub mod error;
pub mod host;
pub mod pacing;
pub mod resolver;
pub mod source;

// Re-export key types at crate root

// Errors
pub use error::{FailureKind, HttpError, LookupError};

// Host APIs
pub use host::{
    env::{CredentialSource, ProcessEnv, StaticCredentials},
    http::{HttpClient, ResponseExt},
};

// Budgets
pub use budget::{
    BudgetLimits, Clock, ManualClock, RateBudgetTracker, ResetPolicy, SystemClock, VendorQuota,
};
pub use pacing::Pacer;

// Sources & Resolution
pub use context::{FetchContext, FetchContextBuilder, FetchSettings, SourceFilter};
pub use resolver::Resolver;
pub use source::{ProductSource, SourceAdapter, SourceInfo, SourceResponse};
