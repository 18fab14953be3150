// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # shelfscan Sources
//!
//! Vendor implementations of [`shelfscan_fetch::ProductSource`].
//!
//! Each source module includes:
//!
//! - **Descriptor**: Static configuration (name, default tuning, credentials)
//! - **API**: Request building and response classification
//! - **Parser**: Vendor response types and normalization
//! - **Source**: The `ProductSource` implementation
//!
//! ## Supported Sources
//!
//! | Source | Priority | Lookup | Search | Credential |
//! |--------|----------|--------|--------|------------|
//! | UPCitemdb | 1 | ✅ | ✅ | Optional key (trial without) |
//! | Barcode Lookup | 2 | ✅ | ✅ | API key |
//! | eBay | 3 | ✅ | ✅ | OAuth token or client keys |
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use shelfscan_core::LookupKey;
//! use shelfscan_fetch::{FetchContext, RateBudgetTracker, ResetPolicy};
//! use shelfscan_sources::SourceRegistry;
//!
//! let tracker = Arc::new(RateBudgetTracker::new(ResetPolicy::daily()));
//! let resolver = SourceRegistry::from_env(FetchContext::new(), tracker);
//! let result = resolver.resolve(&LookupKey::parse("889698572705")?).await;
//! ```

pub mod coerce;
pub mod descriptor;
pub mod payload;
pub mod registry;
pub mod reply;

// Source modules (priority order)
pub mod upcitemdb;
pub mod barcodelookup;
pub mod ebay;

mod parser_edge_tests;

// Re-export key types
pub use descriptor::{SourceConfig, SourceDescriptor, SourceSetup, SourceTuning};
pub use payload::VendorPayload;
pub use registry::SourceRegistry;
pub use reply::VendorReply;

// Re-export sources
pub use barcodelookup::{BarcodeLookupSource, barcodelookup_descriptor};
pub use ebay::{EbaySource, ebay_descriptor};
pub use upcitemdb::{UpcItemDbSource, upcitemdb_descriptor};
