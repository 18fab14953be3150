//! eBay source.
//!
//! Searches active marketplace listings through the Browse API, by GTIN
//! for code lookups and by keywords for name searches. The listings found
//! are folded into one product with one offer per listing.
//!
//! Credential variables: `SHELFSCAN_EBAY_TOKEN`, `EBAY_OAUTH_TOKEN`, or
//! `SHELFSCAN_EBAY_CLIENT_ID` together with `SHELFSCAN_EBAY_CLIENT_SECRET`

use std::time::Duration;

use shelfscan_fetch::BudgetLimits;

use crate::descriptor::SourceTuning;

pub mod api;
mod descriptor;
mod error;
pub mod parser;
mod source;
pub mod token;

pub use descriptor::ebay_descriptor;
pub use error::EbayError;
pub use parser::{EbayItemSummary, EbaySearchPage};
pub use source::EbaySource;
pub use token::{EbayCredential, TokenCache};

/// Source ID.
pub const ID: &str = "ebay";

/// Display name.
pub const DISPLAY_NAME: &str = "eBay";

/// Default tuning.
pub const fn default_tuning() -> SourceTuning {
    SourceTuning::new(3, BudgetLimits::new(5000, 5000), Duration::from_millis(250))
}
