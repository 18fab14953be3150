//! Barcode Lookup source.
//!
//! Alternate UPC database with name search. Needs an API key.
//!
//! Credential variables: `SHELFSCAN_BARCODELOOKUP_KEY`, `BARCODELOOKUP_API_KEY`

use std::time::Duration;

use shelfscan_fetch::BudgetLimits;

use crate::descriptor::SourceTuning;

pub mod api;
mod descriptor;
pub mod parser;
mod source;

pub use descriptor::barcodelookup_descriptor;
pub use parser::{BarcodeLookupProduct, BarcodeLookupResponse, BarcodeLookupStore};
pub use source::BarcodeLookupSource;

/// Source ID.
pub const ID: &str = "barcodelookup";

/// Display name.
pub const DISPLAY_NAME: &str = "Barcode Lookup";

/// Default tuning.
pub const fn default_tuning() -> SourceTuning {
    SourceTuning::new(2, BudgetLimits::new(50, 25), Duration::from_millis(1000))
}
