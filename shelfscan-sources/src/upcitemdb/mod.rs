//! UPCitemdb source.
//!
//! UPC lookup and name search. Without a key the trial endpoint is used,
//! which the vendor throttles hard; a `user_key` switches to the paid API.
//!
//! Credential variables: `SHELFSCAN_UPCITEMDB_KEY`, `UPCITEMDB_USER_KEY`

use std::time::Duration;

use shelfscan_fetch::BudgetLimits;

use crate::descriptor::SourceTuning;

pub mod api;
mod descriptor;
mod error;
pub mod parser;
mod source;

pub use descriptor::upcitemdb_descriptor;
pub use error::UpcItemDbError;
pub use parser::{UpcItemDbItem, UpcItemDbOffer, UpcItemDbResponse};
pub use source::UpcItemDbSource;

/// Source ID.
pub const ID: &str = "upcitemdb";

/// Display name.
pub const DISPLAY_NAME: &str = "UPCitemdb";

/// Default tuning.
pub const fn default_tuning() -> SourceTuning {
    SourceTuning::new(1, BudgetLimits::new(100, 20), Duration::from_millis(2000))
}
