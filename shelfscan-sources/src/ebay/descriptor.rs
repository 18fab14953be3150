//! eBay descriptor.

use std::sync::Arc;

use shelfscan_core::OperationKind;
use shelfscan_fetch::ProductSource;

use super::source::{EbaySource, TOKEN_ENVS};
use super::{DISPLAY_NAME, ID, default_tuning};
use crate::descriptor::{SourceDescriptor, SourceSetup};

/// Creates the eBay descriptor.
pub fn ebay_descriptor() -> SourceDescriptor {
    SourceDescriptor {
        id: ID,
        display_name: DISPLAY_NAME,
        homepage: "https://developer.ebay.com/api-docs/buy/browse",
        kinds: &OperationKind::ALL,
        defaults: default_tuning(),
        credential_envs: TOKEN_ENVS,
        credential_optional: false,
        build_source: build,
    }
}

fn build(setup: &SourceSetup<'_>) -> Arc<dyn ProductSource> {
    Arc::new(EbaySource::from_setup(setup))
}
