//! Barcode Lookup descriptor.

use std::sync::Arc;

use shelfscan_core::OperationKind;
use shelfscan_fetch::ProductSource;

use super::source::{BarcodeLookupSource, KEY_ENVS};
use super::{DISPLAY_NAME, ID, default_tuning};
use crate::descriptor::{SourceDescriptor, SourceSetup};

/// Creates the Barcode Lookup descriptor.
pub fn barcodelookup_descriptor() -> SourceDescriptor {
    SourceDescriptor {
        id: ID,
        display_name: DISPLAY_NAME,
        homepage: "https://www.barcodelookup.com",
        kinds: &OperationKind::ALL,
        defaults: default_tuning(),
        credential_envs: KEY_ENVS,
        credential_optional: false,
        build_source: build,
    }
}

fn build(setup: &SourceSetup<'_>) -> Arc<dyn ProductSource> {
    Arc::new(BarcodeLookupSource::from_setup(setup))
}
