//! UPCitemdb descriptor.

use std::sync::Arc;

use shelfscan_core::OperationKind;
use shelfscan_fetch::ProductSource;

use super::source::{KEY_ENVS, UpcItemDbSource};
use super::{DISPLAY_NAME, ID, default_tuning};
use crate::descriptor::{SourceDescriptor, SourceSetup};

/// Creates the UPCitemdb descriptor.
pub fn upcitemdb_descriptor() -> SourceDescriptor {
    SourceDescriptor {
        id: ID,
        display_name: DISPLAY_NAME,
        homepage: "https://www.upcitemdb.com",
        kinds: &OperationKind::ALL,
        defaults: default_tuning(),
        credential_envs: KEY_ENVS,
        credential_optional: true,
        build_source: build,
    }
}

fn build(setup: &SourceSetup<'_>) -> Arc<dyn ProductSource> {
    Arc::new(UpcItemDbSource::from_setup(setup))
}
