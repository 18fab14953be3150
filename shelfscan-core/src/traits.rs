//! Trait definitions for shelfscan.

use crate::models::NormalizedProduct;

/// A vendor payload that can be mapped into the canonical product shape.
///
/// Implementations must be pure: normalizing the same payload twice yields
/// equal products, and a malformed field never aborts the rest of the
/// record.
pub trait Normalize {
    /// Maps this payload into a [`NormalizedProduct`].
    fn normalize(&self) -> NormalizedProduct;
}

impl Normalize for NormalizedProduct {
    fn normalize(&self) -> NormalizedProduct {
        self.clone()
    }
}
