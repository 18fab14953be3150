//! Tagged vendor payloads.
//!
//! Every source hands the resolver one [`VendorPayload`]. The variant
//! says which vendor shape it carries; [`Normalize`] maps each shape to
//! the canonical product.

use shelfscan_core::{Normalize, NormalizedProduct};

use crate::barcodelookup::parser::{BarcodeLookupProduct, normalize_barcodelookup};
use crate::ebay::parser::{EbaySearchPage, normalize_ebay};
use crate::upcitemdb::parser::{UpcItemDbItem, normalize_upcitemdb};

/// One vendor's raw answer, not yet normalized.
#[derive(Debug, Clone)]
pub enum VendorPayload {
    /// First matching UPCitemdb item.
    UpcItemDb(UpcItemDbItem),
    /// First matching Barcode Lookup product.
    BarcodeLookup(BarcodeLookupProduct),
    /// A page of eBay item summaries.
    Ebay(EbaySearchPage),
}

impl VendorPayload {
    /// Returns the ID of the source that produced the payload.
    pub fn source_id(&self) -> &'static str {
        match self {
            Self::UpcItemDb(_) => crate::upcitemdb::ID,
            Self::BarcodeLookup(_) => crate::barcodelookup::ID,
            Self::Ebay(_) => crate::ebay::ID,
        }
    }
}

impl Normalize for VendorPayload {
    fn normalize(&self) -> NormalizedProduct {
        match self {
            Self::UpcItemDb(item) => normalize_upcitemdb(item),
            Self::BarcodeLookup(product) => normalize_barcodelookup(product),
            Self::Ebay(page) => normalize_ebay(page),
        }
    }
}
