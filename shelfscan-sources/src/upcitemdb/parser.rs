//! UPCitemdb response types and normalization.

use serde::Deserialize;
use shelfscan_core::{NormalizedProduct, Offer, currency_or_default};

use crate::coerce::{loose_count, loose_price, loose_string, null_as_empty, string_list};

/// Merchant name used when an offer names neither merchant nor domain.
const UNKNOWN_MERCHANT: &str = "Unknown merchant";

// ============================================================================
// Response Types
// ============================================================================

/// Body of a lookup or search response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpcItemDbResponse {
    /// `"OK"` or an error code such as `"INVALID_UPC"`.
    #[serde(default, deserialize_with = "loose_string")]
    pub code: Option<String>,
    /// Error message accompanying a non-OK code.
    #[serde(default, deserialize_with = "loose_string")]
    pub message: Option<String>,
    /// Number of matches.
    #[serde(default, deserialize_with = "loose_count")]
    pub total: Option<u64>,
    /// Matching items.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<UpcItemDbItem>,
}

impl UpcItemDbResponse {
    /// Returns true when the code is absent or `"OK"`.
    pub fn is_ok(&self) -> bool {
        self.code.as_deref().is_none_or(|c| c.eq_ignore_ascii_case("OK"))
    }

    /// Returns true when the response reports zero matches.
    pub fn is_empty(&self) -> bool {
        self.total == Some(0) || self.items.is_empty()
    }

    /// Takes the first item.
    pub fn into_first(self) -> Option<UpcItemDbItem> {
        self.items.into_iter().next()
    }
}

/// One product record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpcItemDbItem {
    /// EAN-13.
    #[serde(default, deserialize_with = "loose_string")]
    pub ean: Option<String>,
    /// UPC-A.
    #[serde(default, deserialize_with = "loose_string")]
    pub upc: Option<String>,
    /// GTIN-14.
    #[serde(default, deserialize_with = "loose_string")]
    pub gtin: Option<String>,
    /// Product title.
    #[serde(default, deserialize_with = "loose_string")]
    pub title: Option<String>,
    /// Description.
    #[serde(default, deserialize_with = "loose_string")]
    pub description: Option<String>,
    /// Brand.
    #[serde(default, deserialize_with = "loose_string")]
    pub brand: Option<String>,
    /// Model.
    #[serde(default, deserialize_with = "loose_string")]
    pub model: Option<String>,
    /// Color.
    #[serde(default, deserialize_with = "loose_string")]
    pub color: Option<String>,
    /// Size.
    #[serde(default, deserialize_with = "loose_string")]
    pub size: Option<String>,
    /// Weight, free text.
    #[serde(default, deserialize_with = "loose_string")]
    pub weight: Option<String>,
    /// Dimensions, free text.
    #[serde(default, deserialize_with = "loose_string")]
    pub dimension: Option<String>,
    /// Category path.
    #[serde(default, deserialize_with = "loose_string")]
    pub category: Option<String>,
    /// Currency of the recorded prices.
    #[serde(default, deserialize_with = "loose_string")]
    pub currency: Option<String>,
    /// Lowest price the vendor has seen.
    #[serde(default, deserialize_with = "loose_price")]
    pub lowest_recorded_price: Option<f64>,
    /// Highest price the vendor has seen.
    #[serde(default, deserialize_with = "loose_price")]
    pub highest_recorded_price: Option<f64>,
    /// Image URLs.
    #[serde(default, deserialize_with = "string_list")]
    pub images: Vec<String>,
    /// Merchant offers.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub offers: Vec<UpcItemDbOffer>,
}

/// One merchant offer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpcItemDbOffer {
    /// Merchant name.
    #[serde(default, deserialize_with = "loose_string")]
    pub merchant: Option<String>,
    /// Merchant domain.
    #[serde(default, deserialize_with = "loose_string")]
    pub domain: Option<String>,
    /// Listing title.
    #[serde(default, deserialize_with = "loose_string")]
    pub title: Option<String>,
    /// Offer currency.
    #[serde(default, deserialize_with = "loose_string")]
    pub currency: Option<String>,
    /// List price.
    #[serde(default, deserialize_with = "loose_price")]
    pub list_price: Option<f64>,
    /// Current price.
    #[serde(default, deserialize_with = "loose_price")]
    pub price: Option<f64>,
    /// Shipping note.
    #[serde(default, deserialize_with = "loose_string")]
    pub shipping: Option<String>,
    /// Item condition.
    #[serde(default, deserialize_with = "loose_string")]
    pub condition: Option<String>,
    /// Availability text.
    #[serde(default, deserialize_with = "loose_string")]
    pub availability: Option<String>,
    /// Offer link.
    #[serde(default, deserialize_with = "loose_string")]
    pub link: Option<String>,
}

// ============================================================================
// Parsing
// ============================================================================

/// Parses a response body.
pub fn parse_response(body: &str) -> Result<UpcItemDbResponse, serde_json::Error> {
    serde_json::from_str(body)
}

/// Maps an item to the canonical product.
pub fn normalize_upcitemdb(item: &UpcItemDbItem) -> NormalizedProduct {
    let mut product = NormalizedProduct::new();
    product.upc = item.upc.clone();
    product.ean = item.ean.clone();
    product.gtin = item.gtin.clone();
    product.title = item.title.clone();
    product.description = item.description.clone();
    product.brand = item.brand.clone();
    product.model = item.model.clone();
    product.color = item.color.clone();
    product.size = item.size.clone();
    product.weight = item.weight.clone();
    product.dimensions = item.dimension.clone();
    product.category = item.category.clone();
    product.currency = currency_or_default(item.currency.as_deref());
    product.lowest_price = item.lowest_recorded_price;
    product.highest_price = item.highest_recorded_price;
    product.push_images(&item.images);

    product.offers = item
        .offers
        .iter()
        .map(|o| {
            let merchant = o
                .merchant
                .clone()
                .or_else(|| o.domain.clone())
                .unwrap_or_else(|| UNKNOWN_MERCHANT.to_string());
            let mut offer = Offer::new(merchant);
            offer.price = o.price;
            offer.list_price = o.list_price;
            offer.currency = currency_or_default(o.currency.as_deref().or(item.currency.as_deref()));
            offer.condition = o.condition.clone();
            offer.availability = o.availability.clone();
            offer.link = o.link.clone();
            offer
        })
        .collect();

    product.derive_price_bounds();
    product
}
