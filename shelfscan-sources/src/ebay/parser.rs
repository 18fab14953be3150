//! eBay Browse response types and normalization.

use serde::Deserialize;
use shelfscan_core::{NormalizedProduct, Offer, currency_or_default};

use crate::coerce::{loose_count, loose_price, loose_string, null_as_empty};

// ============================================================================
// Response Types
// ============================================================================

/// A page of item summaries from `item_summary/search`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbaySearchPage {
    /// Total matches across all pages.
    #[serde(default, deserialize_with = "loose_count")]
    pub total: Option<u64>,
    /// Summaries on this page.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub item_summaries: Vec<EbayItemSummary>,
    /// The code that was searched for, when the search was by GTIN.
    #[serde(skip)]
    pub query_code: Option<String>,
}

impl EbaySearchPage {
    /// Returns true when the page has no summaries.
    pub fn is_empty(&self) -> bool {
        self.total == Some(0) || self.item_summaries.is_empty()
    }
}

/// One listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbayItemSummary {
    /// Listing ID.
    #[serde(default, deserialize_with = "loose_string")]
    pub item_id: Option<String>,
    /// Listing title.
    #[serde(default, deserialize_with = "loose_string")]
    pub title: Option<String>,
    /// Brand aspect.
    #[serde(default, deserialize_with = "loose_string")]
    pub brand: Option<String>,
    /// Primary image.
    #[serde(default)]
    pub image: Option<EbayImage>,
    /// Further images.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub additional_images: Vec<EbayImage>,
    /// Asking price.
    #[serde(default)]
    pub price: Option<EbayAmount>,
    /// Condition text.
    #[serde(default, deserialize_with = "loose_string")]
    pub condition: Option<String>,
    /// Listing page.
    #[serde(default, deserialize_with = "loose_string")]
    pub item_web_url: Option<String>,
    /// Seller.
    #[serde(default)]
    pub seller: Option<EbaySeller>,
    /// Category path, leaf last.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub categories: Vec<EbayCategory>,
    /// GTIN, when eBay knows it.
    #[serde(default, deserialize_with = "loose_string")]
    pub gtin: Option<String>,
    /// eBay product ID.
    #[serde(default, deserialize_with = "loose_string")]
    pub epid: Option<String>,
}

/// Image reference.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbayImage {
    /// Image URL.
    #[serde(default, deserialize_with = "loose_string")]
    pub image_url: Option<String>,
}

/// Money amount. eBay sends the value as a string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EbayAmount {
    /// Amount.
    #[serde(default, deserialize_with = "loose_price")]
    pub value: Option<f64>,
    /// Currency.
    #[serde(default, deserialize_with = "loose_string")]
    pub currency: Option<String>,
}

/// Seller reference.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EbaySeller {
    /// Seller username.
    #[serde(default, deserialize_with = "loose_string")]
    pub username: Option<String>,
}

/// Category reference.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbayCategory {
    /// Category name.
    #[serde(default, deserialize_with = "loose_string")]
    pub category_name: Option<String>,
}

// ============================================================================
// Parsing
// ============================================================================

/// Parses a response body.
pub fn parse_page(body: &str) -> Result<EbaySearchPage, serde_json::Error> {
    serde_json::from_str(body)
}

/// Maps a page of listings to one canonical product.
///
/// Title, brand and category come from the first listing. Images are
/// collected from every listing, and each listing becomes one offer.
pub fn normalize_ebay(page: &EbaySearchPage) -> NormalizedProduct {
    let mut product = NormalizedProduct::new();

    if let Some(first) = page.item_summaries.first() {
        product.title = first.title.clone();
        product.brand = first.brand.clone();
        product.category = category_path(first);
        if let Some(gtin) = &first.gtin {
            product.assign_code(gtin);
        }
    }
    if let Some(code) = &page.query_code {
        product.assign_code(code);
    }

    for summary in &page.item_summaries {
        let images = summary
            .image
            .iter()
            .chain(&summary.additional_images)
            .filter_map(|i| i.image_url.as_deref());
        product.push_images(images);
    }

    product.offers = page.item_summaries.iter().map(offer).collect();
    let first_currency = page
        .item_summaries
        .iter()
        .find_map(|s| s.price.as_ref().and_then(|p| p.currency.as_deref()));
    product.currency = currency_or_default(first_currency);

    product.derive_price_bounds();
    product
}

fn offer(summary: &EbayItemSummary) -> Offer {
    let merchant = match summary.seller.as_ref().and_then(|s| s.username.as_deref()) {
        Some(username) => format!("eBay ({username})"),
        None => "eBay".to_string(),
    };
    let mut offer = Offer::new(merchant);
    if let Some(price) = &summary.price {
        offer.price = price.value;
        offer.currency = currency_or_default(price.currency.as_deref());
    }
    offer.condition = summary.condition.clone();
    offer.link = summary.item_web_url.clone();
    offer
}

fn category_path(summary: &EbayItemSummary) -> Option<String> {
    let names: Vec<&str> = summary
        .categories
        .iter()
        .filter_map(|c| c.category_name.as_deref())
        .collect();
    if names.is_empty() {
        None
    } else {
        Some(names.join(" > "))
    }
}
