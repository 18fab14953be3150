//! Barcode Lookup response types and normalization.

use serde::Deserialize;
use shelfscan_core::{NormalizedProduct, Offer, currency_or_default};

use crate::coerce::{loose_price, loose_string, null_as_empty, string_list};

/// Merchant name used when a store has no name.
const UNKNOWN_STORE: &str = "Unknown store";

// ============================================================================
// Response Types
// ============================================================================

/// Body of a products response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BarcodeLookupResponse {
    /// Matching products.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub products: Vec<BarcodeLookupProduct>,
}

/// One product record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BarcodeLookupProduct {
    /// The barcode digits.
    #[serde(default, deserialize_with = "loose_string")]
    pub barcode_number: Option<String>,
    /// Formats the barcode is known under, e.g. `"UPC-A 889698572705, EAN-13 ..."`.
    #[serde(default, deserialize_with = "loose_string")]
    pub barcode_formats: Option<String>,
    /// Manufacturer part number.
    #[serde(default, deserialize_with = "loose_string")]
    pub mpn: Option<String>,
    /// Model.
    #[serde(default, deserialize_with = "loose_string")]
    pub model: Option<String>,
    /// Title.
    #[serde(default, deserialize_with = "loose_string")]
    pub title: Option<String>,
    /// Category path.
    #[serde(default, deserialize_with = "loose_string")]
    pub category: Option<String>,
    /// Manufacturer.
    #[serde(default, deserialize_with = "loose_string")]
    pub manufacturer: Option<String>,
    /// Brand.
    #[serde(default, deserialize_with = "loose_string")]
    pub brand: Option<String>,
    /// Color.
    #[serde(default, deserialize_with = "loose_string")]
    pub color: Option<String>,
    /// Size.
    #[serde(default, deserialize_with = "loose_string")]
    pub size: Option<String>,
    /// Length.
    #[serde(default, deserialize_with = "loose_string")]
    pub length: Option<String>,
    /// Width.
    #[serde(default, deserialize_with = "loose_string")]
    pub width: Option<String>,
    /// Height.
    #[serde(default, deserialize_with = "loose_string")]
    pub height: Option<String>,
    /// Weight.
    #[serde(default, deserialize_with = "loose_string")]
    pub weight: Option<String>,
    /// Description.
    #[serde(default, deserialize_with = "loose_string")]
    pub description: Option<String>,
    /// Image URLs.
    #[serde(default, deserialize_with = "string_list")]
    pub images: Vec<String>,
    /// Store listings.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub stores: Vec<BarcodeLookupStore>,
}

/// One store listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BarcodeLookupStore {
    /// Store name.
    #[serde(default, deserialize_with = "loose_string")]
    pub name: Option<String>,
    /// Store country.
    #[serde(default, deserialize_with = "loose_string")]
    pub country: Option<String>,
    /// Currency.
    #[serde(default, deserialize_with = "loose_string")]
    pub currency: Option<String>,
    /// Regular price.
    #[serde(default, deserialize_with = "loose_price")]
    pub price: Option<f64>,
    /// Sale price, when on sale.
    #[serde(default, deserialize_with = "loose_price")]
    pub sale_price: Option<f64>,
    /// Listing link.
    #[serde(default, deserialize_with = "loose_string")]
    pub link: Option<String>,
    /// Availability text.
    #[serde(default, deserialize_with = "loose_string")]
    pub availability: Option<String>,
    /// Item condition.
    #[serde(default, deserialize_with = "loose_string")]
    pub condition: Option<String>,
}

// ============================================================================
// Parsing
// ============================================================================

/// Parses a response body.
pub fn parse_response(body: &str) -> Result<BarcodeLookupResponse, serde_json::Error> {
    serde_json::from_str(body)
}

/// Maps a product to the canonical product.
///
/// The barcode lands in `upc`, `ean` or `gtin` by its length. A store's
/// sale price becomes the offer price and its regular price the list price.
pub fn normalize_barcodelookup(item: &BarcodeLookupProduct) -> NormalizedProduct {
    let mut product = NormalizedProduct::new();

    if let Some(code) = &item.barcode_number {
        product.assign_code(code);
    }

    product.title = item.title.clone();
    product.description = item.description.clone();
    product.brand = item.brand.clone().or_else(|| item.manufacturer.clone());
    product.model = item.model.clone().or_else(|| item.mpn.clone());
    product.color = item.color.clone();
    product.size = item.size.clone();
    product.weight = item.weight.clone();
    product.dimensions = dimensions(item);
    product.category = item.category.clone();
    product.push_images(&item.images);

    let first_currency = item.stores.iter().find_map(|s| s.currency.as_deref());
    product.currency = currency_or_default(first_currency);

    product.offers = item
        .stores
        .iter()
        .map(|store| {
            let mut offer = Offer::new(
                store
                    .name
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_STORE.to_string()),
            );
            match store.sale_price {
                Some(sale) => {
                    offer.price = Some(sale);
                    offer.list_price = store.price;
                }
                None => offer.price = store.price,
            }
            offer.currency = currency_or_default(store.currency.as_deref());
            offer.condition = store.condition.clone();
            offer.availability = store.availability.clone();
            offer.link = store.link.clone();
            offer
        })
        .collect();

    product.derive_price_bounds();
    product
}

/// Joins the non-blank measurements as `L x W x H`.
fn dimensions(item: &BarcodeLookupProduct) -> Option<String> {
    let parts: Vec<&str> = [&item.length, &item.width, &item.height]
        .into_iter()
        .filter_map(|d| d.as_deref())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" x "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "products": [{
            "barcode_number": "889698572705",
            "barcode_formats": "UPC-A 889698572705, EAN-13 0889698572705",
            "mpn": "57270",
            "model": "",
            "asin": "B08XYZ",
            "title": "Funko Pop! Heroes: Wonder Woman 1984",
            "category": "Toys & Games > Toys > Dolls",
            "manufacturer": "Funko",
            "brand": "",
            "color": "multicolor",
            "size": "",
            "length": "2.5 in",
            "width": "3.5 in",
            "height": "",
            "weight": "0.4 lb",
            "description": "From Wonder Woman 1984.",
            "images": ["https://images.barcodelookup.com/1.jpg"],
            "stores": [
                {
                    "name": "Target",
                    "country": "US",
                    "currency": "USD",
                    "currency_symbol": "$",
                    "price": "12.99",
                    "sale_price": "9.99",
                    "link": "https://www.target.com/p/1",
                    "availability": "in stock"
                },
                {
                    "name": "Amazon Marketplace",
                    "country": "DE",
                    "currency": "eur",
                    "price": "24.50",
                    "sale_price": "",
                    "link": "https://www.amazon.de/dp/1"
                }
            ]
        }]
    }"#;

    fn first() -> BarcodeLookupProduct {
        parse_response(BODY).unwrap().products.remove(0)
    }

    #[test]
    fn test_identity_fields() {
        let product = normalize_barcodelookup(&first());
        assert_eq!(product.upc.as_deref(), Some("889698572705"));
        assert_eq!(product.ean, None);
        assert_eq!(product.brand.as_deref(), Some("Funko"));
        assert_eq!(product.model.as_deref(), Some("57270"));
        assert_eq!(product.dimensions.as_deref(), Some("2.5 in x 3.5 in"));
        assert_eq!(product.currency, "USD");
    }

    #[test]
    fn test_sale_price_wins() {
        let product = normalize_barcodelookup(&first());
        let target = &product.offers[0];
        assert_eq!(target.merchant, "Target");
        assert_eq!(target.price, Some(9.99));
        assert_eq!(target.list_price, Some(12.99));
        assert_eq!(target.availability.as_deref(), Some("in stock"));
    }

    #[test]
    fn test_second_store_currency() {
        let product = normalize_barcodelookup(&first());
        let amazon = &product.offers[1];
        assert_eq!(amazon.currency, "EUR");
        assert_eq!(amazon.list_price, None);
        assert_eq!(product.lowest_price, Some(9.99));
    }

    #[test]
    fn test_ean_by_length() {
        let item = BarcodeLookupProduct {
            barcode_number: Some("4006381333931".to_string()),
            ..BarcodeLookupProduct::default()
        };
        let product = normalize_barcodelookup(&item);
        assert_eq!(product.ean.as_deref(), Some("4006381333931"));
        assert_eq!(product.upc, None);
    }

    #[test]
    fn test_empty_products() {
        assert!(parse_response(r#"{"products": []}"#).unwrap().products.is_empty());
        assert!(parse_response(r#"{"products": null}"#).unwrap().products.is_empty());
    }
}
