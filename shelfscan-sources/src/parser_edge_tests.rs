//! Parser edge case and error handling tests.
//!
//! These tests verify parser behavior with malformed, partial, or edge case inputs.

#[cfg(test)]
mod upcitemdb_parser_edge_tests {
    use crate::upcitemdb::parser::{normalize_upcitemdb, parse_response};

    // ========================================================================
    // JSON Edge Cases
    // ========================================================================

    #[test]
    fn test_parse_empty_json_object() {
        let response = parse_response("{}").unwrap();
        assert!(response.is_ok());
        assert!(response.is_empty());
    }

    #[test]
    fn test_parse_null_items() {
        let response = parse_response(r#"{"code": "OK", "total": 1, "items": null}"#).unwrap();
        assert!(response.is_empty());
    }

    #[test]
    fn test_na_price_string() {
        let json = r#"{"code": "OK", "total": 1, "items": [{
            "title": "Mug",
            "lowest_recorded_price": "N/A",
            "highest_recorded_price": "N/A",
            "offers": [{"merchant": "Shop", "price": "N/A", "list_price": "N/A"}]
        }]}"#;
        let item = parse_response(json).unwrap().into_first().unwrap();
        let product = normalize_upcitemdb(&item);

        assert_eq!(product.title.as_deref(), Some("Mug"));
        assert_eq!(product.lowest_price, None);
        assert_eq!(product.highest_price, None);
        assert_eq!(product.offers[0].price, None);
        assert_eq!(product.offers[0].list_price, None);
    }

    #[test]
    fn test_numeric_codes_and_odd_types() {
        let json = r#"{"items": [{
            "upc": 889698572705,
            "title": ["not", "a", "string"],
            "images": "https://not-a-list.jpg",
            "offers": [{"merchant": null, "domain": null, "price": true}]
        }]}"#;
        // A non-array `images` fails the item; everything else is tolerated.
        assert!(parse_response(json).is_err());

        let json = r#"{"items": [{
            "upc": 889698572705,
            "title": ["not", "a", "string"],
            "offers": [{"merchant": null, "domain": null, "price": true}]
        }]}"#;
        let item = parse_response(json).unwrap().into_first().unwrap();
        let product = normalize_upcitemdb(&item);
        assert_eq!(product.upc.as_deref(), Some("889698572705"));
        assert_eq!(product.title, None);
        assert_eq!(product.offers[0].merchant, "Unknown merchant");
        assert_eq!(product.offers[0].price, None);
    }

    #[test]
    fn test_unicode_fields() {
        let json = r#"{"items": [{"title": "Tasse „Kaffee“ ☕", "brand": "Müller"}]}"#;
        let item = parse_response(json).unwrap().into_first().unwrap();
        let product = normalize_upcitemdb(&item);
        assert_eq!(product.title.as_deref(), Some("Tasse „Kaffee“ ☕"));
        assert_eq!(product.brand.as_deref(), Some("Müller"));
    }

    #[test]
    fn test_bad_currency_falls_back() {
        let json = r#"{"items": [{"currency": "dollars", "offers": [{"merchant": "A", "currency": "$"}]}]}"#;
        let item = parse_response(json).unwrap().into_first().unwrap();
        let product = normalize_upcitemdb(&item);
        assert_eq!(product.currency, "USD");
        assert_eq!(product.offers[0].currency, "USD");
    }

    #[test]
    fn test_truncated_json() {
        assert!(parse_response(r#"{"code": "OK", "items": [{"title": "Mu"#).is_err());
    }
}

#[cfg(test)]
mod barcodelookup_parser_edge_tests {
    use crate::barcodelookup::parser::{normalize_barcodelookup, parse_response};

    #[test]
    fn test_parse_empty_json_object() {
        assert!(parse_response("{}").unwrap().products.is_empty());
    }

    #[test]
    fn test_na_prices() {
        let json = r#"{"products": [{
            "title": "Mug",
            "stores": [{"name": "Shop", "price": "N/A", "sale_price": "N/A"}]
        }]}"#;
        let product = normalize_barcodelookup(&parse_response(json).unwrap().products[0]);
        assert_eq!(product.lowest_price, None);
        assert_eq!(product.offers[0].price, None);
        assert_eq!(product.offers[0].list_price, None);
    }

    #[test]
    fn test_zero_price_is_kept() {
        let json = r#"{"products": [{"stores": [{"name": "Freebies", "price": "0.00"}]}]}"#;
        let product = normalize_barcodelookup(&parse_response(json).unwrap().products[0]);
        assert_eq!(product.lowest_price, Some(0.0));
    }

    #[test]
    fn test_blank_strings_are_absent() {
        let json = r#"{"products": [{
            "barcode_number": " ",
            "title": "",
            "brand": "   ",
            "manufacturer": "",
            "images": ["", "   "]
        }]}"#;
        let product = normalize_barcodelookup(&parse_response(json).unwrap().products[0]);
        assert!(!product.has_identity());
        assert_eq!(product.brand, None);
        assert!(product.images.is_empty());
        assert_eq!(product.dimensions, None);
    }

    #[test]
    fn test_store_without_name() {
        let json = r#"{"products": [{"stores": [{"price": 3}]}]}"#;
        let product = normalize_barcodelookup(&parse_response(json).unwrap().products[0]);
        assert_eq!(product.offers[0].merchant, "Unknown store");
        assert_eq!(product.offers[0].price, Some(3.0));
    }
}

#[cfg(test)]
mod ebay_parser_edge_tests {
    use crate::ebay::parser::{normalize_ebay, parse_page};

    #[test]
    fn test_parse_empty_json_object() {
        let page = parse_page("{}").unwrap();
        assert!(page.is_empty());
        let product = normalize_ebay(&page);
        assert!(product.offers.is_empty());
        assert_eq!(product.currency, "USD");
    }

    #[test]
    fn test_na_price_value() {
        let json = r#"{"total": 1, "itemSummaries": [{
            "title": "Mug",
            "price": {"value": "N/A", "currency": "USD"}
        }]}"#;
        let product = normalize_ebay(&parse_page(json).unwrap());
        assert_eq!(product.title.as_deref(), Some("Mug"));
        assert_eq!(product.lowest_price, None);
        assert_eq!(product.offers[0].price, None);
    }

    #[test]
    fn test_null_nested_objects() {
        let json = r#"{"itemSummaries": [{
            "title": "Mug",
            "image": null,
            "additionalImages": null,
            "seller": null,
            "price": null,
            "categories": null
        }]}"#;
        let product = normalize_ebay(&parse_page(json).unwrap());
        assert!(product.images.is_empty());
        assert_eq!(product.category, None);
        assert_eq!(product.offers[0].merchant, "eBay");
    }

    #[test]
    fn test_gtin_in_summary() {
        let json = r#"{"itemSummaries": [{"title": "Mug", "gtin": "00012345678905"}]}"#;
        let product = normalize_ebay(&parse_page(json).unwrap());
        assert_eq!(product.gtin.as_deref(), Some("00012345678905"));
    }

    #[test]
    fn test_mixed_currencies_keep_their_own() {
        let json = r#"{"itemSummaries": [
            {"price": {"value": "10.00", "currency": "GBP"}},
            {"price": {"value": "12.00", "currency": "USD"}}
        ]}"#;
        let product = normalize_ebay(&parse_page(json).unwrap());
        assert_eq!(product.currency, "GBP");
        assert_eq!(product.offers[1].currency, "USD");
    }
}

#[cfg(test)]
mod payload_edge_tests {
    use shelfscan_core::Normalize;

    use crate::VendorPayload;
    use crate::barcodelookup::parser::parse_response as parse_barcodelookup;
    use crate::ebay::parser::parse_page;
    use crate::upcitemdb::parser::parse_response as parse_upcitemdb;

    fn payloads() -> Vec<VendorPayload> {
        let upc = parse_upcitemdb(r#"{"items": [{"title": "A", "offers": [{"merchant": "M", "price": "$4.00"}]}]}"#)
            .unwrap()
            .into_first()
            .unwrap();
        let bl = parse_barcodelookup(r#"{"products": [{"title": "B", "stores": [{"name": "S", "price": "5"}]}]}"#)
            .unwrap()
            .products
            .remove(0);
        let ebay = parse_page(r#"{"itemSummaries": [{"title": "C", "price": {"value": "6"}}]}"#).unwrap();
        vec![
            VendorPayload::UpcItemDb(upc),
            VendorPayload::BarcodeLookup(bl),
            VendorPayload::Ebay(ebay),
        ]
    }

    #[test]
    fn test_normalize_is_idempotent_for_every_vendor() {
        for payload in payloads() {
            assert_eq!(payload.normalize(), payload.normalize(), "{}", payload.source_id());
        }
    }

    #[test]
    fn test_source_ids() {
        let ids: Vec<&str> = payloads().iter().map(VendorPayload::source_id).collect();
        assert_eq!(ids, vec!["upcitemdb", "barcodelookup", "ebay"]);
    }

    #[test]
    fn test_every_vendor_fills_price_bounds() {
        let lows: Vec<Option<f64>> = payloads().iter().map(|p| p.normalize().lowest_price).collect();
        assert_eq!(lows, vec![Some(4.0), Some(5.0), Some(6.0)]);
    }
}
