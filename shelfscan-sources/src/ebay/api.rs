//! eBay Browse request building and response classification.

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use shelfscan_fetch::{LookupError, SourceResponse};
use url::Url;

use super::error::EbayError;
use super::parser::parse_page;
use crate::payload::VendorPayload;
use crate::reply::VendorReply;

/// Item summary search endpoint.
pub const SEARCH_URL: &str = "https://api.ebay.com/buy/browse/v1/item_summary/search";

/// Marketplace all searches run against.
pub const MARKETPLACE_ID: &str = "EBAY_US";

/// Summaries requested per search.
const PAGE_LIMIT: &str = "10";

/// What to search by.
#[derive(Debug, Clone, Copy)]
pub enum Query<'a> {
    /// Exact GTIN/UPC/EAN.
    Gtin(&'a str),
    /// Keywords.
    Keywords {
        /// Product name.
        name: &'a str,
        /// Brand.
        brand: Option<&'a str>,
    },
}

impl<'a> Query<'a> {
    /// Returns the code for a GTIN query.
    pub fn code(&self) -> Option<&'a str> {
        match *self {
            Self::Gtin(code) => Some(code),
            Self::Keywords { .. } => None,
        }
    }
}

/// Builds the search URL.
pub fn search_url(query: Query<'_>) -> Result<Url, LookupError> {
    let mut url = Url::parse(SEARCH_URL).map_err(|e| LookupError::InvalidKey(e.to_string()))?;
    {
        let mut pairs = url.query_pairs_mut();
        match query {
            Query::Gtin(code) => {
                pairs.append_pair("gtin", code);
            }
            Query::Keywords { name, brand } => {
                let terms = match brand {
                    Some(brand) => format!("{name} {brand}"),
                    None => name.to_string(),
                };
                pairs.append_pair("q", &terms);
            }
        }
        pairs.append_pair("limit", PAGE_LIMIT);
    }
    Ok(url)
}

/// Builds the bearer and marketplace headers.
pub fn request_headers(token: &str) -> Result<HeaderMap, EbayError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    let bearer =
        HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| EbayError::InvalidToken)?;
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(
        "X-EBAY-C-MARKETPLACE-ID",
        HeaderValue::from_static(MARKETPLACE_ID),
    );
    Ok(headers)
}

/// Classifies a reply into a payload or one of the lookup failures.
pub fn interpret(reply: &VendorReply, query: Query<'_>) -> Result<SourceResponse, LookupError> {
    match reply.status {
        StatusCode::TOO_MANY_REQUESTS => return Err(reply.rate_limited()),
        StatusCode::UNAUTHORIZED => return Err(EbayError::TokenRejected.into()),
        status if !status.is_success() => return Err(reply.unexpected_status()),
        _ => {}
    }

    let mut page = parse_page(&reply.body)?;
    if page.is_empty() {
        return Err(LookupError::NotFound);
    }
    page.query_code = query.code().map(ToString::to_string);
    Ok(SourceResponse::new(VendorPayload::Ebay(page)).with_quota(reply.quota()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfscan_core::Normalize;
    use shelfscan_fetch::FailureKind;

    #[test]
    fn test_gtin_url() {
        let url = search_url(Query::Gtin("889698572705")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.ebay.com/buy/browse/v1/item_summary/search?gtin=889698572705&limit=10"
        );
    }

    #[test]
    fn test_keyword_url() {
        let url = search_url(Query::Keywords {
            name: "Wonder Woman",
            brand: None,
        })
        .unwrap();
        assert!(url.as_str().ends_with("?q=Wonder+Woman&limit=10"));
    }

    #[test]
    fn test_headers() {
        let headers = request_headers("abc").unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
        assert_eq!(headers.get("x-ebay-c-marketplace-id").unwrap(), "EBAY_US");
        assert!(request_headers("bad\ntoken").is_err());
    }

    #[test]
    fn test_unauthorized_is_transport() {
        let reply = VendorReply::new(StatusCode::UNAUTHORIZED, HeaderMap::new(), "{}");
        let err = interpret(&reply, Query::Gtin("1")).unwrap_err();
        assert_eq!(err.kind(), FailureKind::TransportFailure);
    }

    #[test]
    fn test_zero_total_is_not_found() {
        let reply = VendorReply::ok(r#"{"total": 0, "limit": 10}"#);
        let err = interpret(&reply, Query::Gtin("889698572705")).unwrap_err();
        assert_eq!(err.kind(), FailureKind::NotFound);
    }

    #[test]
    fn test_gtin_query_fills_code() {
        let reply = VendorReply::ok(r#"{"total": 1, "itemSummaries": [{"title": "Mug"}]}"#);
        let response = interpret(&reply, Query::Gtin("0012345678905")).unwrap();
        let product = response.payload.normalize();
        assert_eq!(product.ean.as_deref(), Some("0012345678905"));
        assert_eq!(product.title.as_deref(), Some("Mug"));
    }
}
