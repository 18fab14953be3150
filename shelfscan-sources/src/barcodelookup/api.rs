//! Barcode Lookup request building and response classification.

use reqwest::StatusCode;
use shelfscan_fetch::{LookupError, SourceResponse};
use tracing::warn;
use url::Url;

use super::parser::parse_response;
use crate::payload::VendorPayload;
use crate::reply::VendorReply;

/// Products endpoint.
pub const PRODUCTS_URL: &str = "https://api.barcodelookup.com/v3/products";

/// What to query by.
#[derive(Debug, Clone, Copy)]
pub enum Query<'a> {
    /// Exact barcode.
    Barcode(&'a str),
    /// Free-text name with optional brand.
    Search {
        /// Product name.
        name: &'a str,
        /// Brand.
        brand: Option<&'a str>,
    },
}

/// Builds the products URL. The key travels in the query string.
pub fn products_url(query: Query<'_>, key: &str) -> Result<Url, LookupError> {
    let mut url = Url::parse(PRODUCTS_URL).map_err(|e| LookupError::InvalidKey(e.to_string()))?;
    {
        let mut pairs = url.query_pairs_mut();
        match query {
            Query::Barcode(code) => {
                pairs.append_pair("barcode", code);
            }
            Query::Search { name, brand } => {
                let terms = match brand {
                    Some(brand) => format!("{name} {brand}"),
                    None => name.to_string(),
                };
                pairs.append_pair("search", &terms);
            }
        }
        pairs.append_pair("formatted", "y");
        pairs.append_pair("key", key);
    }
    Ok(url)
}

/// Classifies a reply into a payload or one of the lookup failures.
pub fn interpret(reply: &VendorReply) -> Result<SourceResponse, LookupError> {
    match reply.status {
        StatusCode::TOO_MANY_REQUESTS => return Err(reply.rate_limited()),
        StatusCode::NOT_FOUND => return Err(LookupError::NotFound),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            warn!(status = %reply.status, "Barcode Lookup rejected the API key");
            return Err(LookupError::Transport(format!(
                "API key rejected (HTTP {})",
                reply.status
            )));
        }
        status if !status.is_success() => return Err(reply.unexpected_status()),
        _ => {}
    }

    let response = parse_response(&reply.body)?;
    let quota = reply.quota();
    match response.products.into_iter().next() {
        Some(product) => {
            Ok(SourceResponse::new(VendorPayload::BarcodeLookup(product)).with_quota(quota))
        }
        None => Err(LookupError::NotFound),
    }
}
