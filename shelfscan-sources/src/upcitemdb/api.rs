//! UPCitemdb request building and response classification.

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use shelfscan_fetch::{LookupError, SourceResponse};
use tracing::{debug, warn};
use url::Url;

use super::ID;
use super::error::UpcItemDbError;
use super::parser::parse_response;
use crate::payload::VendorPayload;
use crate::reply::VendorReply;

// ============================================================================
// Constants
// ============================================================================

/// API base URL.
pub const API_BASE: &str = "https://api.upcitemdb.com/prod";

/// Header carrying the paid-plan key.
const USER_KEY_HEADER: &str = "user_key";

/// Key type header the paid plan expects.
const KEY_TYPE_HEADER: &str = "key_type";

// ============================================================================
// Plans
// ============================================================================

/// Which UPCitemdb endpoint family to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    /// Free endpoint, no key.
    Trial,
    /// Keyed endpoint.
    Paid,
}

impl Plan {
    /// Path segment for the plan.
    pub const fn segment(self) -> &'static str {
        match self {
            Self::Trial => "trial",
            Self::Paid => "v1",
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Builds the lookup URL for a code.
pub fn lookup_url(plan: Plan, code: &str) -> Result<Url, LookupError> {
    let base = format!("{API_BASE}/{}/lookup", plan.segment());
    Url::parse_with_params(&base, &[("upc", code)])
        .map_err(|e| LookupError::InvalidKey(e.to_string()))
}

/// Builds the search URL for a name and optional brand.
pub fn search_url(plan: Plan, name: &str, brand: Option<&str>) -> Result<Url, LookupError> {
    let base = format!("{API_BASE}/{}/search", plan.segment());
    let mut url = Url::parse(&base).map_err(|e| LookupError::InvalidKey(e.to_string()))?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("s", name);
        if let Some(brand) = brand {
            query.append_pair("brand", brand);
        }
        query.append_pair("match_mode", "0");
        query.append_pair("type", "product");
    }
    Ok(url)
}

/// Builds request headers. The key headers are only sent on the paid plan.
pub fn request_headers(user_key: Option<&str>) -> Result<HeaderMap, LookupError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if let Some(key) = user_key {
        let value =
            HeaderValue::from_str(key).map_err(|_| LookupError::Unconfigured(ID.to_string()))?;
        headers.insert(USER_KEY_HEADER, value);
        headers.insert(KEY_TYPE_HEADER, HeaderValue::from_static("3scale"));
    }
    Ok(headers)
}

// ============================================================================
// Responses
// ============================================================================

/// Classifies a reply into a payload or one of the lookup failures.
pub fn interpret(reply: &VendorReply) -> Result<SourceResponse, LookupError> {
    if reply.is_rate_limited() {
        return Err(reply.rate_limited());
    }

    let response = match parse_response(&reply.body) {
        Ok(response) => response,
        Err(e) if reply.status.is_success() => {
            warn!(error = %e, "Unreadable UPCitemdb body");
            return Err(e.into());
        }
        Err(_) => return Err(reply.unexpected_status()),
    };

    if !response.is_ok() {
        let code = response.code.as_deref().unwrap_or_default();
        let err = UpcItemDbError::from_code(code, response.message.as_deref());
        debug!(code, "UPCitemdb error code");
        if err.is_rate_limit() {
            return Err(reply.rate_limited());
        }
        return Err(err.into());
    }

    if !reply.status.is_success() {
        return Err(reply.unexpected_status());
    }

    if response.is_empty() {
        return Err(LookupError::NotFound);
    }
    let quota = reply.quota();
    match response.into_first() {
        Some(item) => Ok(SourceResponse::new(VendorPayload::UpcItemDb(item)).with_quota(quota)),
        None => Err(LookupError::NotFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use shelfscan_core::Normalize;
    use shelfscan_fetch::FailureKind;

    #[test]
    fn test_lookup_url() {
        let url = lookup_url(Plan::Trial, "889698572705").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.upcitemdb.com/prod/trial/lookup?upc=889698572705"
        );
        let url = lookup_url(Plan::Paid, "889698572705").unwrap();
        assert!(url.as_str().contains("/prod/v1/lookup"));
    }

    #[test]
    fn test_search_url_encodes_terms() {
        let url = search_url(Plan::Trial, "Wonder Woman", Some("Funko")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.upcitemdb.com/prod/trial/search?s=Wonder+Woman&brand=Funko&match_mode=0&type=product"
        );
        let url = search_url(Plan::Trial, "mug & cup", None).unwrap();
        assert!(url.as_str().contains("s=mug+%26+cup&match_mode=0"));
    }

    #[test]
    fn test_headers_only_with_key() {
        let headers = request_headers(None).unwrap();
        assert!(headers.get(USER_KEY_HEADER).is_none());

        let headers = request_headers(Some("abc123")).unwrap();
        assert_eq!(headers.get(USER_KEY_HEADER).unwrap(), "abc123");
        assert_eq!(headers.get(KEY_TYPE_HEADER).unwrap(), "3scale");

        assert!(request_headers(Some("bad\nkey")).is_err());
    }

    #[test]
    fn test_invalid_upc_body_is_not_found() {
        let reply = VendorReply::new(
            StatusCode::BAD_REQUEST,
            HeaderMap::new(),
            r#"{"code":"INVALID_UPC","message":"Not a valid UPC code."}"#,
        );
        assert_eq!(interpret(&reply).unwrap_err().kind(), FailureKind::NotFound);
    }

    #[test]
    fn test_too_fast_code_is_rate_limited() {
        let reply = VendorReply::new(
            StatusCode::OK,
            HeaderMap::new(),
            r#"{"code":"TOO_FAST","message":"slow down"}"#,
        );
        assert_eq!(interpret(&reply).unwrap_err().kind(), FailureKind::RateLimited);
    }

    #[test]
    fn test_server_error_without_json() {
        let reply = VendorReply::new(
            StatusCode::SERVICE_UNAVAILABLE,
            HeaderMap::new(),
            "<html>down</html>",
        );
        assert_eq!(
            interpret(&reply).unwrap_err().kind(),
            FailureKind::TransportFailure
        );
    }

    #[test]
    fn test_garbage_success_body() {
        let reply = VendorReply::ok("not json");
        assert_eq!(
            interpret(&reply).unwrap_err().kind(),
            FailureKind::TransportFailure
        );
    }

    #[test]
    fn test_match_is_payload() {
        let reply = VendorReply::ok(r#"{"code":"OK","total":1,"items":[{"title":"Mug"}]}"#);
        let response = interpret(&reply).unwrap();
        assert_eq!(response.payload.normalize().title.as_deref(), Some("Mug"));
        assert!(response.quota.is_none());
    }
}
