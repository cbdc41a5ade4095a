//! # Proxy Policy
//!
//! Where a proxied request goes and which headers cross the boundary. The
//! transport itself lives with the HTTP server.

use crate::document::model::ApiDocument;
use crate::error::{AppError, AppResult};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use url::Url;

/// Request headers copied to the upstream request.
pub const FORWARDED_REQUEST_HEADERS: &[&str] = &["accept", "content-type", "cookie"];

/// Upstream response headers never relayed.
pub const DROPPED_RESPONSE_HEADERS: &[&str] = &["transfer-encoding"];

/// Characters escaped inside one path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'%');

/// `https` when any declared scheme is https, `http` otherwise.
pub fn target_scheme(document: &ApiDocument) -> &'static str {
    if document
        .schemes
        .iter()
        .any(|s| s.eq_ignore_ascii_case("https"))
    {
        "https"
    } else {
        "http"
    }
}

/// `<scheme>://<host><basePath>/<tail>[?query]`.
pub fn target_url(document: &ApiDocument, tail: &str, query: Option<&str>) -> AppResult<Url> {
    if document.host.is_empty() {
        return Err(AppError::General(format!(
            "Project '{}' declares no host to proxy to",
            document.info.title
        )));
    }
    let segments: Vec<String> = document
        .base_path
        .split('/')
        .chain(tail.split('/'))
        .filter(|s| !s.is_empty())
        .map(|s| utf8_percent_encode(s, SEGMENT).to_string())
        .collect();
    let mut raw = format!(
        "{}://{}/{}",
        target_scheme(document),
        document.host,
        segments.join("/")
    );
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        raw.push('?');
        raw.push_str(query);
    }
    Url::parse(&raw).map_err(|e| AppError::General(format!("Invalid proxy target '{}': {}", raw, e)))
}

/// Whether a request header is forwarded upstream.
pub fn forwards_request_header(name: &str) -> bool {
    FORWARDED_REQUEST_HEADERS
        .iter()
        .any(|h| h.eq_ignore_ascii_case(name))
}

/// Whether an upstream response header is relayed back.
pub fn relays_response_header(name: &str) -> bool {
    !DROPPED_RESPONSE_HEADERS
        .iter()
        .any(|h| h.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(schemes: &[&str]) -> ApiDocument {
        let mut doc = ApiDocument::new("shop", "1");
        doc.host = "api.shop.io:8443".into();
        doc.base_path = "/v1/".into();
        doc.schemes = schemes.iter().map(|s| s.to_string()).collect();
        doc
    }

    #[test]
    fn test_scheme_choice() {
        assert_eq!(target_scheme(&document(&["http"])), "http");
        assert_eq!(target_scheme(&document(&["http", "https"])), "https");
        assert_eq!(target_scheme(&document(&[])), "http");
    }

    #[test]
    fn test_target_url() {
        let url = target_url(&document(&["https"]), "pets/7", Some("limit=2")).unwrap();
        assert_eq!(url.as_str(), "https://api.shop.io:8443/v1/pets/7?limit=2");

        let url = target_url(&document(&["http"]), "/a b/", None).unwrap();
        assert_eq!(url.as_str(), "http://api.shop.io:8443/v1/a%20b");

        let mut hostless = document(&["http"]);
        hostless.host.clear();
        assert!(target_url(&hostless, "x", None).is_err());
    }

    #[test]
    fn test_header_policy() {
        assert!(forwards_request_header("Accept"));
        assert!(forwards_request_header("content-type"));
        assert!(!forwards_request_header("Authorization"));
        assert!(!relays_response_header("Transfer-Encoding"));
        assert!(relays_response_header("Content-Type"));
    }
}
