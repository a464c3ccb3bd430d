//! Builds the gateway event for an inbound HTTP request.

use axum::extract::Query;
use axum::http::{HeaderMap, Method, Uri};
use rand::Rng;
use std::borrow::Cow;
use std::collections::HashMap;

use crate::models::{GatewayEvent, RequestContext};

/// Stage label reported by the local bridge.
pub const LOCAL_STAGE: &str = "local";

const REQUEST_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const REQUEST_ID_LEN: usize = 11;

/// Fresh pseudo-random request id (lowercase base36).
#[must_use]
pub fn generate_request_id() -> String {
    let mut rng = rand::thread_rng();
    (0..REQUEST_ID_LEN)
        .map(|_| char::from(REQUEST_ID_ALPHABET[rng.gen_range(0..REQUEST_ID_ALPHABET.len())]))
        .collect()
}

/// Parses the query string of `uri` into single-valued parameters. Repeated
/// keys keep the last value, as the gateway's `queryStringParameters` does.
#[must_use]
pub fn parse_query(uri: &Uri) -> HashMap<String, String> {
    Query::<HashMap<String, String>>::try_from_uri(uri)
        .map(|Query(params)| params)
        .unwrap_or_default()
}

/// Path parameters of the `{proxy+}` catch-all resource.
#[must_use]
pub fn proxy_path_parameters(path: &str) -> HashMap<String, String> {
    let proxy = path.trim_start_matches('/');
    if proxy.is_empty() {
        HashMap::new()
    } else {
        let proxy = urlencoding::decode(proxy).map_or_else(|_| proxy.to_string(), Cow::into_owned);
        HashMap::from([("proxy".to_string(), proxy)])
    }
}

/// Flattens request headers into a lowercase-keyed map; repeated headers are
/// joined with `", "`.
#[must_use]
pub fn headers_to_map(headers: &HeaderMap) -> HashMap<String, String> {
    let mut map: HashMap<String, String> = HashMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        map.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    map
}

/// String form of a request body.
///
/// JSON bodies are re-serialized compactly; any other payload is passed as
/// (lossy) UTF-8 text. An empty body becomes `None`.
#[must_use]
pub fn serialize_body(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(value) => Some(value.to_string()),
        Err(_) => Some(String::from_utf8_lossy(body).into_owned()),
    }
}

/// Synthesizes the gateway event for one request.
#[must_use]
pub fn build_event(
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: &[u8],
    request_id: &str,
) -> GatewayEvent {
    let path = uri.path().to_string();

    GatewayEvent {
        http_method: Some(method.as_str().to_string()),
        path_parameters: Some(proxy_path_parameters(&path)),
        query_string_parameters: Some(parse_query(uri)),
        headers: Some(headers_to_map(headers)),
        body: serialize_body(body),
        request_context: Some(RequestContext {
            request_id: request_id.to_string(),
            stage: LOCAL_STAGE.to_string(),
            http_method: Some(method.as_str().to_string()),
            path: Some(path.clone()),
        }),
        path: Some(path),
        is_base64_encoded: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_id_shape() {
        let id = generate_request_id();
        assert_eq!(id.len(), REQUEST_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_ne!(generate_request_id(), generate_request_id());
    }

    #[test]
    fn test_parse_query() {
        let uri: Uri = "/q?name=John+Doe&city=S%C3%A3o%20Paulo&flag&x=1&x=2"
            .parse()
            .unwrap();
        let params = parse_query(&uri);
        assert_eq!(params["name"], "John Doe");
        assert_eq!(params["city"], "São Paulo");
        assert_eq!(params["flag"], "");
        assert_eq!(params["x"], "2");
    }

    #[test]
    fn test_parse_query_empty() {
        assert!(parse_query(&Uri::from_static("/q")).is_empty());
        assert!(parse_query(&Uri::from_static("/q?")).is_empty());
    }

    #[test]
    fn test_proxy_path_parameters() {
        assert!(proxy_path_parameters("/").is_empty());
        assert_eq!(proxy_path_parameters("/api/time")["proxy"], "api/time");
        assert_eq!(proxy_path_parameters("/a%20b+c")["proxy"], "a b+c");
    }

    #[test]
    fn test_repeated_headers_are_joined() {
        let mut headers = HeaderMap::new();
        headers.append("accept", HeaderValue::from_static("text/html"));
        headers.append("accept", HeaderValue::from_static("application/json"));
        headers.insert("X-Custom", HeaderValue::from_static("yes"));

        let map = headers_to_map(&headers);
        assert_eq!(map["accept"], "text/html, application/json");
        assert_eq!(map["x-custom"], "yes");
    }

    #[test]
    fn test_serialize_body() {
        assert_eq!(serialize_body(b""), None);
        assert_eq!(
            serialize_body(b"{ \"a\" : 1 }").as_deref(),
            Some("{\"a\":1}")
        );
        assert_eq!(serialize_body(b"plain text").as_deref(), Some("plain text"));
    }

    #[test]
    fn test_build_event() {
        let uri: Uri = "/foo/bar?q=1".parse().unwrap();
        let event = build_event(&Method::PUT, &uri, &HeaderMap::new(), b"{}", "req42");

        assert_eq!(event.http_method.as_deref(), Some("PUT"));
        assert_eq!(event.path.as_deref(), Some("/foo/bar"));
        assert_eq!(event.query_string_parameters.unwrap()["q"], "1");
        assert_eq!(event.path_parameters.unwrap()["proxy"], "foo/bar");
        assert_eq!(event.body.as_deref(), Some("{}"));
        assert!(!event.is_base64_encoded);

        let context = event.request_context.unwrap();
        assert_eq!(context.request_id, "req42");
        assert_eq!(context.stage, "local");
        assert_eq!(context.path.as_deref(), Some("/foo/bar"));
    }
}
