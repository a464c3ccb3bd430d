//! Turns a handler's proxy response back into an HTTP response.

use axum::Json;
use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::models::{AppError, HandlerResponse};

const JSON_CONTENT_TYPE: &str = "application/json";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Converts a proxy response into an HTTP response.
///
/// The body is sent unchanged. When it parses as JSON it is labelled
/// `application/json`, otherwise `text/plain`, unless the handler set its own
/// `Content-Type`. A missing status code means 200.
///
/// # Errors
///
/// Returns [`AppError::InvalidResponse`] for a status code outside 100..=999 or
/// a header name/value that is not valid HTTP.
pub fn into_http_response(response: HandlerResponse) -> Result<Response, AppError> {
    let status = StatusCode::from_u16(response.status_or_default()).map_err(|e| {
        AppError::InvalidResponse(format!(
            "status code {}: {e}",
            response.status_or_default()
        ))
    })?;

    let mut headers = HeaderMap::new();
    for (name, value) in response.headers.unwrap_or_default() {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| AppError::InvalidResponse(format!("header name {name:?}: {e}")))?;
        let header_value = HeaderValue::from_str(&value)
            .map_err(|e| AppError::InvalidResponse(format!("header {name}: {e}")))?;
        headers.insert(header_name, header_value);
    }

    let body = match response.body {
        None => Body::empty(),
        Some(text) => {
            let content_type = if serde_json::from_str::<serde_json::Value>(&text).is_ok() {
                JSON_CONTENT_TYPE
            } else {
                TEXT_CONTENT_TYPE
            };
            headers
                .entry(CONTENT_TYPE)
                .or_insert(HeaderValue::from_static(content_type));
            Body::from(text)
        }
    };

    Ok((status, headers, body).into_response())
}

/// The 500 answer for a failed invocation.
#[must_use]
pub fn error_response(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "Internal Server Error",
            "message": message,
        })),
    )
        .into_response()
}
