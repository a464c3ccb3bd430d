//! Response envelopes: the Lambda proxy response and the payloads carried in its body.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lambda proxy integration response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    #[schemars(description = "Response body, normally JSON-encoded text")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl HandlerResponse {
    /// Status code with the gateway default applied
    #[must_use]
    pub fn status_or_default(&self) -> u16 {
        self.status_code.unwrap_or(200)
    }
}

/// Body of the date/time API response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeResponse {
    pub message: String,
    #[schemars(description = "Milliseconds since the Unix epoch")]
    pub timestamp: i64,
    #[schemars(description = "ISO-8601 date in UTC")]
    pub date: String,
    #[schemars(description = "Locale-formatted local date; display only")]
    pub formatted_date: String,
    pub path: String,
    pub method: String,
}

/// Liveness payload served by the local bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub timestamp: String,
}
