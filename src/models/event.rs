//! API Gateway proxy event, as handed to the API Lambda.
//!
//! Only the fields the handler and the local bridge care about are modelled.
//! Unknown fields sent by the real gateway are ignored on deserialization.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Gateway request event (REST API, Lambda proxy integration)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEvent {
    #[schemars(description = "HTTP method of the inbound request")]
    pub http_method: Option<String>,
    #[schemars(description = "Request path, without the stage prefix")]
    pub path: Option<String>,
    #[serde(default)]
    pub path_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[schemars(description = "Request body, always delivered as a string")]
    pub body: Option<String>,
    #[serde(default)]
    pub request_context: Option<RequestContext>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

/// Per-request metadata attached by the gateway
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    pub request_id: String,
    pub stage: String,
    pub http_method: Option<String>,
    pub path: Option<String>,
}
