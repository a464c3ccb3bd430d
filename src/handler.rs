use async_trait::async_trait;
use chrono::{DateTime, Local, SecondsFormat, Utc};
use lambda_runtime::tracing::{debug, error, info};
use lambda_runtime::{Context, Diagnostic, LambdaEvent};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::models::{AppError, DateTimeResponse, GatewayEvent, HandlerResponse};

/// Lambda handler string the API function is deployed with.
pub const DEFAULT_HANDLER_NAME: &str = "api-handler.handler";

/// Function name reported to handlers invoked outside Lambda.
pub const LOCAL_FUNCTION_NAME: &str = "ApiFunction";

/// Function version reported to handlers invoked outside Lambda.
pub const LOCAL_FUNCTION_VERSION: &str = "$LATEST";

/// Time budget reported to handlers invoked outside Lambda. Never enforced.
pub const LOCAL_TIME_BUDGET: Duration = Duration::from_millis(30_000);

const RESPONSE_MESSAGE: &str = "API response";

/// Invocation metadata handed to a [`Handler`] next to the event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    pub request_id: String,
    pub function_name: String,
    pub function_version: String,
    remaining_time: Duration,
}

impl InvocationContext {
    /// Context for an invocation emulated on a developer machine.
    #[must_use]
    pub fn local(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            function_name: LOCAL_FUNCTION_NAME.to_string(),
            function_version: LOCAL_FUNCTION_VERSION.to_string(),
            remaining_time: LOCAL_TIME_BUDGET,
        }
    }

    /// Milliseconds left before the invocation deadline, as known when the
    /// context was created.
    #[must_use]
    pub fn remaining_time_in_millis(&self) -> u64 {
        u64::try_from(self.remaining_time.as_millis()).unwrap_or(u64::MAX)
    }
}

impl From<&Context> for InvocationContext {
    fn from(context: &Context) -> Self {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));

        Self {
            request_id: context.request_id.clone(),
            function_name: context.env_config.function_name.clone(),
            function_version: context.env_config.version.clone(),
            remaining_time: Duration::from_millis(context.deadline.saturating_sub(now_ms)),
        }
    }
}

/// A backend entry point: maps one gateway event to one proxy response.
///
/// Implementations are linked into the binary and looked up by name through a
/// [`HandlerRegistry`].
///
/// # Errors
///
/// A failed invocation returns a `Diagnostic`; callers decide how to surface it
/// (the Lambda runtime reports it, the local bridge answers with a 500).
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(
        &self,
        event: GatewayEvent,
        context: InvocationContext,
    ) -> Result<HandlerResponse, Diagnostic>;
}

/// Reference handler: returns the current date and time.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeHandler;

#[async_trait]
impl Handler for DateTimeHandler {
    async fn call(
        &self,
        event: GatewayEvent,
        context: InvocationContext,
    ) -> Result<HandlerResponse, Diagnostic> {
        debug!(
            request_id = %context.request_id,
            path = ?event.path,
            method = ?event.http_method,
            "Building date/time response"
        );
        build_response(&event, Utc::now())
    }
}

/// Headers sent with every API response.
#[must_use]
pub fn cors_headers() -> HashMap<String, String> {
    [
        ("Content-Type", "application/json"),
        ("Access-Control-Allow-Origin", "*"),
        (
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, DELETE, OPTIONS",
        ),
        ("Access-Control-Allow-Headers", "Content-Type, Authorization"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Date/time payload for `event` at instant `now`.
///
/// `formattedDate` uses the host's local time zone, so only its presence is
/// stable across machines.
#[must_use]
pub fn date_time_payload(event: &GatewayEvent, now: DateTime<Utc>) -> DateTimeResponse {
    DateTimeResponse {
        message: RESPONSE_MESSAGE.to_string(),
        timestamp: now.timestamp_millis(),
        date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        formatted_date: now
            .with_timezone(&Local)
            .format("%-m/%-d/%Y, %-I:%M:%S %p")
            .to_string(),
        path: event.path.clone().unwrap_or_else(|| "/".to_string()),
        method: event
            .http_method
            .clone()
            .unwrap_or_else(|| "GET".to_string()),
    }
}

/// Wraps the date/time payload in a proxy response.
///
/// # Errors
///
/// Returns a `SerializationError` diagnostic if the payload cannot be encoded,
/// which does not happen for this payload shape.
pub fn build_response(
    event: &GatewayEvent,
    now: DateTime<Utc>,
) -> Result<HandlerResponse, Diagnostic> {
    let body = serde_json::to_string(&date_time_payload(event, now)).map_err(|e| {
        error!(error = %e, "Failed to serialize response");
        Diagnostic {
            error_type: "SerializationError".to_string(),
            error_message: format!("Failed to serialize response: {e}"),
        }
    })?;

    Ok(HandlerResponse {
        status_code: Some(200),
        headers: Some(cors_headers()),
        body: Some(body),
    })
}

/// Lambda event handler for the API function.
///
/// Logs full event when `RUST_LOG=debug/trace`, only the route in production.
///
/// # Errors
///
/// Propagates the `Diagnostic` of the reference handler (see [`build_response`]).
pub async fn function_handler(
    event: LambdaEvent<GatewayEvent>,
) -> Result<HandlerResponse, Diagnostic> {
    let (payload, context) = event.into_parts();
    debug!("Received event: {:?}", payload);
    info!(
        method = payload.http_method.as_deref().unwrap_or("GET"),
        path = payload.path.as_deref().unwrap_or("/"),
        "Invoking API handler"
    );

    DateTimeHandler
        .call(payload, InvocationContext::from(&context))
        .await
}

/// Named handlers available to the local bridge.
///
/// Resolved once at startup; the resolved handler is then shared read-only.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the reference handler under [`DEFAULT_HANDLER_NAME`].
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(DEFAULT_HANDLER_NAME, Arc::new(DateTimeHandler));
        registry
    }

    /// Registers `handler` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn Handler>) -> &mut Self {
        self.handlers.insert(name.into(), handler);
        self
    }

    /// Looks up the handler registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::HandlerNotFound`] if nothing is registered under `name`.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Handler>, AppError> {
        self.handlers
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::HandlerNotFound(name.to_string()))
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
