//! HTTP server of the local bridge.
//!
//! Every request except `GET /health` is turned into a gateway event and
//! handed to the configured [`Handler`]. The handler is awaited before the
//! response is written; requests share nothing but the read-only handler.

use axum::extract::{Request, State};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use futures::FutureExt;
use lambda_runtime::tracing::{error, info};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::event::{build_event, generate_request_id};
use super::response::{error_response, into_http_response};
use crate::handler::{Handler, InvocationContext};
use crate::models::{AppError, HealthResponse};

/// Largest request body forwarded to the handler (the synchronous Lambda
/// payload limit).
pub const MAX_BODY_BYTES: usize = 6 * 1024 * 1024;

/// Router state: the handler resolved at startup.
#[derive(Clone)]
pub struct BridgeState {
    handler: Arc<dyn Handler>,
}

/// Builds the bridge router around `handler`.
#[must_use]
pub fn router(handler: Arc<dyn Handler>) -> Router {
    Router::new()
        .route("/health", get(health).fallback(invoke))
        .fallback(invoke)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(BridgeState { handler })
}

/// Serves the bridge on `listener` until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns [`AppError::Io`] if the server fails.
pub async fn serve(listener: TcpListener, handler: Arc<dyn Handler>) -> Result<(), AppError> {
    serve_with_shutdown(listener, handler, shutdown_signal()).await
}

/// Serves the bridge on `listener` until `signal` resolves, then drains
/// in-flight requests.
///
/// # Errors
///
/// Returns [`AppError::Io`] if the server fails.
pub async fn serve_with_shutdown(
    listener: TcpListener,
    handler: Arc<dyn Handler>,
    signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), AppError> {
    axum::serve(listener, router(handler))
        .with_graceful_shutdown(signal)
        .await?;
    info!("Local API server stopped");
    Ok(())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Mock API server is running".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// Forwards one request to the handler. Never fails: every error becomes a 500.
async fn invoke(State(state): State<BridgeState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let request_id = generate_request_id();
    info!(
        method = %parts.method,
        path = %parts.uri.path(),
        request_id = %request_id,
        "Forwarding request to handler"
    );

    let body = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(error = %e, "Failed to read request body");
            return error_response(&e.to_string());
        }
    };

    let event = build_event(&parts.method, &parts.uri, &parts.headers, &body, &request_id);
    let context = InvocationContext::local(request_id);

    let outcome = AssertUnwindSafe(state.handler.call(event, context))
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(response)) => into_http_response(response).unwrap_or_else(|e| {
            error!(error = %e, "Failed to translate handler response");
            error_response(&e.to_string())
        }),
        Ok(Err(diagnostic)) => {
            error!(
                error_type = %diagnostic.error_type,
                error = %diagnostic.error_message,
                "Error calling handler"
            );
            error_response(&diagnostic.error_message)
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(error = %message, "Handler panicked");
            error_response(&message)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "handler panicked".to_string())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = sigterm => {}
    }
    info!("Shutdown signal received, draining connections");
}
