//! Local API server.
//!
//! Re-hosts the API handler behind plain HTTP so the webapp can be developed
//! without deploying. Every route except `GET /health` is handled by the
//! function registered under `API_MOCK_HANDLER` (default `api-handler.handler`).
//!
//! Handler panics become 500 responses only when built with unwinding: use the
//! dev profile or `--profile bridge`, not `--release`.

use aws_lambda_website::bridge;
use aws_lambda_website::config::BridgeConfig;
use aws_lambda_website::handler::HandlerRegistry;
use lambda_runtime::tracing::{error, info};
use std::process::ExitCode;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> ExitCode {
    lambda_runtime::tracing::init_default_subscriber();

    let config = match BridgeConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "❌ Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let registry = HandlerRegistry::with_builtin();
    let handler = match registry.resolve(&config.handler) {
        Ok(handler) => handler,
        Err(e) => {
            error!(
                error = %e,
                available = ?registry.names(),
                "❌ Failed to load Lambda handler"
            );
            return ExitCode::FAILURE;
        }
    };
    info!(handler = %config.handler, "✅ Successfully loaded Lambda handler");

    let listener = match TcpListener::bind(config.socket_addr()).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, addr = %config.socket_addr(), "❌ Failed to bind");
            return ExitCode::FAILURE;
        }
    };

    let base = format!("http://localhost:{}", config.port);
    info!("🚀 Local API server running on {base}");
    info!("📡 All routes will be handled by your Lambda function");
    info!("🔍 Health check: {base}/health");
    info!("🔄 Try: curl {base}/test");
    info!("🛑 Press Ctrl+C to stop the server");

    match bridge::serve(listener, handler).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Local API server failed");
            ExitCode::FAILURE
        }
    }
}
