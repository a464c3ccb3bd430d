// Local bridge tests: a real server on an ephemeral port, driven over HTTP
#![allow(clippy::unwrap_used, clippy::panic)]

use async_trait::async_trait;
use aws_lambda_website::bridge::serve_with_shutdown;
use aws_lambda_website::handler::{Handler, InvocationContext};
use aws_lambda_website::models::{GatewayEvent, HandlerResponse};
use lambda_runtime::Diagnostic;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Returns the event and context it was invoked with as the JSON body.
struct EchoHandler;

#[async_trait]
impl Handler for EchoHandler {
    async fn call(
        &self,
        event: GatewayEvent,
        context: InvocationContext,
    ) -> Result<HandlerResponse, Diagnostic> {
        let body = json!({
            "event": event,
            "context": {
                "requestId": context.request_id,
                "functionName": context.function_name,
                "functionVersion": context.function_version,
                "remainingTimeInMillis": context.remaining_time_in_millis(),
            }
        });
        Ok(HandlerResponse {
            status_code: Some(200),
            headers: None,
            body: Some(body.to_string()),
        })
    }
}

/// Returns a fixed response.
struct FixedHandler(HandlerResponse);

#[async_trait]
impl Handler for FixedHandler {
    async fn call(
        &self,
        _event: GatewayEvent,
        _context: InvocationContext,
    ) -> Result<HandlerResponse, Diagnostic> {
        Ok(self.0.clone())
    }
}

struct FailingHandler;

#[async_trait]
impl Handler for FailingHandler {
    async fn call(
        &self,
        _event: GatewayEvent,
        _context: InvocationContext,
    ) -> Result<HandlerResponse, Diagnostic> {
        Err(Diagnostic {
            error_type: "HandlerError".to_string(),
            error_message: "database unreachable".to_string(),
        })
    }
}

struct PanickingHandler;

#[async_trait]
impl Handler for PanickingHandler {
    async fn call(
        &self,
        _event: GatewayEvent,
        _context: InvocationContext,
    ) -> Result<HandlerResponse, Diagnostic> {
        panic!("handler exploded");
    }
}

/// Starts a bridge for `handler` and returns its base URL.
async fn spawn_bridge(handler: Arc<dyn Handler>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve_with_shutdown(listener, handler, std::future::pending()));
    format!("http://{addr}")
}

async fn echo(request: reqwest::RequestBuilder) -> Value {
    let response = request.send().await.unwrap();
    assert_eq!(response.status(), 200);
    response.json().await.unwrap()
}

#[tokio::test]
async fn test_event_carries_method_and_path() {
    let base = spawn_bridge(Arc::new(EchoHandler)).await;
    let client = reqwest::Client::new();

    for (method, path) in [
        (reqwest::Method::GET, "/"),
        (reqwest::Method::POST, "/foo"),
        (reqwest::Method::PUT, "/a/b/c"),
        (reqwest::Method::DELETE, "/items/42"),
        (reqwest::Method::PATCH, "/health/deep"),
    ] {
        let body = echo(client.request(method.clone(), format!("{base}{path}"))).await;
        assert_eq!(body["event"]["httpMethod"], method.as_str());
        assert_eq!(body["event"]["path"], path);
        assert_eq!(body["event"]["requestContext"]["stage"], "local");
    }
}

#[tokio::test]
async fn test_event_query_headers_and_body() {
    let base = spawn_bridge(Arc::new(EchoHandler)).await;
    let client = reqwest::Client::new();

    let body = echo(
        client
            .post(format!("{base}/items?color=dark+blue&size=10"))
            .header("X-Api-Key", "secret")
            .json(&json!({"name": "widget", "count": 3})),
    )
    .await;

    let event = &body["event"];
    assert_eq!(event["queryStringParameters"]["color"], "dark blue");
    assert_eq!(event["queryStringParameters"]["size"], "10");
    assert_eq!(event["pathParameters"]["proxy"], "items");
    assert_eq!(event["headers"]["x-api-key"], "secret");
    assert_eq!(event["isBase64Encoded"], false);

    let forwarded: Value = serde_json::from_str(event["body"].as_str().unwrap()).unwrap();
    assert_eq!(forwarded, json!({"name": "widget", "count": 3}));
}

#[tokio::test]
async fn test_empty_body_is_null() {
    let base = spawn_bridge(Arc::new(EchoHandler)).await;
    let body = echo(reqwest::Client::new().get(format!("{base}/time"))).await;
    assert!(body["event"]["body"].is_null());
}

#[tokio::test]
async fn test_context_is_local() {
    let base = spawn_bridge(Arc::new(EchoHandler)).await;
    let body = echo(reqwest::Client::new().get(format!("{base}/time"))).await;

    let context = &body["context"];
    assert_eq!(context["functionName"], "ApiFunction");
    assert_eq!(context["functionVersion"], "$LATEST");
    assert_eq!(context["remainingTimeInMillis"], 30_000);
    assert_eq!(
        context["requestId"],
        body["event"]["requestContext"]["requestId"]
    );
}

#[tokio::test]
async fn test_request_ids_differ() {
    let base = spawn_bridge(Arc::new(EchoHandler)).await;
    let client = reqwest::Client::new();

    let first = echo(client.get(format!("{base}/a"))).await;
    let second = echo(client.get(format!("{base}/a"))).await;
    assert_ne!(first["context"]["requestId"], second["context"]["requestId"]);
}

#[tokio::test]
async fn test_json_body_round_trips() {
    let payload = json!({"nested": {"list": [1, 2.5, "three", null]}, "flag": true});
    let base = spawn_bridge(Arc::new(FixedHandler(HandlerResponse {
        status_code: Some(201),
        headers: Some(HashMap::from([(
            "X-Handler".to_string(),
            "fixed".to_string(),
        )])),
        body: Some(payload.to_string()),
    })))
    .await;

    let response = reqwest::get(format!("{base}/anything")).await.unwrap();
    assert_eq!(response.status(), 201);
    assert_eq!(response.headers()["x-handler"], "fixed");
    assert_eq!(response.headers()["content-type"], "application/json");

    let body: Value = response.json().await.unwrap();
    assert_eq!(body, payload);
}

#[tokio::test]
async fn test_non_json_body_passes_through() {
    let base = spawn_bridge(Arc::new(FixedHandler(HandlerResponse {
        status_code: None,
        headers: None,
        body: Some("plain <b>text</b>, not json {".to_string()),
    })))
    .await;

    let response = reqwest::get(format!("{base}/")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "plain <b>text</b>, not json {");
}

#[tokio::test]
async fn test_handler_error_becomes_500() {
    let base = spawn_bridge(Arc::new(FailingHandler)).await;

    let response = reqwest::get(format!("{base}/boom")).await.unwrap();
    assert_eq!(response.status(), 500);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Internal Server Error");
    assert_eq!(body["message"], "database unreachable");
}

#[tokio::test]
async fn test_handler_panic_becomes_500_and_server_survives() {
    let base = spawn_bridge(Arc::new(PanickingHandler)).await;

    let response = reqwest::get(format!("{base}/boom")).await.unwrap();
    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "handler exploded");

    let health = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(health.status(), 200);
}

#[tokio::test]
async fn test_invalid_status_code_becomes_500() {
    let base = spawn_bridge(Arc::new(FixedHandler(HandlerResponse {
        status_code: Some(42),
        headers: None,
        body: None,
    })))
    .await;

    let response = reqwest::get(format!("{base}/")).await.unwrap();
    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
    assert!(body["message"].as_str().unwrap().contains("status code"));
}

#[tokio::test]
async fn test_health_is_independent_of_handler() {
    let base = spawn_bridge(Arc::new(FailingHandler)).await;

    let response = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["message"].is_string());
    assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_non_get_health_goes_to_handler() {
    let base = spawn_bridge(Arc::new(EchoHandler)).await;
    let body = echo(reqwest::Client::new().post(format!("{base}/health"))).await;
    assert_eq!(body["event"]["httpMethod"], "POST");
    assert_eq!(body["event"]["path"], "/health");
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let base = spawn_bridge(Arc::new(EchoHandler)).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{base}/time"))
        .header("Origin", "http://localhost:5173")
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers()["access-control-allow-origin"], "*");

    let preflight = client
        .request(reqwest::Method::OPTIONS, format!("{base}/time"))
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .unwrap();
    assert!(preflight.status().is_success());
    assert!(
        preflight
            .headers()
            .contains_key("access-control-allow-methods")
    );
}

#[tokio::test]
async fn test_concurrent_requests_are_independent() {
    let base = spawn_bridge(Arc::new(EchoHandler)).await;
    let client = reqwest::Client::new();

    let requests = (0..10).map(|i| {
        let client = client.clone();
        let url = format!("{base}/item/{i}");
        async move { echo(client.get(url)).await }
    });
    let results = futures::future::join_all(requests).await;

    for (i, body) in results.iter().enumerate() {
        assert_eq!(body["event"]["path"], format!("/item/{i}"));
    }
}
