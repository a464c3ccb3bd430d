//! Schema generator for the API wire types.
//!
//! Writes `api_schema.json`: one JSON schema per payload exchanged between the
//! webapp, the gateway and the API function, so front-end types can be
//! generated from the Rust definitions.

use aws_lambda_website::models::{DateTimeResponse, GatewayEvent, HandlerResponse, HealthResponse};
use schemars::{JsonSchema, schema_for};
use serde_json::{Value, json};
use std::fs;

const OUTPUT_FILE: &str = "api_schema.json";

// A named wire type with its schema
struct WireType {
    name: &'static str,
    description: &'static str,
    schema: Value,
}

fn main() {
    let types = vec![
        WireType {
            name: "GatewayEvent",
            description: "Event the gateway (or the local bridge) hands to the API function.",
            schema: generate_schema::<GatewayEvent>(),
        },
        WireType {
            name: "HandlerResponse",
            description: "Proxy response returned by the API function.",
            schema: generate_schema::<HandlerResponse>(),
        },
        WireType {
            name: "DateTimeResponse",
            description: "JSON body of every API response: the current date and time plus the echoed route.",
            schema: generate_schema::<DateTimeResponse>(),
        },
        WireType {
            name: "HealthResponse",
            description: "Liveness payload of the local bridge (GET /health).",
            schema: generate_schema::<HealthResponse>(),
        },
    ];

    write_schema(&types);
    println!("✅ Generated {OUTPUT_FILE} with {} type(s)", types.len());
}

// Generates a draft schema for the given type, without the meta fields
fn generate_schema<T: JsonSchema>() -> Value {
    let mut schema = serde_json::to_value(schema_for!(T)).unwrap_or_else(|e| {
        eprintln!("Failed to serialize schema: {e}");
        std::process::exit(1);
    });

    if let Some(obj) = schema.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
    }

    schema
}

// Writes the collected schemas to OUTPUT_FILE
fn write_schema(types: &[WireType]) {
    let schemas: Vec<Value> = types
        .iter()
        .map(|t| {
            json!({
                "name": t.name,
                "description": t.description,
                "schema": t.schema
            })
        })
        .collect();

    let json = serde_json::to_string_pretty(&schemas).unwrap_or_else(|e| {
        eprintln!("Failed to serialize schema: {e}");
        std::process::exit(1);
    });

    fs::write(OUTPUT_FILE, json).unwrap_or_else(|e| {
        eprintln!("Failed to write {OUTPUT_FILE}: {e}");
        std::process::exit(1);
    });
}
