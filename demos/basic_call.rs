//! Basic example: reading and updating a single resource.
//!
//! This example shows how to:
//! - Configure a client from `PAGERDUTY_*` environment variables
//! - Fetch a resource by path, with the entity envelope removed
//! - Decode the response into a typed struct
//! - Inspect response metadata and session metrics
//!
//! Run with: `PAGERDUTY_API_KEY=... cargo run --example basic_call -- PSVC123`

use pdrest::{ClientBuilder, Error};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Service {
    id: String,
    name: String,
    status: String,
    description: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("pdrest=debug,basic_call=info")
        .init();

    let mut client = ClientBuilder::from_env()?.build()?;
    let service_id = std::env::args().nth(1).unwrap_or_else(|| "PSVC123".to_string());

    // GET /services/{id} responds with {"service": {...}}
    println!("=== GET /services/{service_id} ===");
    let response = client.get(format!("/services/{service_id}")).await?;
    println!("Status: {}", response.status);
    println!("Latency: {:?}", response.latency);
    println!("Attempts: {}", response.attempts);
    if let Some(request_id) = response.diagnostics().request_id {
        println!("Request ID: {request_id}");
    }

    let service = response.into_typed::<Service>()?.data;
    println!("Service: {service:#?}\n");

    // the body goes out as {"service": {"description": ...}}
    println!("=== PUT /services/{service_id} ===");
    let description = service.description.unwrap_or_default();
    let updated = client
        .put(
            format!("/services/{service_id}"),
            &json!({"description": description.trim()}),
        )
        .await?;
    println!("Updated: {}\n", updated.data["description"]);

    println!("=== Session metrics ===");
    for (endpoint, metrics) in client.metrics().endpoints() {
        println!("{endpoint}: {} calls in {:?}", metrics.calls, metrics.elapsed);
    }

    Ok(())
}
