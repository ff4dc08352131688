//! Example demonstrating lazy pagination over collection endpoints.
//!
//! This example shows how to:
//! - Count a collection without fetching it
//! - Iterate lazily and stop early
//! - Collect a collection into a map keyed by an attribute
//! - Search a collection by attribute
//! - Consume a collection as a `futures` stream
//!
//! Run with: `PAGERDUTY_API_KEY=... cargo run --example pagination`

use futures::TryStreamExt;
use pdrest::{ClientBuilder, MatchMode, PaginationError};

#[tokio::main]
async fn main() -> Result<(), PaginationError> {
    tracing_subscriber::fmt()
        .with_env_filter("pdrest=info,pagination=info")
        .init();

    let mut client = ClientBuilder::from_env()?.build()?;

    println!("=== Counting ===");
    let total = client.get_total("/users").await?;
    println!("{total} users\n");

    println!("=== Lazy iteration ===");
    let mut incidents = client
        .list("/incidents")
        .array_param("statuses", ["triggered", "acknowledged"])
        .page_size(25)
        .with_total()
        .on_item(|incident, n, total| {
            let total = total.map_or("?".to_string(), |t| t.to_string());
            println!("{n}/{total}: {}", incident["summary"]);
        });
    while let Some(incident) = incidents.try_next().await? {
        if incident["urgency"] == "high" {
            println!("Found a high-urgency incident, stopping");
            break;
        }
    }
    println!("Fetched {} pages\n", incidents.pages_fetched());
    drop(incidents);

    println!("=== Keyed map ===");
    let teams = client.dict_all("/teams", "name").await?;
    for (name, team) in &teams {
        println!("{name}: {}", team["id"]);
    }
    println!();

    println!("=== Search ===");
    let found = client
        .list("/escalation_policies")
        .find_by("name", "primary", MatchMode::Contains)
        .await?;
    match found {
        Some(policy) => println!("Found {} ({})\n", policy["name"], policy["id"]),
        None => println!("No matching escalation policy\n"),
    }

    println!("=== Stream ===");
    let names: Vec<String> = client
        .list("/services")
        .into_stream()
        .map_ok(|service| service["name"].as_str().unwrap_or_default().to_string())
        .try_collect()
        .await?;
    println!("{} services: {}", names.len(), names.join(", "));

    Ok(())
}
