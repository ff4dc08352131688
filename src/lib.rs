//! # pdrest - A client for the PagerDuty REST API v2
//!
//! pdrest is a retry-aware API client built on top of `reqwest`. It knows the
//! conventions of the PagerDuty REST API v2 and applies them to every call:
//! entity envelopes are added to request bodies and removed from responses,
//! collection endpoints are paginated lazily, and rate limits and server
//! errors are retried with exponential backoff.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdrest::Client;
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Deserialize)]
//! struct Service {
//!     id: String,
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = Client::builder()
//!         .api_key("y_NbAkKc66ryYTWUXYEu")
//!         .default_from("jane.doe@example.com")
//!         .build()?;
//!
//!     // GET /services/{id} responds with {"service": {...}}; data is the service
//!     let service = client.get("/services/PSVC123").await?.into_typed::<Service>()?;
//!     println!("{} ({})", service.data.name, service.data.id);
//!
//!     // the body is sent as {"service": {...}}
//!     let updated = client
//!         .put("/services/PSVC123", &json!({"description": "Checkout API"}))
//!         .await?;
//!     println!("Updated in {:?}", updated.latency);
//!
//!     // iterate over a collection without loading all of it
//!     let mut users = client.list("/users").param("query", "jane");
//!     while let Some(user) = users.try_next().await? {
//!         println!("{}", user["email"]);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Entity wrapping** - Request and response envelopes resolved per endpoint from a table, with a naming heuristic as fallback
//! - **Canonical paths** - Every URL is reduced to its endpoint template (`/users/{id}`) for wrapping, errors, logs and metrics
//! - **Pagination** - Offset and cursor pagination behind one lazy [`Pager`], with early termination and a page ceiling
//! - **Retries** - Exponential backoff for 429, 401, 5xx and network failures, with per-status budgets
//! - **Integration APIs** - The Jira Cloud and Slack integration APIs through [`flavor::IntegrationApi`]
//! - **Session metrics** - Call counts and time per endpoint
//! - **Automatic logging** - Structured logging with `tracing`
//!
//! ## Error Handling
//!
//! Terminal failures are classified, and HTTP-derived errors keep the raw
//! response:
//!
//! ```no_run
//! use pdrest::{Client, Error};
//!
//! # async fn example() -> Result<(), Error> {
//! # let mut client = Client::builder().api_key("my-key").build()?;
//! match client.get("/escalation_policies/PESC123").await {
//!     Ok(response) => println!("Success: {}", response.data),
//!     Err(Error::SchemaMismatch { expected, found, .. }) => {
//!         eprintln!("Expected an \"{expected}\" envelope, but {found}");
//!     }
//!     Err(Error::Client { status, raw_response, .. }) => {
//!         eprintln!("HTTP error {}: {}", status, raw_response);
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Retries
//!
//! ```no_run
//! use pdrest::{Client, RetryConfig};
//! use http::StatusCode;
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), pdrest::Error> {
//! let client = Client::builder()
//!     .api_key("my-key")
//!     .retry_config(
//!         RetryConfig::default()
//!             .max_http_attempts(5)
//!             .backoff_unit(Duration::from_millis(500))
//!             // don't retry failed authentication
//!             .retry_status(StatusCode::UNAUTHORIZED, 0)
//!             // retry 404 twice, e.g. right after creating the resource
//!             .retry_status(StatusCode::NOT_FOUND, 2),
//!     )
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod auth;
pub mod canonical;
mod client;
pub mod diagnostics;
mod error;
pub mod flavor;
pub mod metadata;
pub mod pagination;
mod response;
pub mod retry;
pub mod session;
pub mod tables;
pub mod transport;
pub mod wrapping;

pub use auth::AuthMethod;
pub use client::{Client, ClientBuilder, ResourceRef};
pub use error::{truncate_text, Error, Result};
pub use metadata::RequestMetadata;
pub use pagination::{MatchMode, PaginationError, Pager};
pub use response::Response;
pub use retry::RetryConfig;
