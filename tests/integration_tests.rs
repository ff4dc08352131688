//! Integration tests using wiremock to simulate the API.

use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode};
use pdrest::flavor::IntegrationApi;
use pdrest::transport::{
    Transport, TransportError, TransportErrorKind, TransportRequest, TransportResponse,
};
use pdrest::{Client, Error, PaginationError, RequestMetadata, RetryConfig};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn fast_retry() -> RetryConfig {
    RetryConfig::default()
        .backoff_unit(Duration::from_millis(1))
        .jitter_ceiling(Duration::ZERO)
}

fn client_for(server: &MockServer) -> Client {
    init_tracing();
    Client::builder()
        .base_url(server.uri())
        .unwrap()
        .api_key("test-key")
        .retry_config(fast_retry())
        .build()
        .unwrap()
}

fn users(range: std::ops::RangeInclusive<u32>) -> Vec<Value> {
    range
        .map(|n| json!({"id": format!("P{n}"), "name": format!("user-{n}")}))
        .collect()
}

#[tokio::test]
async fn test_get_unwraps_entity_and_sends_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/PABC123"))
        .and(header("Accept", "application/vnd.pagerduty+json;version=2"))
        .and(header("Authorization", "Token token=test-key"))
        .and(header("From", "jane@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"id": "PABC123", "name": "Jane"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .api_key("test-key")
        .default_from("jane@example.com")
        .build()
        .unwrap();

    let response = client.get("/users/PABC123").await.unwrap();

    assert_eq!(response.data, json!({"id": "PABC123", "name": "Jane"}));
    assert_eq!(response.canonical_path, "/users/{id}");
    assert_eq!(response.attempts, 1);
    assert!(!response.was_retried());
}

#[tokio::test]
async fn test_post_wraps_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/teams"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({"team": {"name": "SRE"}})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "team": {"id": "PTEAM1", "name": "SRE"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server);
    let response = client.post("/teams", &json!({"name": "SRE"})).await.unwrap();

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.data["id"], "PTEAM1");
}

#[tokio::test]
async fn test_table_wrapper_overrides_inference() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/incidents/PINC1/merge"))
        .and(body_json(json!({"source_incidents": [{"id": "PINC2", "type": "incident_reference"}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "incident": {"id": "PINC1"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server);
    let response = client
        .put(
            "/incidents/PINC1/merge",
            &json!([{"id": "PINC2", "type": "incident_reference"}]),
        )
        .await
        .unwrap();

    assert_eq!(response.data, json!({"id": "PINC1"}));
}

#[tokio::test]
async fn test_without_wrapping_passes_bodies_through() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/PABC123"))
        .and(query_param("include[]", "contact_methods"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"id": "PABC123"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server);
    let request = RequestMetadata::new(Method::GET, "/users/PABC123")
        .with_query_array("include", ["contact_methods"])
        .without_wrapping();
    let response = client.call(request).await.unwrap();

    assert_eq!(response.data, json!({"user": {"id": "PABC123"}}));
}

#[tokio::test]
async fn test_get_follows_entity_self_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/teams/PTEAM1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "team": {"id": "PTEAM1", "name": "SRE"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server);
    let reference = json!({
        "id": "PTEAM1",
        "type": "team_reference",
        "self": format!("{}/teams/PTEAM1", mock_server.uri()),
    });
    let team = client.get(&reference).await.unwrap();

    assert_eq!(team.data["name"], "SRE");
}

#[tokio::test]
async fn test_url_outside_base_is_rejected() {
    let mock_server = MockServer::start().await;
    let mut client = client_for(&mock_server);

    let err = client
        .get("https://elsewhere.example.com/users/PABC123")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Url(_)));
}

#[tokio::test]
async fn test_delete_with_empty_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/users/PABC123"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server);
    let response = client.delete("/users/PABC123").await.unwrap();

    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(response.data, Value::Null);
}

#[tokio::test]
async fn test_missing_envelope_is_schema_mismatch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/PABC123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "person": {"id": "PABC123"}
        })))
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server);
    let err = client.get("/users/PABC123").await.unwrap_err();

    match err {
        Error::SchemaMismatch {
            expected,
            canonical_path,
            raw_response,
            ..
        } => {
            assert_eq!(expected, "user");
            assert_eq!(canonical_path, "/users/{id}");
            assert!(raw_response.contains("person"));
        }
        other => panic!("Expected SchemaMismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_json_is_deserialization_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/PABC123"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server);
    let err = client.get("/users/PABC123").await.unwrap_err();

    assert!(matches!(err, Error::DeserializationFailed { .. }));
    assert_eq!(err.raw_response(), Some("<html>maintenance</html>"));
}

#[tokio::test]
async fn test_rate_limit_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/PABC123"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too many requests"))
        .up_to_n_times(3)
        .expect(3)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/PABC123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"id": "PABC123"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server);
    let response = client.get("/users/PABC123").await.unwrap();

    assert_eq!(response.attempts, 4);
    assert!(response.was_retried());
    assert!(client.backoff().in_failure_run());
    assert_eq!(client.backoff().timer(), Duration::from_millis(8));
}

#[tokio::test]
async fn test_server_errors_exhaust_budget() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/services"))
        .respond_with(
            ResponseTemplate::new(503)
                .insert_header("x-request-id", "req-503")
                .set_body_string("Service Unavailable"),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    init_tracing();
    let mut client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .api_key("test-key")
        .retry_config(fast_retry().max_http_attempts(2))
        .build()
        .unwrap();

    let err = client
        .call(RequestMetadata::new(Method::GET, "/services"))
        .await
        .unwrap_err();

    match err {
        Error::Server {
            status,
            raw_response,
            headers,
            canonical_path,
        } => {
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
            assert_eq!(raw_response, "Service Unavailable");
            assert_eq!(headers["x-request-id"], "req-503");
            assert_eq!(canonical_path, "/services");
        }
        other => panic!("Expected Server error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/PNOPE"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"message": "Not Found", "code": 2100}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server);
    let err = client.get("/users/PNOPE").await.unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(err.canonical_path(), Some("/users/{id}"));
    assert!(matches!(err, Error::Client { .. }));
}

#[tokio::test]
async fn test_status_override_retries_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/PNEW"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/PNEW"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": {"id": "PNEW"}})))
        .mount(&mock_server)
        .await;

    init_tracing();
    let mut client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .api_key("test-key")
        .retry_config(fast_retry().retry_status(StatusCode::NOT_FOUND, 1))
        .build()
        .unwrap();

    let response = client.get("/users/PNEW").await.unwrap();
    assert_eq!(response.attempts, 2);
}

#[tokio::test]
async fn test_exhausted_rate_limit_carries_retry_after() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .expect(1)
        .mount(&mock_server)
        .await;

    init_tracing();
    let mut client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .api_key("test-key")
        .retry_config(fast_retry().max_http_attempts(1))
        .build()
        .unwrap();

    let err = client
        .call(RequestMetadata::new(Method::GET, "/users"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::TOO_MANY_REQUESTS));
    assert_eq!(err.retry_after(), Some(Duration::from_secs(30)));
}

#[tokio::test]
async fn test_method_not_permitted_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut client = Client::builder()
        .flavor(IntegrationApi::jira_cloud())
        .base_url(mock_server.uri())
        .unwrap()
        .api_key("test-key")
        .build()
        .unwrap();

    let err = client
        .post("/accounts_mappings", &json!({"name": "Jira"}))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MethodNotPermitted { method, .. } if method == Method::POST));
    assert_eq!(client.metrics().total_calls(), 0);
}

#[tokio::test]
async fn test_integration_api_uses_json_accept() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts_mappings"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accounts_mappings": [{"id": "PJIRA1"}],
            "more": false
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = Client::builder()
        .flavor(IntegrationApi::jira_cloud())
        .base_url(mock_server.uri())
        .unwrap()
        .api_key("test-key")
        .build()
        .unwrap();

    let mappings = client.list_all("/accounts_mappings").await.unwrap();
    assert_eq!(mappings, vec![json!({"id": "PJIRA1"})]);
}

#[tokio::test]
async fn test_metrics_per_canonical_endpoint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/P1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": {"id": "P1"}})))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/P2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server);
    client.get("/users/P1").await.unwrap();
    client.get("/users/P2").await.unwrap_err();

    let metrics = client.metrics().endpoint("GET /users/{id}").unwrap();
    assert_eq!(metrics.calls, 2);
    assert_eq!(client.metrics().total_calls(), 2);

    client.reset_metrics();
    assert_eq!(client.metrics().total_calls(), 0);
}

#[tokio::test]
async fn test_offset_pagination_collects_all_pages() {
    let mock_server = MockServer::start().await;

    for (offset, items, more) in [(0, users(1..=100), true), (100, users(101..=200), true), (200, users(201..=242), false)] {
        Mock::given(method("GET"))
            .and(path("/users"))
            .and(query_param("limit", "100"))
            .and(query_param("offset", offset.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "users": items,
                "limit": 100,
                "offset": offset,
                "more": more
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let mut client = client_for(&mock_server);
    let all = client.list_all("/users").await.unwrap();

    assert_eq!(all.len(), 242);
    assert_eq!(all[0]["id"], "P1");
    assert_eq!(all[241]["id"], "P242");
    assert_eq!(client.metrics().endpoint("GET /users").unwrap().calls, 3);
}

#[tokio::test]
async fn test_offset_pagination_reports_total_to_hook() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/teams"))
        .and(query_param("total", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "teams": [{"id": "PT1"}, {"id": "PT2"}],
            "more": false,
            "total": 2
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let hook_seen = Arc::clone(&seen);
    let teams = client
        .list("/teams")
        .with_total()
        .on_item(move |team, n, total| {
            hook_seen
                .lock()
                .unwrap()
                .push((team["id"].as_str().unwrap_or_default().to_string(), n, total));
        })
        .collect_vec()
        .await
        .unwrap();

    assert_eq!(teams.len(), 2);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![("PT1".to_string(), 1, Some(2)), ("PT2".to_string(), 2, Some(2))]
    );
}

#[tokio::test]
async fn test_offset_pagination_stops_at_max_offset() {
    let mock_server = MockServer::start().await;

    for offset in [0u32, 100] {
        Mock::given(method("GET"))
            .and(path("/users"))
            .and(query_param("offset", offset.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "users": users(offset + 1..=offset + 100),
                "more": true
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    init_tracing();
    let mut client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .api_key("test-key")
        .max_offset(250)
        .build()
        .unwrap();

    let all = client.list_all("/users").await.unwrap();
    assert_eq!(all.len(), 200);
}

#[tokio::test]
async fn test_missing_more_stops_iteration() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "services": [{"id": "PS1"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server);
    let all = client.list_all("/services").await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_cursor_pagination_concatenates_pages() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/audit/records"))
        .and(query_param_is_missing("cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{"id": "R1"}, {"id": "R2"}],
            "next_cursor": "c2"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/audit/records"))
        .and(query_param("cursor", "c2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{"id": "R3"}],
            "next_cursor": null
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server);
    let records = client.list_all("/audit/records").await.unwrap();

    let ids: Vec<&str> = records.iter().filter_map(|r| r["id"].as_str()).collect();
    assert_eq!(ids, ["R1", "R2", "R3"]);
}

#[tokio::test]
async fn test_repeating_cursor_hits_page_ceiling() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/audit/records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{"id": "R1"}],
            "next_cursor": "same"
        })))
        .expect(3)
        .mount(&mock_server)
        .await;

    init_tracing();
    let mut client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .api_key("test-key")
        .max_pages(3)
        .build()
        .unwrap();

    let err = client.list_all("/audit/records").await.unwrap_err();
    assert!(matches!(
        err,
        PaginationError::LimitExceeded { ref canonical_path, limit: 3 } if canonical_path == "/audit/records"
    ));
}

#[tokio::test]
async fn test_find_stops_after_match() {
    let mock_server = MockServer::start().await;

    for (offset, first) in [(0u32, 1u32), (2, 3), (4, 5)] {
        Mock::given(method("GET"))
            .and(path("/users"))
            .and(query_param("query", "USER-5"))
            .and(query_param("offset", offset.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "users": users(first..=first + 1),
                "more": true
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("offset", "6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": users(7..=8),
            "more": false
        })))
        .expect(0)
        .mount(&mock_server)
        .await;

    init_tracing();
    let mut client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .api_key("test-key")
        .page_size(2)
        .build()
        .unwrap();

    let found = client.find("/users", "USER-5", "name").await.unwrap();
    assert_eq!(found.unwrap()["id"], "P5");
    assert_eq!(client.metrics().total_calls(), 3);
}

#[tokio::test]
async fn test_dict_all_keys_by_attribute() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{"id": "P1", "name": "a"}, {"name": "no id"}, {"id": "P2", "name": "b"}],
            "more": false
        })))
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server);
    let by_id = client.dict_all("/users", "id").await.unwrap();

    assert_eq!(by_id.len(), 2);
    assert_eq!(by_id["P2"]["name"], "b");
}

#[tokio::test]
async fn test_non_array_page_is_schema_mismatch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": {"id": "P1"},
            "more": false
        })))
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server);
    let err = client.list_all("/users").await.unwrap_err();
    assert!(matches!(err, PaginationError::Request(Error::SchemaMismatch { .. })));
}

#[tokio::test]
async fn test_stream_yields_items_in_order() {
    use futures::TryStreamExt;

    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/teams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "teams": [{"name": "a"}, {"name": "b"}],
            "more": false
        })))
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server);
    let names: Vec<Value> = client
        .list("/teams")
        .into_stream()
        .map_ok(|team| team["name"].clone())
        .try_collect()
        .await
        .unwrap();

    assert_eq!(names, vec![json!("a"), json!("b")]);
}

#[tokio::test]
async fn test_get_total() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/incidents"))
        .and(query_param("total", "true"))
        .and(query_param("limit", "1"))
        .and(query_param("offset", "0"))
        .and(query_param("statuses[]", "triggered"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "incidents": [{"id": "PINC1"}],
            "total": 57,
            "more": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server);
    let request =
        RequestMetadata::new(Method::GET, "/incidents").with_query_array("statuses", ["triggered"]);
    assert_eq!(client.get_total_with(request).await.unwrap(), 57);
}

#[tokio::test]
async fn test_persist_creates_when_missing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/teams"))
        .and(query_param("query", "SRE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "teams": [{"id": "PT0", "name": "SRE-adjacent"}],
            "more": false
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/teams"))
        .and(body_json(json!({"team": {"name": "SRE"}})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "team": {"id": "PT1", "name": "SRE"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server);
    let team = client
        .persist("/teams", "name", json!({"name": "SRE"}), false)
        .await
        .unwrap();
    assert_eq!(team["id"], "PT1");
}

#[tokio::test]
async fn test_persist_updates_changed_entity() {
    let mock_server = MockServer::start().await;
    let self_url = format!("{}/teams/PT1", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/teams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "teams": [{"id": "PT1", "name": "SRE", "description": "old", "self": self_url}],
            "more": false
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/teams/PT1"))
        .and(body_json(json!({"team": {
            "id": "PT1", "name": "SRE", "description": "new", "self": self_url
        }})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "team": {"id": "PT1", "name": "SRE", "description": "new"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server);
    let team = client
        .persist("/teams", "name", json!({"name": "SRE", "description": "new"}), true)
        .await
        .unwrap();
    assert_eq!(team["description"], "new");

    // unchanged values: no PUT
    let team = client
        .persist("/teams", "name", json!({"name": "SRE", "description": "old"}), true)
        .await
        .unwrap();
    assert_eq!(team["description"], "old");
}

#[tokio::test]
async fn test_find_and_persist_match_numeric_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/widgets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "widgets": [
                {"id": "PW0", "number": 7},
                {"id": "PW1", "number": 42}
            ],
            "more": false
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/widgets"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "widget": {"id": "PW2", "number": 42}
        })))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server);
    let found = client.find("/widgets", "42", "number").await.unwrap();
    assert_eq!(found.unwrap()["id"], "PW1");

    let widget = client
        .persist("/widgets", "number", json!({"number": 42}), false)
        .await
        .unwrap();
    assert_eq!(widget["id"], "PW1");
}

#[tokio::test]
async fn test_persist_requires_key_attribute() {
    let mock_server = MockServer::start().await;
    let mut client = client_for(&mock_server);

    let err = client
        .persist("/teams", "name", json!({"description": "x"}), false)
        .await
        .unwrap_err();
    assert!(matches!(err, PaginationError::Request(Error::ConfigurationError(_))));
}

/// Replays scripted transport results in order.
struct ScriptedTransport {
    script: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    sent: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    fn new(script: Vec<Result<TransportResponse, TransportError>>) -> (Self, Arc<AtomicUsize>) {
        let sent = Arc::new(AtomicUsize::new(0));
        let transport = Self {
            script: Mutex::new(script.into()),
            sent: Arc::clone(&sent),
        };
        (transport, sent)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        _request: TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::new(TransportErrorKind::Other, "script exhausted")))
    }
}

fn ok_user() -> Result<TransportResponse, TransportError> {
    Ok(TransportResponse {
        status: StatusCode::OK,
        headers: HeaderMap::new(),
        body: r#"{"user": {"id": "PABC123"}}"#.to_string(),
    })
}

fn refused() -> Result<TransportResponse, TransportError> {
    Err(TransportError::new(
        TransportErrorKind::Connect,
        "connection refused",
    ))
}

fn scripted_client(transport: ScriptedTransport) -> Client {
    init_tracing();
    Client::builder()
        .api_key("test-key")
        .transport(transport)
        .retry_config(fast_retry())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_network_failures_are_retried() {
    let (transport, sent) = ScriptedTransport::new(vec![refused(), refused(), ok_user()]);
    let mut client = scripted_client(transport);

    let response = client.get("/users/PABC123").await.unwrap();

    assert_eq!(response.attempts, 3);
    assert_eq!(sent.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_network_budget_exhaustion_is_connectivity_error() {
    let (transport, sent) = ScriptedTransport::new(vec![refused(), refused(), refused(), ok_user()]);
    let mut client = scripted_client(transport);

    let err = client.get("/users/PABC123").await.unwrap_err();

    match err {
        Error::Connectivity {
            attempts,
            canonical_path,
            source,
        } => {
            assert_eq!(attempts, 3);
            assert_eq!(canonical_path, "/users/{id}");
            assert_eq!(source.kind, TransportErrorKind::Connect);
        }
        other => panic!("Expected Connectivity error, got {other:?}"),
    }
    assert_eq!(sent.load(Ordering::SeqCst), 3);
    assert_eq!(client.metrics().endpoint("GET /users/{id}").unwrap().calls, 1);
}

#[tokio::test]
async fn test_clones_have_independent_sessions() {
    let (transport, _) = ScriptedTransport::new(vec![ok_user(), ok_user()]);
    let mut client = scripted_client(transport);
    let mut clone = client.clone();

    client.get("/users/PABC123").await.unwrap();
    clone.get("/users/PABC123").await.unwrap();

    assert_eq!(client.metrics().total_calls(), 1);
    assert_eq!(clone.metrics().total_calls(), 1);
}
