//! Tests for Firestore client functionality.

use std::collections::HashMap;
use std::time::Duration;

use serial_test::serial;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::client::{FirestoreClient, FirestoreConfig};
use crate::error::FirestoreError;
use crate::retry::RetryConfig;
use crate::types::{ToFirestoreValue, Value};

// =============================================================================
// Test Helpers
// =============================================================================

fn test_config(emulator_host: Option<String>) -> FirestoreConfig {
    FirestoreConfig {
        project_id: "test-project".to_string(),
        database_id: "(default)".to_string(),
        timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(2),
        retry: RetryConfig {
            max_retries: 3,
            base_delay_ms: 10,
            max_delay_ms: 100,
        },
        emulator_host,
    }
}

async fn mock_client(server: &MockServer) -> FirestoreClient {
    FirestoreClient::new(test_config(Some(server.uri())))
        .await
        .expect("emulator client")
}

const DOCUMENTS_ROOT: &str = "/v1/projects/test-project/databases/(default)/documents";

// =============================================================================
// Error Type Tests
// =============================================================================

#[test]
fn test_error_from_http_status_429() {
    let err = FirestoreError::from_http_status(429, "rate limited");
    assert!(matches!(err, FirestoreError::RateLimited(_)));
    assert!(err.is_retryable());
}

#[test]
fn test_error_from_http_status_500() {
    let err = FirestoreError::from_http_status(500, "internal error");
    assert!(matches!(err, FirestoreError::ServerError(500, _)));
    assert!(err.is_retryable());
}

#[test]
fn test_error_from_http_status_400() {
    let err = FirestoreError::from_http_status(400, "bad request");
    assert!(matches!(err, FirestoreError::RequestFailed(_)));
    assert!(!err.is_retryable());
}

#[test]
fn test_error_from_http_status_404() {
    let err = FirestoreError::from_http_status(404, "not found");
    assert!(matches!(err, FirestoreError::NotFound(_)));
    assert!(!err.is_retryable());
}

#[test]
fn test_error_from_http_status_409() {
    let err = FirestoreError::from_http_status(409, "conflict");
    assert!(matches!(err, FirestoreError::AlreadyExists(_)));
    assert!(!err.is_retryable());
}

#[test]
fn test_error_from_http_status_412() {
    let err = FirestoreError::from_http_status(412, "precondition");
    assert!(err.is_precondition_failed());
}

#[test]
fn test_error_http_status_getter() {
    assert_eq!(FirestoreError::RateLimited(1000).http_status(), Some(429));
    assert_eq!(
        FirestoreError::ServerError(502, "bad gateway".into()).http_status(),
        Some(502)
    );
    assert_eq!(FirestoreError::NotFound("doc".into()).http_status(), Some(404));
}

#[test]
fn test_error_retry_after_ms() {
    assert_eq!(FirestoreError::RateLimited(5000).retry_after_ms(), Some(5000));
    assert_eq!(
        FirestoreError::ServerError(500, "error".into()).retry_after_ms(),
        None
    );
}

// =============================================================================
// Config Tests
// =============================================================================

#[test]
#[serial]
fn test_config_from_env_validates_project_id() {
    std::env::remove_var("GCP_PROJECT_ID");
    std::env::remove_var("FIREBASE_PROJECT_ID");
    let result = FirestoreConfig::from_env();
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_config_default_values() {
    std::env::set_var("GCP_PROJECT_ID", "test-project");
    std::env::remove_var("FIRESTORE_CONNECT_TIMEOUT_SECS");
    std::env::remove_var("FIRESTORE_EMULATOR_HOST");
    let config = FirestoreConfig::from_env().unwrap();
    assert_eq!(config.connect_timeout, Duration::from_secs(5));
    assert_eq!(config.database_id, "(default)");
    assert!(config.emulator_host.is_none());
    std::env::remove_var("GCP_PROJECT_ID");
}

// =============================================================================
// Emulator-backed Client Tests
// =============================================================================

#[tokio::test]
async fn test_get_document_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/users/u1", DOCUMENTS_ROOT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "projects/test-project/databases/(default)/documents/users/u1",
            "fields": { "email": { "stringValue": "jane@example.com" } },
            "createTime": "2024-01-01T00:00:00Z",
            "updateTime": "2024-01-02T00:00:00Z"
        })))
        .mount(&server)
        .await;

    let client = mock_client(&server).await;
    let doc = client.get_document("users", "u1").await.unwrap().unwrap();
    assert_eq!(doc.doc_id(), Some("u1"));
    assert_eq!(doc.update_time.as_deref(), Some("2024-01-02T00:00:00Z"));
    match doc.field("email") {
        Some(Value::StringValue(email)) => assert_eq!(email, "jane@example.com"),
        other => panic!("unexpected email field: {:?}", other),
    }
}

#[tokio::test]
async fn test_get_document_missing_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/users/missing", DOCUMENTS_ROOT)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = mock_client(&server).await;
    let doc = client.get_document("users", "missing").await.unwrap();
    assert!(doc.is_none());
}

#[tokio::test]
async fn test_create_document_conflict_is_already_exists() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/users", DOCUMENTS_ROOT)))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let client = mock_client(&server).await;
    let mut fields = HashMap::new();
    fields.insert("email".to_string(), "jane@example.com".to_firestore_value());
    let result = client.create_document("users", "u1", fields).await;
    assert!(matches!(result, Err(FirestoreError::AlreadyExists(_))));
}

#[tokio::test]
async fn test_run_query_parses_documents() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}:runQuery", DOCUMENTS_ROOT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "document": {
                    "name": "projects/test-project/databases/(default)/documents/jobs/j1",
                    "fields": { "title": { "stringValue": "Backend Engineer" } }
                },
                "readTime": "2024-01-01T00:00:00Z"
            },
            { "readTime": "2024-01-01T00:00:00Z" }
        ])))
        .mount(&server)
        .await;

    let client = mock_client(&server).await;
    let query = crate::types::StructuredQuery {
        from: vec![crate::types::CollectionSelector {
            collection_id: "jobs".to_string(),
            all_descendants: None,
        }],
        select: None,
        r#where: None,
        order_by: None,
        offset: None,
        limit: None,
    };
    let docs = client.run_query(query).await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].doc_id(), Some("j1"));
}

#[tokio::test]
async fn test_batch_write_reports_per_write_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}:batchWrite", DOCUMENTS_ROOT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "writeResults": [{}, {}],
            "status": [
                { "code": 0 },
                { "code": 6, "message": "Document already exists" }
            ]
        })))
        .mount(&server)
        .await;

    let client = mock_client(&server).await;
    let write = crate::types::Write {
        update: Some(crate::types::Document::named(
            client.full_document_name("applications", "a1"),
            HashMap::new(),
        )),
        delete: None,
        update_mask: None,
        current_document: None,
    };
    let result = client.batch_write(vec![write]).await;
    assert!(matches!(result, Err(FirestoreError::AlreadyExists(_))));
}
