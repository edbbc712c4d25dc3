//! End-to-end tests for the URL pipeline
//!
//! These tests drive the full run against a mock API:
//! - Authenticated fetch and raw payload audit file
//! - Normalization of the fetched records
//! - Load into an in-memory store
//! - Abort behavior for request, response, configuration and store errors

use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;
use urletl_common::EtlError;
use urletl_ingest::load::MemoryStore;
use urletl_ingest::transform::FieldValue;
use urletl_ingest::{pipeline, ApiConfig, PipelineConfig, StoreConfig};
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

const API_KEY: &str = "test-auth-key";
const API_PATH: &str = "/v1/urls/recent/";

/// Helper to create a payload shaped like the tracking API's response
fn mock_payload() -> Value {
    json!({
        "query_status": "ok",
        "urls": [
            {
                "id": "2814471",
                "url": "http://EXAMPLE.com/Path?X=1",
                "url_status": "online",
                "date_added": "2023-01-15 10:30:00 UTC",
                "threat": "malware_download",
                "blacklists": {"spamhaus_dbl": "not listed", "surbl": "FALSE"},
                "reporter": "abuse_ch",
                "larted": "True",
                "tags": ["Mozi", "ELF"]
            },
            {
                "id": "2814472",
                "url": "not a url",
                "url_status": "offline",
                "date_added": "not-a-date",
                "threat": "malware_download",
                "reporter": "anonymous",
                "larted": "false",
                "tags": null
            }
        ]
    })
}

async fn mock_api(response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(header("Auth-Key", API_KEY))
        .respond_with(response)
        .expect(1)
        .mount(&server)
        .await;
    server
}

fn test_config(server: &MockServer, load_dir: &Path) -> PipelineConfig {
    PipelineConfig::new(
        ApiConfig::new(format!("{}{}", server.uri(), API_PATH), API_KEY),
        StoreConfig::default(),
    )
    .with_load_dir(load_dir)
}

fn audit_files(dir: &Path) -> Vec<std::path::PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.map(|e| e.expect("dir entry").path()).collect(),
        Err(_) => Vec::new(),
    }
}

#[tokio::test]
async fn test_full_run_normalizes_and_loads() {
    let server = mock_api(ResponseTemplate::new(200).set_body_json(mock_payload())).await;
    let temp = TempDir::new().expect("temp dir");
    let load_dir = temp.path().join("load");
    let store = MemoryStore::new();

    let summary = pipeline::run_with_store(&test_config(&server, &load_dir), &store)
        .await
        .expect("run should succeed");

    assert_eq!(summary.extracted, 2);
    assert_eq!(summary.inserted, 2);
    assert_eq!(store.insert_calls(), 1);
    assert_eq!(summary.stats.dates_normalized, 1);
    assert_eq!(summary.stats.dates_unchanged, 1);
    assert_eq!(summary.stats.urls_normalized, 1);
    assert_eq!(summary.stats.urls_unchanged, 1);

    let records = store.records();
    let first = &records[0];
    assert_eq!(
        first.get("url").and_then(FieldValue::as_str),
        Some("http://example.com/Path?X=1")
    );
    assert_eq!(
        first.get("larted").and_then(FieldValue::as_json),
        Some(&json!(true))
    );
    assert_eq!(
        first.get("blacklist_surbl").and_then(FieldValue::as_json),
        Some(&json!(false))
    );
    assert_eq!(
        first.get("tags").and_then(FieldValue::as_json),
        Some(&json!(["mozi", "elf"]))
    );
    assert!(first.get("date_added").and_then(FieldValue::as_datetime).is_some());
    assert!(!first.contains("blacklists"));

    let second = &records[1];
    assert_eq!(second.get("url").and_then(FieldValue::as_str), Some("not a url"));
    assert_eq!(
        second.get("date_added").and_then(FieldValue::as_str),
        Some("not-a-date")
    );
    assert_eq!(
        second.get("larted").and_then(FieldValue::as_json),
        Some(&json!(false))
    );
}

#[tokio::test]
async fn test_audit_file_holds_untouched_payload() {
    let server = mock_api(ResponseTemplate::new(200).set_body_json(mock_payload())).await;
    let temp = TempDir::new().expect("temp dir");
    let load_dir = temp.path().join("load");

    let prepared = pipeline::prepare(&test_config(&server, &load_dir))
        .await
        .expect("prepare should succeed");

    assert_eq!(audit_files(&load_dir), vec![prepared.audit_file.clone()]);

    let name = prepared
        .audit_file
        .file_name()
        .and_then(|n| n.to_str())
        .expect("file name");
    assert!(name.starts_with("urls_") && name.ends_with(".json"));
    assert_eq!(name.len(), "urls_YYYYMMDD_HHMMSS.json".len());

    let written = std::fs::read_to_string(&prepared.audit_file).expect("audit file");
    let parsed: Value = serde_json::from_str(&written).expect("audit json");
    assert_eq!(parsed, mock_payload());
}

#[tokio::test]
async fn test_payload_without_urls_inserts_nothing() {
    let server =
        mock_api(ResponseTemplate::new(200).set_body_json(json!({"query_status": "no_results"})))
            .await;
    let temp = TempDir::new().expect("temp dir");
    let store = MemoryStore::new();

    let summary = pipeline::run_with_store(&test_config(&server, temp.path()), &store)
        .await
        .expect("empty run should succeed");

    assert_eq!(summary.extracted, 0);
    assert_eq!(summary.inserted, 0);
    assert_eq!(store.insert_calls(), 0);
}

#[tokio::test]
async fn test_extracted_counts_only_object_entries() {
    let body = json!({
        "query_status": "ok",
        "urls": [{"id": "1", "url": "http://Example.com/"}, "stray", null, 7, {"id": "2"}]
    });
    let server = mock_api(ResponseTemplate::new(200).set_body_json(body)).await;
    let temp = TempDir::new().expect("temp dir");
    let store = MemoryStore::new();

    let summary = pipeline::run_with_store(&test_config(&server, temp.path()), &store)
        .await
        .expect("run should succeed");

    assert_eq!(summary.extracted, 2);
    assert_eq!(summary.stats.records, 2);
    assert_eq!(summary.inserted, 2);
}

#[tokio::test]
async fn test_error_status_aborts_before_audit_and_load() {
    let server = mock_api(ResponseTemplate::new(401)).await;
    let temp = TempDir::new().expect("temp dir");
    let load_dir = temp.path().join("load");
    let store = MemoryStore::new();

    let err = pipeline::run_with_store(&test_config(&server, &load_dir), &store)
        .await
        .expect_err("401 must abort the run");

    assert!(matches!(err, EtlError::Request { .. }));
    assert_eq!(err.status(), Some(401));
    assert!(audit_files(&load_dir).is_empty());
    assert_eq!(store.insert_calls(), 0);
}

#[tokio::test]
async fn test_wrong_key_is_rejected() {
    let server = mock_api(ResponseTemplate::new(200).set_body_json(mock_payload())).await;
    let temp = TempDir::new().expect("temp dir");
    let config = PipelineConfig::new(
        ApiConfig::new(format!("{}{}", server.uri(), API_PATH), "other-key"),
        StoreConfig::default(),
    )
    .with_load_dir(temp.path());

    // No mock matches, so the mock server answers 404
    let err = pipeline::prepare(&config).await.expect_err("must fail");
    assert_eq!(err.status(), Some(404));

    // The mounted mock expects exactly one call; reset so drop does not panic
    server.reset().await;
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let server = mock_api(ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;
    let temp = TempDir::new().expect("temp dir");

    let err = pipeline::prepare(&test_config(&server, temp.path()))
        .await
        .expect_err("must fail");

    assert!(matches!(err, EtlError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_unreachable_api_is_a_request_error() {
    let temp = TempDir::new().expect("temp dir");
    let config = PipelineConfig::new(
        ApiConfig::new("http://127.0.0.1:1/urls", API_KEY),
        StoreConfig::default(),
    )
    .with_load_dir(temp.path());

    let err = pipeline::prepare(&config).await.expect_err("must fail");
    assert!(matches!(err, EtlError::Request { status: None, .. }));
}

#[tokio::test]
async fn test_missing_endpoint_is_a_configuration_error() {
    let temp = TempDir::new().expect("temp dir");
    let config = PipelineConfig::default().with_load_dir(temp.path());

    let err = pipeline::prepare(&config).await.expect_err("must fail");
    assert!(matches!(err, EtlError::Configuration(_)));
}

#[tokio::test]
async fn test_store_rejection_keeps_audit_file() {
    let server = mock_api(ResponseTemplate::new(200).set_body_json(mock_payload())).await;
    let temp = TempDir::new().expect("temp dir");
    let store = MemoryStore::rejecting("write concern error");

    let err = pipeline::run_with_store(&test_config(&server, temp.path()), &store)
        .await
        .expect_err("must fail");

    assert!(matches!(err, EtlError::Persistence(_)));
    assert_eq!(audit_files(temp.path()).len(), 1);
    assert!(store.records().is_empty());
}

#[tokio::test]
async fn test_missing_store_settings_surface_after_fetch() {
    let server = mock_api(ResponseTemplate::new(200).set_body_json(mock_payload())).await;
    let temp = TempDir::new().expect("temp dir");

    let err = pipeline::run(&test_config(&server, temp.path()))
        .await
        .expect_err("must fail");

    assert!(matches!(err, EtlError::Configuration(_)));
    assert!(err.to_string().contains("MONGO_URI"));
    assert_eq!(audit_files(temp.path()).len(), 1);
}
