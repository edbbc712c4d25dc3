//! Ingestion stage
//!
//! One authenticated GET against the source API. The parsed body is written
//! untouched to a timestamped audit file before it is handed on.

use crate::config::ApiConfig;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use urletl_common::{EtlError, Result};

/// Header carrying the API key.
pub const AUTH_HEADER: &str = "Auth-Key";

/// The JSON document returned by the API. Not validated against a schema.
pub type RawPayload = serde_json::Value;

/// Result of the ingestion stage
#[derive(Debug, Clone)]
pub struct Ingested {
    pub payload: RawPayload,
    pub audit_file: PathBuf,
}

/// HTTP client for the source API
pub struct ApiClient {
    client: Client,
    endpoint: String,
}

impl ApiClient {
    /// Build a client for the configured endpoint and key
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let endpoint = config.endpoint()?.to_string();

        let mut auth = HeaderValue::from_str(config.key()?)
            .map_err(|e| EtlError::config(format!("API_KEY is not a valid header value: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTH_HEADER, auth);

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| EtlError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch and parse the payload
    pub async fn fetch_payload(&self) -> Result<RawPayload> {
        debug!(endpoint = %self.endpoint, "Fetching payload");

        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| EtlError::request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EtlError::request_status(
                status.as_u16(),
                format!("GET {}", self.endpoint),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| EtlError::request(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| EtlError::malformed_response(e.to_string()))
    }
}

/// File name of the audit copy for a fetch made at `fetched_at`
pub fn audit_file_name(fetched_at: DateTime<Utc>) -> String {
    format!("urls_{}.json", fetched_at.format("%Y%m%d_%H%M%S"))
}

/// Write the raw payload, pretty-printed, into `dir`
///
/// The directory is created if it does not exist yet.
pub fn write_audit_file(
    dir: &Path,
    payload: &RawPayload,
    fetched_at: DateTime<Utc>,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let path = dir.join(audit_file_name(fetched_at));
    let json = serde_json::to_string_pretty(payload)?;
    std::fs::write(&path, json)?;

    Ok(path)
}

/// Run the ingestion stage
pub async fn ingest(client: &ApiClient, load_dir: &Path) -> Result<Ingested> {
    let payload = client.fetch_payload().await?;
    let fetched_at = Utc::now();

    let audit_file = write_audit_file(load_dir, &payload, fetched_at)?;
    info!(path = %audit_file.display(), "Raw payload saved");

    Ok(Ingested {
        payload,
        audit_file,
    })
}
