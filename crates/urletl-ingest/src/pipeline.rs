//! Pipeline driver
//!
//! Runs ingestion, extraction, transform and load once, strictly in order.
//! Any stage error aborts the run; nothing is written to the store when an
//! earlier stage fails.

use crate::config::PipelineConfig;
use crate::extraction::extract_urls;
use crate::ingestion::{ingest, ApiClient};
use crate::load::{load, DocumentStore, MongoStore};
use crate::transform::{transform, TransformStats, UrlRecord};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, instrument};
use urletl_common::Result;

/// Records ready to load, plus where the raw payload was kept
#[derive(Debug, Clone)]
pub struct Prepared {
    pub audit_file: PathBuf,
    /// Object entries found under `urls`; other entries are not counted
    pub extracted: usize,
    pub records: Vec<UrlRecord>,
    pub stats: TransformStats,
}

/// Outcome of a complete run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub audit_file: PathBuf,
    /// Object entries found under `urls`; other entries are not counted
    pub extracted: usize,
    pub inserted: usize,
    pub stats: TransformStats,
}

/// Ingest, extract and transform
#[instrument(skip_all)]
pub async fn prepare(config: &PipelineConfig) -> Result<Prepared> {
    let client = ApiClient::new(&config.api)?;
    let ingested = ingest(&client, config.load_dir()).await?;

    let raw_records = extract_urls(&ingested.payload);
    let extracted = raw_records.len();
    info!(extracted, "Extracted url records");

    let transformed = transform(raw_records);

    Ok(Prepared {
        audit_file: ingested.audit_file,
        extracted,
        records: transformed.records,
        stats: transformed.stats,
    })
}

/// Run the whole pipeline against the configured MongoDB collection
pub async fn run(config: &PipelineConfig) -> Result<RunSummary> {
    let prepared = prepare(config).await?;
    let store = MongoStore::connect(&config.store).await?;
    finish(prepared, &store).await
}

/// Run the whole pipeline, loading into `store`
pub async fn run_with_store(
    config: &PipelineConfig,
    store: &dyn DocumentStore,
) -> Result<RunSummary> {
    let prepared = prepare(config).await?;
    finish(prepared, store).await
}

async fn finish(prepared: Prepared, store: &dyn DocumentStore) -> Result<RunSummary> {
    let inserted = load(store, &prepared.records).await?;

    Ok(RunSummary {
        audit_file: prepared.audit_file,
        extracted: prepared.extracted,
        inserted,
        stats: prepared.stats,
    })
}
