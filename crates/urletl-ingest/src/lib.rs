//! urletl Ingest Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Batch pipeline that pulls tracked URL records from an HTTP API,
//! normalizes them and stores them in MongoDB.
//!
//! # Stages
//!
//! - **Ingestion** ([`ingestion`]): authenticated GET, raw payload audit file
//! - **Extraction** ([`extraction`]): the `urls` list out of the payload
//! - **Transform** ([`transform`]): per-record field normalization
//! - **Load** ([`load`]): one bulk insert into a document store
//!
//! # Example
//!
//! ```no_run
//! use urletl_ingest::{config::PipelineConfig, pipeline};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = PipelineConfig::from_env();
//!     let summary = pipeline::run(&config).await?;
//!     tracing::info!(inserted = summary.inserted, "Done");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod extraction;
pub mod ingestion;
pub mod load;
pub mod pipeline;
pub mod transform;

pub use config::{ApiConfig, PipelineConfig, StoreConfig};
pub use pipeline::{prepare, run, run_with_store, Prepared, RunSummary};
