//! Load stage
//!
//! Normalized records are written to a [`DocumentStore`] in one bulk insert.
//! [`MongoStore`] is the production store; [`MemoryStore`] keeps records in
//! process.

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::{to_document, MongoStore};

use crate::transform::UrlRecord;
use async_trait::async_trait;
use tracing::info;
use urletl_common::Result;

/// Destination for normalized records
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert all records in a single bulk operation
    ///
    /// # Returns
    /// Number of documents the store reports as inserted
    async fn insert_many(&self, records: &[UrlRecord]) -> Result<usize>;

    /// Human-readable destination, e.g. `tracking.urls`
    fn destination(&self) -> String;
}

/// Run the load stage
///
/// An empty record list performs no insert.
pub async fn load(store: &dyn DocumentStore, records: &[UrlRecord]) -> Result<usize> {
    if records.is_empty() {
        info!(destination = %store.destination(), "No records to insert");
        return Ok(0);
    }

    let inserted = store.insert_many(records).await?;
    info!(inserted, destination = %store.destination(), "Inserted records");

    Ok(inserted)
}
