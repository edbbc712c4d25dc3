//! In-process document store

use super::DocumentStore;
use crate::transform::UrlRecord;
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use urletl_common::{EtlError, Result};

/// Keeps inserted records in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    rejection: Option<String>,
}

#[derive(Debug, Default)]
struct MemoryState {
    records: Vec<UrlRecord>,
    insert_calls: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose inserts always fail with `reason`
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            rejection: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Snapshot of everything inserted so far
    pub fn records(&self) -> Vec<UrlRecord> {
        self.state().records.clone()
    }

    /// Number of `insert_many` calls received, including rejected ones
    pub fn insert_calls(&self) -> usize {
        self.state().insert_calls
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_many(&self, records: &[UrlRecord]) -> Result<usize> {
        let mut state = self.state();
        state.insert_calls += 1;

        if let Some(ref reason) = self.rejection {
            return Err(EtlError::persistence(reason.clone()));
        }

        state.records.extend_from_slice(records);
        Ok(records.len())
    }

    fn destination(&self) -> String {
        "memory".to_string()
    }
}
