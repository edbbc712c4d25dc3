//! Pipeline configuration
//!
//! Connection parameters come from the process environment. The `urletl`
//! binary loads a `.env` file into it once at startup, before logging is set
//! up. Values are read once into a [`PipelineConfig`] that is passed
//! to each stage. Missing values are not rejected here; the accessors report
//! a configuration error when a stage first needs the value.

use std::path::{Path, PathBuf};
use urletl_common::{EtlError, Result};

// ============================================================================
// Environment Variables
// ============================================================================

pub const API_URL_VAR: &str = "API_URL";
pub const API_KEY_VAR: &str = "API_KEY";
pub const MONGO_URI_VAR: &str = "MONGO_URI";
pub const DB_NAME_VAR: &str = "DB_NAME";
pub const COLLECTION_NAME_VAR: &str = "COLLECTION_NAME";
pub const LOAD_DIR_VAR: &str = "LOAD_DIR";

/// Directory that receives the raw payload audit files.
pub const DEFAULT_LOAD_DIR: &str = "load";

/// Full pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub api: ApiConfig,
    pub store: StoreConfig,
    pub load_dir: PathBuf,
}

/// Source API parameters
#[derive(Clone, Default)]
pub struct ApiConfig {
    endpoint: Option<String>,
    key: Option<String>,
}

/// Document store parameters
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    uri: Option<String>,
    database: Option<String>,
    collection: Option<String>,
}

impl PipelineConfig {
    pub fn new(api: ApiConfig, store: StoreConfig) -> Self {
        Self {
            api,
            store,
            load_dir: PathBuf::from(DEFAULT_LOAD_DIR),
        }
    }

    /// Read configuration from the process environment
    ///
    /// Does not look at `.env`; callers that want it load it first.
    pub fn from_env() -> Self {
        let config = Self::new(
            ApiConfig {
                endpoint: env_value(API_URL_VAR),
                key: env_value(API_KEY_VAR),
            },
            StoreConfig {
                uri: env_value(MONGO_URI_VAR),
                database: env_value(DB_NAME_VAR),
                collection: env_value(COLLECTION_NAME_VAR),
            },
        );

        match env_value(LOAD_DIR_VAR) {
            Some(dir) => config.with_load_dir(dir),
            None => config,
        }
    }

    pub fn with_load_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.load_dir = dir.into();
        self
    }

    pub fn load_dir(&self) -> &Path {
        &self.load_dir
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(ApiConfig::default(), StoreConfig::default())
    }
}

impl ApiConfig {
    pub fn new(endpoint: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            endpoint: non_empty(endpoint.into()),
            key: non_empty(key.into()),
        }
    }

    /// Endpoint URL for the single GET
    pub fn endpoint(&self) -> Result<&str> {
        required(&self.endpoint, API_URL_VAR)
    }

    /// Value sent in the `Auth-Key` header
    pub fn key(&self) -> Result<&str> {
        required(&self.key, API_KEY_VAR)
    }
}

// The key never reaches logs through `{:?}`.
impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("endpoint", &self.endpoint)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl StoreConfig {
    pub fn new(
        uri: impl Into<String>,
        database: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            uri: non_empty(uri.into()),
            database: non_empty(database.into()),
            collection: non_empty(collection.into()),
        }
    }

    pub fn uri(&self) -> Result<&str> {
        required(&self.uri, MONGO_URI_VAR)
    }

    pub fn database(&self) -> Result<&str> {
        required(&self.database, DB_NAME_VAR)
    }

    pub fn collection(&self) -> Result<&str> {
        required(&self.collection, COLLECTION_NAME_VAR)
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(non_empty)
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| EtlError::config(format!("{name} is not set")))
}
