//! MongoDB document store

use super::DocumentStore;
use crate::config::{StoreConfig, MONGO_URI_VAR};
use crate::transform::{FieldValue, UrlRecord};
use async_trait::async_trait;
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::error::ErrorKind;
use mongodb::{Client, Collection};
use tracing::{debug, info};
use urletl_common::{EtlError, Result};

/// Collection handle in a MongoDB deployment
pub struct MongoStore {
    collection: Collection<Document>,
}

impl MongoStore {
    /// Open a client and confirm the server answers a `ping`
    ///
    /// A malformed connection string is a configuration error; anything that
    /// goes wrong talking to the server is a persistence error.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let uri = config.uri()?;
        let database = config.database()?;
        let collection = config.collection()?;

        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| match *e.kind {
                ErrorKind::InvalidArgument { .. } => EtlError::config(format!(
                    "{MONGO_URI_VAR} is not a valid connection string: {e}"
                )),
                _ => EtlError::persistence(format!("MongoDB client could not be created: {e}")),
            })?;

        let db = client.database(database);
        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| EtlError::persistence(format!("MongoDB is unreachable: {e}")))?;

        info!(database, collection, "Connected to MongoDB");

        Ok(Self {
            collection: db.collection(collection),
        })
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert_many(&self, records: &[UrlRecord]) -> Result<usize> {
        let documents = records
            .iter()
            .map(to_document)
            .collect::<Result<Vec<_>>>()?;
        debug!(count = documents.len(), "Sending bulk insert");

        let result = self
            .collection
            .insert_many(documents)
            .await
            .map_err(|e| EtlError::persistence(format!("Bulk insert rejected: {e}")))?;

        Ok(result.inserted_ids.len())
    }

    fn destination(&self) -> String {
        self.collection.namespace().to_string()
    }
}

/// Convert a record to BSON; date-times become BSON dates
pub fn to_document(record: &UrlRecord) -> Result<Document> {
    let mut document = Document::new();

    for (name, value) in record {
        let value = match value {
            FieldValue::Json(json) => bson::to_bson(json).map_err(|e| {
                EtlError::persistence(format!("Field '{name}' cannot be stored: {e}"))
            })?,
            FieldValue::DateTime(at) => {
                Bson::DateTime(bson::DateTime::from_millis(at.timestamp_millis()))
            },
        };
        document.insert(name.clone(), value);
    }

    Ok(document)
}
