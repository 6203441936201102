//! Insert a document into a managed document database
//!
//! The database and collection are created on demand before the document is
//! upserted. The store client is abstracted behind [`DocumentStore`].

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_CONN_ID: &str = "azure_cosmos_default";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database {0:?} does not exist")]
    DatabaseNotFound(String),

    #[error("collection {collection:?} does not exist in database {database:?}")]
    CollectionNotFound { database: String, collection: String },

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("cannot render template {template:?}: unknown key {key:?}")]
    Template { template: String, key: String },

    #[error("cannot render template {0:?}: unclosed placeholder")]
    UnclosedTemplate(String),

    #[error("document store error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Client operations the operator relies on
pub trait DocumentStore {
    fn database_exists(&self, database: &str) -> StoreResult<bool>;

    fn collection_exists(&self, collection: &str, database: &str) -> StoreResult<bool>;

    fn create_database(&self, database: &str) -> StoreResult<()>;

    fn create_collection(&self, collection: &str, database: &str) -> StoreResult<()>;

    fn upsert_document(&self, document: &Value, database: &str, collection: &str) -> StoreResult<Value>;
}

/// Inserts one document, creating the database and collection if they are missing.
///
/// `database_name` and `collection_name` may contain `{{ key }}` placeholders,
/// filled in by [`InsertDocumentOperator::render_templates`].
#[derive(Debug, Clone)]
pub struct InsertDocumentOperator {
    pub database_name: String,
    pub collection_name: String,
    pub document: Value,
    pub conn_id: String,
}

impl InsertDocumentOperator {
    pub fn new(database_name: impl Into<String>, collection_name: impl Into<String>, document: Value) -> Self {
        Self {
            database_name: database_name.into(),
            collection_name: collection_name.into(),
            document,
            conn_id: DEFAULT_CONN_ID.to_string(),
        }
    }

    pub fn with_conn_id(mut self, conn_id: impl Into<String>) -> Self {
        self.conn_id = conn_id.into();
        self
    }

    /// Substitute `{{ key }}` placeholders in the templated fields
    pub fn render_templates(&mut self, context: &HashMap<String, String>) -> StoreResult<()> {
        let database_name = render_template(&self.database_name, context)?;
        let collection_name = render_template(&self.collection_name, context)?;
        self.database_name = database_name;
        self.collection_name = collection_name;
        Ok(())
    }

    /// Create what is missing, then upsert. Any store error is returned as-is.
    pub fn execute<S: DocumentStore + ?Sized>(&self, store: &S) -> StoreResult<Value> {
        debug!("Using connection {}", self.conn_id);

        if !store.database_exists(&self.database_name)? {
            info!("Creating database {}", self.database_name);
            store.create_database(&self.database_name)?;
        }

        if !store.collection_exists(&self.collection_name, &self.database_name)? {
            info!(
                "Creating collection {} in database {}",
                self.collection_name, self.database_name
            );
            store.create_collection(&self.collection_name, &self.database_name)?;
        }

        info!(
            "Upserting document into {}/{}",
            self.database_name, self.collection_name
        );
        store.upsert_document(&self.document, &self.database_name, &self.collection_name)
    }
}

fn render_template(template: &str, context: &HashMap<String, String>) -> StoreResult<String> {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            return Err(StoreError::UnclosedTemplate(template.to_string()));
        };
        let key = rest[start + 2..start + 2 + len].trim();
        let value = context.get(key).ok_or_else(|| StoreError::Template {
            template: template.to_string(),
            key: key.to_string(),
        })?;
        rendered.push_str(&rest[..start]);
        rendered.push_str(value);
        rest = &rest[start + 2 + len + 2..];
    }
    rendered.push_str(rest);
    Ok(rendered)
}

/// Number of calls made against a [`MemoryStore`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub database_exists: usize,
    pub collection_exists: usize,
    pub create_database: usize,
    pub create_collection: usize,
    pub upsert_document: usize,
}

#[derive(Debug, Default)]
struct MemoryState {
    /// database -> collection -> id -> document
    databases: BTreeMap<String, BTreeMap<String, BTreeMap<String, Value>>>,
    calls: CallCounts,
    next_id: u64,
}

/// In-process [`DocumentStore`]. Documents are keyed by their `id` field.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> CallCounts {
        self.state.lock().calls
    }

    pub fn documents(&self, database: &str, collection: &str) -> Vec<Value> {
        let state = self.state.lock();
        state
            .databases
            .get(database)
            .and_then(|collections| collections.get(collection))
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default()
    }
}

impl DocumentStore for MemoryStore {
    fn database_exists(&self, database: &str) -> StoreResult<bool> {
        let mut state = self.state.lock();
        state.calls.database_exists += 1;
        Ok(state.databases.contains_key(database))
    }

    fn collection_exists(&self, collection: &str, database: &str) -> StoreResult<bool> {
        let mut state = self.state.lock();
        state.calls.collection_exists += 1;
        Ok(state
            .databases
            .get(database)
            .is_some_and(|collections| collections.contains_key(collection)))
    }

    fn create_database(&self, database: &str) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.calls.create_database += 1;
        state.databases.entry(database.to_string()).or_default();
        Ok(())
    }

    fn create_collection(&self, collection: &str, database: &str) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.calls.create_collection += 1;
        let collections = state
            .databases
            .get_mut(database)
            .ok_or_else(|| StoreError::DatabaseNotFound(database.to_string()))?;
        collections.entry(collection.to_string()).or_default();
        Ok(())
    }

    fn upsert_document(&self, document: &Value, database: &str, collection: &str) -> StoreResult<Value> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.calls.upsert_document += 1;

        let Value::Object(fields) = document else {
            return Err(StoreError::InvalidDocument("document must be a JSON object".to_string()));
        };

        let docs = state
            .databases
            .get_mut(database)
            .ok_or_else(|| StoreError::DatabaseNotFound(database.to_string()))?
            .get_mut(collection)
            .ok_or_else(|| StoreError::CollectionNotFound {
                database: database.to_string(),
                collection: collection.to_string(),
            })?;

        let mut stored = fields.clone();
        let id = match fields.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(other) => other.to_string(),
            None => {
                // Generated ids skip anything already stored under that key
                let id = loop {
                    state.next_id += 1;
                    let candidate = state.next_id.to_string();
                    if !docs.contains_key(&candidate) {
                        break candidate;
                    }
                };
                stored.insert("id".to_string(), Value::String(id.clone()));
                id
            }
        };

        let stored = Value::Object(stored);
        docs.insert(id, stored.clone());
        Ok(stored)
    }
}
