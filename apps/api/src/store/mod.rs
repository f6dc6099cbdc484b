//! Typed document store over pluggable backends.
//!
//! Records are stored as JSON documents keyed by UUID, one collection per
//! entity type. The Postgres backend keeps each collection in a JSONB table;
//! the memory backend serves tests and API-key-only deployments. Both order
//! and page identically, so swapping backends never reorders a list.

pub mod memory;
pub mod postgres;
pub mod query;

use std::sync::Arc;

use async_trait::async_trait;
use pagination::{Page, PageParams};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::store::memory::MemoryBackend;
use crate::store::postgres::PostgresBackend;
use crate::store::query::{Query, Schema};

/// A record type that lives in its own collection.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;

    /// Allow-list of filterable, sortable, and searchable fields.
    fn schema() -> &'static Schema;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored document could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Backend contract at the raw-document level. The typed surface lives on
/// [`Store`]; backends only move `Value`s.
#[async_trait]
pub(crate) trait DocumentBackend: Send + Sync {
    async fn insert(&self, collection: &'static str, id: Uuid, doc: Value)
        -> Result<(), StoreError>;

    async fn get(&self, collection: &'static str, id: Uuid) -> Result<Option<Value>, StoreError>;

    /// Overwrites an existing document. Returns `false` when no document
    /// with that id exists.
    async fn replace(
        &self,
        collection: &'static str,
        id: Uuid,
        doc: Value,
    ) -> Result<bool, StoreError>;

    async fn delete(&self, collection: &'static str, id: Uuid) -> Result<bool, StoreError>;

    /// Matching documents in query order, windowed when the query carries
    /// page parameters.
    async fn find(&self, collection: &'static str, query: &Query) -> Result<Vec<Value>, StoreError>;

    /// Number of matching documents, ignoring any page window.
    async fn count(&self, collection: &'static str, query: &Query) -> Result<u64, StoreError>;

    async fn close(&self);
}

/// Handle to the document store. Cheap to clone; shared via [`crate::state::AppState`].
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn DocumentBackend>,
}

impl Store {
    /// In-process store. Used by tests and as the fallback when no
    /// `DATABASE_URL` is configured.
    pub fn memory() -> Self {
        Self {
            backend: Arc::new(MemoryBackend::new()),
        }
    }

    /// Connects to Postgres and ensures the collection tables exist.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let backend = PostgresBackend::connect(database_url).await?;
        Ok(Self {
            backend: Arc::new(backend),
        })
    }

    pub async fn close(&self) {
        self.backend.close().await;
    }

    pub async fn insert<E: Entity>(&self, entity: &E) -> Result<(), StoreError> {
        let doc = serde_json::to_value(entity)?;
        self.backend.insert(E::COLLECTION, entity.id(), doc).await
    }

    pub async fn get<E: Entity>(&self, id: Uuid) -> Result<Option<E>, StoreError> {
        match self.backend.get(E::COLLECTION, id).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    /// Overwrites the stored document for this entity's id. Returns `false`
    /// when the record has disappeared.
    pub async fn replace<E: Entity>(&self, entity: &E) -> Result<bool, StoreError> {
        let doc = serde_json::to_value(entity)?;
        self.backend.replace(E::COLLECTION, entity.id(), doc).await
    }

    pub async fn delete<E: Entity>(&self, id: Uuid) -> Result<bool, StoreError> {
        self.backend.delete(E::COLLECTION, id).await
    }

    pub async fn find<E: Entity>(&self, query: Query) -> Result<Vec<E>, StoreError> {
        let docs = self.backend.find(E::COLLECTION, &query).await?;
        decode_all(docs)
    }

    /// First match, for uniqueness probes and lookups by a secondary key.
    pub async fn find_one<E: Entity>(&self, query: Query) -> Result<Option<E>, StoreError> {
        let docs = self.backend.find(E::COLLECTION, &query.first()).await?;
        match docs.into_iter().next() {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn count<E: Entity>(&self, query: Query) -> Result<u64, StoreError> {
        self.backend.count(E::COLLECTION, &query).await
    }

    /// One page of matches plus the filtered total, fetched concurrently.
    /// The two reads are not transactional; a write landing between them can
    /// skew `total` by one for that response, which the list endpoints
    /// tolerate.
    pub async fn find_page<E: Entity>(
        &self,
        query: Query,
        params: PageParams,
    ) -> Result<Page<E>, StoreError> {
        let windowed = query.clone().paged(params);
        let (docs, total) = tokio::try_join!(
            self.backend.find(E::COLLECTION, &windowed),
            self.backend.count(E::COLLECTION, &query),
        )?;
        Ok(Page::new(params, total, decode_all(docs)?))
    }
}

fn decode_all<E: DeserializeOwned>(docs: Vec<Value>) -> Result<Vec<E>, StoreError> {
    docs.into_iter()
        .map(|doc| serde_json::from_value(doc).map_err(StoreError::from))
        .collect()
}
