//! In-process backend holding every collection in one guarded map.
//!
//! Serves tests and deployments without a `DATABASE_URL`. Ordering matches
//! the Postgres backend exactly: documents are pre-sorted by id, then stably
//! sorted by the query's sort key, which reproduces `ORDER BY <key>, id ASC`.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::query::Query;
use crate::store::{DocumentBackend, StoreError};

type Collection = HashMap<Uuid, Value>;

pub(crate) struct MemoryBackend {
    collections: RwLock<HashMap<&'static str, Collection>>,
}

impl MemoryBackend {
    pub(crate) fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    async fn matching(&self, collection: &'static str, query: &Query) -> Vec<(Uuid, Value)> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Vec::new();
        };
        docs.iter()
            .filter(|(_, doc)| query.matches(doc))
            .map(|(id, doc)| (*id, doc.clone()))
            .collect()
    }
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    async fn insert(
        &self,
        collection: &'static str,
        id: Uuid,
        doc: Value,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        collections.entry(collection).or_default().insert(id, doc);
        Ok(())
    }

    async fn get(&self, collection: &'static str, id: Uuid) -> Result<Option<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(&id))
            .cloned())
    }

    async fn replace(
        &self,
        collection: &'static str,
        id: Uuid,
        doc: Value,
    ) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();
        if !docs.contains_key(&id) {
            return Ok(false);
        }
        docs.insert(id, doc);
        Ok(true)
    }

    async fn delete(&self, collection: &'static str, id: Uuid) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(collection)
            .map_or(false, |docs| docs.remove(&id).is_some()))
    }

    async fn find(
        &self,
        collection: &'static str,
        query: &Query,
    ) -> Result<Vec<Value>, StoreError> {
        let mut matches = self.matching(collection, query).await;
        // Pre-sort by id so the stable sort below leaves equal keys in id
        // order, the same tiebreak the SQL backend applies.
        matches.sort_unstable_by_key(|(id, _)| *id);
        matches.sort_by(|(_, a), (_, b)| query.compare(a, b));

        let docs = matches.into_iter().map(|(_, doc)| doc);
        Ok(match query.page() {
            Some(params) => docs
                .skip(params.offset())
                .take(params.per_page as usize)
                .collect(),
            None => docs.collect(),
        })
    }

    async fn count(&self, collection: &'static str, query: &Query) -> Result<u64, StoreError> {
        Ok(self.matching(collection, query).await.len() as u64)
    }

    async fn close(&self) {}
}
