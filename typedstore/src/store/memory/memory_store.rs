use super::view_index::{SpatialIndex, StoredDocument, ViewIndex};
use super::{SpatialViewDefinition, ViewDefinition};
use crate::document::{Document, RawRecord};
use crate::errors::{ErrorKind, TypedStoreError, TypedStoreResult};
use crate::query::{FilterQuery, ProjectionQuery, SpatialQuery, ViewQuery};
use crate::store::{
    RecordFuture, RecordStream, StoreOperation, StoreOperationsProvider, StoreStats,
};
use futures_util::future::FutureExt;
use futures_util::stream::{self, StreamExt};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// In-memory document store client.
///
/// # Purpose
/// `InMemoryStore` implements [StoreOperationsProvider] over a single in-memory bucket of
/// documents. It is suitable for tests, examples and scenarios where persistence is not
/// required; all data is lost when the last handle is dropped.
///
/// # Characteristics
/// - **Thread-Safe**: documents sit behind `parking_lot` locks and every handle shares them
/// - **Views**: secondary and spatial indexes are declared with [ViewDefinition] and
///   [SpatialViewDefinition] and rebuilt lazily. A query with
///   [ScanConsistency::NotBounded](crate::query::ScanConsistency) reads the index as last
///   built, so it can miss recent writes and return rows whose document was removed
///   since; such rows are skipped.
/// - **CAS**: every write assigns a new, strictly increasing CAS token
/// - **Statistics**: every call is counted per operation in [StoreStats]
/// - **Fault injection**: the store can be made unavailable, slowed down, or made to
///   break its streams after a number of records
///
/// # Usage
/// ```text
/// let memory = InMemoryStore::new();
/// memory.define_view(ViewDefinition::new("person", "by_age", "age"));
/// memory.put_document("p1", doc!{ name: "Alice", age: 30 })?;
/// let store = Store::new(memory.clone());
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<InMemoryStoreInner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a secondary index. Redefining a view replaces it.
    pub fn define_view(&self, definition: ViewDefinition) {
        self.inner.define_view(definition)
    }

    /// Declares a spatial index. Redefining a view replaces it.
    pub fn define_spatial_view(&self, definition: SpatialViewDefinition) {
        self.inner.define_spatial_view(definition)
    }

    /// Stores a document without counting the call, for seeding fixtures.
    pub fn put_document(&self, id: &str, document: Document) -> TypedStoreResult<u64> {
        self.inner.put(id, document)
    }

    /// Brings every view up to date with the stored documents.
    pub fn refresh_views(&self) -> TypedStoreResult<()> {
        self.inner.refresh_views()
    }

    pub fn stats(&self) -> StoreStats {
        self.inner.stats.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delays the completion of future calls and every emission of stream calls.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.inner.latency.write() = latency;
    }

    /// Makes every call fail with [ErrorKind::StoreCommunicationError] while set.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Makes query streams fail after emitting `records` records.
    pub fn fail_streams_after(&self, records: Option<usize>) {
        *self.inner.stream_failure.write() = records;
    }
}

impl StoreOperationsProvider for InMemoryStore {
    fn fetch_by_id(&self, id: &str) -> TypedStoreResult<Option<RawRecord>> {
        self.inner.fetch_by_id(id)
    }

    fn fetch_by_query(&self, query: &ViewQuery) -> TypedStoreResult<Vec<RawRecord>> {
        self.inner.fetch_by_query(query)
    }

    fn fetch_by_spatial_query(&self, query: &SpatialQuery) -> TypedStoreResult<Vec<RawRecord>> {
        self.inner.fetch_by_spatial_query(query)
    }

    fn fetch_by_filter(&self, query: &FilterQuery) -> TypedStoreResult<Vec<RawRecord>> {
        self.inner.fetch_by_filter(query)
    }

    fn fetch_by_projection(&self, query: &ProjectionQuery) -> TypedStoreResult<Vec<RawRecord>> {
        self.inner.fetch_by_projection(query)
    }

    fn fetch_by_id_async(&self, id: &str) -> RecordFuture<Option<RawRecord>> {
        self.inner.delayed(self.inner.fetch_by_id(id))
    }

    fn fetch_by_query_async(&self, query: &ViewQuery) -> RecordFuture<Vec<RawRecord>> {
        self.inner.delayed(self.inner.fetch_by_query(query))
    }

    fn fetch_by_spatial_query_async(&self, query: &SpatialQuery) -> RecordFuture<Vec<RawRecord>> {
        self.inner.delayed(self.inner.fetch_by_spatial_query(query))
    }

    fn fetch_by_filter_async(&self, query: &FilterQuery) -> RecordFuture<Vec<RawRecord>> {
        self.inner.delayed(self.inner.fetch_by_filter(query))
    }

    fn fetch_by_projection_async(&self, query: &ProjectionQuery) -> RecordFuture<Vec<RawRecord>> {
        self.inner.delayed(self.inner.fetch_by_projection(query))
    }

    fn stream_by_id(&self, id: &str) -> RecordStream {
        let records = self
            .inner
            .fetch_by_id(id)
            .map(|record| record.into_iter().collect());
        self.inner.emit(records, false)
    }

    fn stream_by_query(&self, query: &ViewQuery) -> RecordStream {
        self.inner.emit(self.inner.fetch_by_query(query), true)
    }

    fn stream_by_spatial_query(&self, query: &SpatialQuery) -> RecordStream {
        self.inner.emit(self.inner.fetch_by_spatial_query(query), true)
    }

    fn stream_by_filter(&self, query: &FilterQuery) -> RecordStream {
        self.inner.emit(self.inner.fetch_by_filter(query), true)
    }

    fn stream_by_projection(&self, query: &ProjectionQuery) -> RecordStream {
        self.inner.emit(self.inner.fetch_by_projection(query), true)
    }

    fn upsert(&self, id: &str, document: Document) -> TypedStoreResult<u64> {
        self.inner.stats.record(StoreOperation::Upsert);
        self.inner.check_available()?;
        self.inner.put(id, document)
    }

    fn remove(&self, id: &str) -> TypedStoreResult<bool> {
        self.inner.stats.record(StoreOperation::Remove);
        self.inner.check_available()?;
        self.inner.remove(id)
    }

    fn exists(&self, id: &str) -> TypedStoreResult<bool> {
        self.inner.stats.record(StoreOperation::Exists);
        self.inner.check_available()?;
        Ok(self.inner.documents.read().contains_key(id))
    }
}

#[derive(Default)]
struct InMemoryStoreInner {
    documents: RwLock<BTreeMap<String, StoredDocument>>,
    revision: AtomicU64,
    cas: AtomicU64,
    views: Mutex<HashMap<(String, String), ViewIndex>>,
    spatial_views: Mutex<HashMap<(String, String), SpatialIndex>>,
    stats: StoreStats,
    latency: RwLock<Option<Duration>>,
    unavailable: AtomicBool,
    stream_failure: RwLock<Option<usize>>,
}

impl InMemoryStoreInner {
    fn define_view(&self, definition: ViewDefinition) {
        let key = (
            definition.design_document().to_string(),
            definition.view_name().to_string(),
        );
        log::debug!("Defining view {}/{}", key.0, key.1);
        self.views.lock().insert(key, ViewIndex::new(definition));
    }

    fn define_spatial_view(&self, definition: SpatialViewDefinition) {
        let key = (
            definition.design_document().to_string(),
            definition.view_name().to_string(),
        );
        log::debug!("Defining spatial view {}/{}", key.0, key.1);
        self.spatial_views
            .lock()
            .insert(key, SpatialIndex::new(definition));
    }

    fn check_available(&self) -> TypedStoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            log::error!("In-memory store is unavailable");
            return Err(TypedStoreError::new(
                "In-memory store is unavailable",
                ErrorKind::StoreCommunicationError,
            ));
        }
        Ok(())
    }

    fn put(&self, id: &str, document: Document) -> TypedStoreResult<u64> {
        if id.is_empty() {
            log::error!("Cannot store a document under an empty id");
            return Err(TypedStoreError::new(
                "Cannot store a document under an empty id",
                ErrorKind::InvalidId,
            ));
        }

        let mut documents = self.documents.write();
        let cas = self.cas.fetch_add(1, Ordering::SeqCst) + 1;
        documents.insert(
            id.to_string(),
            StoredDocument {
                content: document,
                cas,
            },
        );
        self.revision.fetch_add(1, Ordering::SeqCst);
        Ok(cas)
    }

    fn remove(&self, id: &str) -> TypedStoreResult<bool> {
        let mut documents = self.documents.write();
        let removed = documents.remove(id).is_some();
        if removed {
            self.revision.fetch_add(1, Ordering::SeqCst);
        }
        Ok(removed)
    }

    // views are always locked before documents
    fn refresh_views(&self) -> TypedStoreResult<()> {
        {
            let mut views = self.views.lock();
            let documents = self.documents.read();
            let revision = self.revision.load(Ordering::SeqCst);
            for index in views.values_mut() {
                index.rebuild(&documents, revision)?;
            }
        }

        let mut spatial_views = self.spatial_views.lock();
        let documents = self.documents.read();
        let revision = self.revision.load(Ordering::SeqCst);
        for index in spatial_views.values_mut() {
            index.rebuild(&documents, revision)?;
        }
        Ok(())
    }

    fn fetch_by_id(&self, id: &str) -> TypedStoreResult<Option<RawRecord>> {
        self.stats.record(StoreOperation::FetchById);
        self.check_available()?;
        log::debug!("Fetching document {}", id);
        let documents = self.documents.read();
        Ok(documents
            .get(id)
            .map(|stored| RawRecord::with_cas(id, stored.cas, stored.content.clone())))
    }

    fn fetch_by_query(&self, query: &ViewQuery) -> TypedStoreResult<Vec<RawRecord>> {
        self.stats.record(StoreOperation::FetchByQuery);
        self.check_available()?;
        log::debug!(
            "Querying view {}/{}",
            query.design_document(),
            query.view_name()
        );

        let ids: Vec<String> = {
            let mut views = self.views.lock();
            let key = (
                query.design_document().to_string(),
                query.view_name().to_string(),
            );
            let index = views.get_mut(&key).ok_or_else(|| {
                view_not_found(query.design_document(), query.view_name())
            })?;

            let documents = self.documents.read();
            let revision = self.revision.load(Ordering::SeqCst);
            let fresh = query.get_consistency().unwrap_or_default().requires_fresh_index();
            if index.built_at.is_none() || (fresh && index.built_at != Some(revision)) {
                index.rebuild(&documents, revision)?;
            }

            let mut matching: Vec<&String> = index
                .rows
                .iter()
                .filter(|(k, _)| query.matches_key(k))
                .map(|(_, id)| id)
                .collect();
            if query.is_descending() {
                matching.reverse();
            }
            matching
                .into_iter()
                .skip(query.get_skip())
                .take(query.get_limit().unwrap_or(usize::MAX))
                .cloned()
                .collect()
        };

        Ok(self.load_rows(ids))
    }

    fn fetch_by_spatial_query(&self, query: &SpatialQuery) -> TypedStoreResult<Vec<RawRecord>> {
        self.stats.record(StoreOperation::FetchBySpatialQuery);
        self.check_available()?;
        log::debug!(
            "Querying spatial view {}/{}",
            query.design_document(),
            query.view_name()
        );

        let ids: Vec<String> = {
            let mut views = self.spatial_views.lock();
            let key = (
                query.design_document().to_string(),
                query.view_name().to_string(),
            );
            let index = views.get_mut(&key).ok_or_else(|| {
                view_not_found(query.design_document(), query.view_name())
            })?;

            let documents = self.documents.read();
            let revision = self.revision.load(Ordering::SeqCst);
            let fresh = query.get_consistency().unwrap_or_default().requires_fresh_index();
            if index.built_at.is_none() || (fresh && index.built_at != Some(revision)) {
                index.rebuild(&documents, revision)?;
            }

            index
                .rows
                .iter()
                .filter(|(x, y, _)| query.matches_point(*x, *y))
                .skip(query.get_skip())
                .take(query.get_limit().unwrap_or(usize::MAX))
                .map(|(_, _, id)| id.clone())
                .collect()
        };

        Ok(self.load_rows(ids))
    }

    fn fetch_by_filter(&self, query: &FilterQuery) -> TypedStoreResult<Vec<RawRecord>> {
        self.stats.record(StoreOperation::FetchByFilter);
        self.check_available()?;
        log::debug!("Running filter {}", query.get_filter());

        self.scan(
            query.get_skip(),
            query.get_limit(),
            |id, content| query.matches(id, content),
            |content| Ok(content.clone()),
        )
    }

    fn fetch_by_projection(&self, query: &ProjectionQuery) -> TypedStoreResult<Vec<RawRecord>> {
        self.stats.record(StoreOperation::FetchByProjection);
        self.check_available()?;
        log::debug!("Running projection {}", query.get_filter());

        self.scan(
            query.get_skip(),
            query.get_limit(),
            |id, content| query.matches(id, content),
            |content| query.project(content),
        )
    }

    // full scan in id order; skip counts matching documents only
    fn scan<M, P>(
        &self,
        skip: usize,
        limit: Option<usize>,
        matches: M,
        shape: P,
    ) -> TypedStoreResult<Vec<RawRecord>>
    where
        M: Fn(&str, &Document) -> TypedStoreResult<bool>,
        P: Fn(&Document) -> TypedStoreResult<Document>,
    {
        let documents = self.documents.read();
        let mut records = Vec::new();
        let mut skipped = 0;
        let limit = limit.unwrap_or(usize::MAX);
        for (id, stored) in documents.iter() {
            if records.len() >= limit {
                break;
            }
            if !matches(id.as_str(), &stored.content)? {
                continue;
            }
            if skipped < skip {
                skipped += 1;
                continue;
            }
            records.push(RawRecord::with_cas(
                id.as_str(),
                stored.cas,
                shape(&stored.content)?,
            ));
        }
        Ok(records)
    }

    // rows can outlive their document when the index is stale
    fn load_rows(&self, ids: Vec<String>) -> Vec<RawRecord> {
        let documents = self.documents.read();
        ids.into_iter()
            .filter_map(|id| match documents.get(&id) {
                Some(stored) => Some(RawRecord::with_cas(
                    id.as_str(),
                    stored.cas,
                    stored.content.clone(),
                )),
                None => {
                    log::debug!("Skipping view row {} with no document", id);
                    None
                }
            })
            .collect()
    }

    fn delayed<T: Send + 'static>(&self, result: TypedStoreResult<T>) -> RecordFuture<T> {
        let latency = *self.latency.read();
        async move {
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            result
        }
        .boxed()
    }

    fn emit(&self, records: TypedStoreResult<Vec<RawRecord>>, can_fail: bool) -> RecordStream {
        let latency = *self.latency.read();
        let failure = if can_fail { *self.stream_failure.read() } else { None };

        let items: Vec<TypedStoreResult<RawRecord>> = match records {
            Err(err) => vec![Err(err)],
            Ok(records) => match failure {
                Some(after) if after < records.len() => records
                    .into_iter()
                    .take(after)
                    .map(Ok)
                    .chain(std::iter::once(Err(TypedStoreError::new(
                        "Stream interrupted by the in-memory store",
                        ErrorKind::StoreCommunicationError,
                    ))))
                    .collect(),
                _ => records.into_iter().map(Ok).collect(),
            },
        };

        stream::iter(items)
            .then(move |item| async move {
                if let Some(latency) = latency {
                    tokio::time::sleep(latency).await;
                }
                item
            })
            .boxed()
    }
}

fn view_not_found(design_document: &str, view_name: &str) -> TypedStoreError {
    log::error!("View {}/{} is not defined", design_document, view_name);
    TypedStoreError::new(
        &format!("View {}/{} is not defined", design_document, view_name),
        ErrorKind::StoreCommunicationError,
    )
}
