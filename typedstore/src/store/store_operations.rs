use crate::document::{Document, RawRecord};
use crate::errors::TypedStoreResult;
use crate::query::{FilterQuery, ProjectionQuery, SpatialQuery, ViewQuery};
use futures_util::future::{self, BoxFuture, FutureExt};
use futures_util::stream::{self, BoxStream, StreamExt};
use std::ops::Deref;
use std::sync::Arc;

/// A store call in flight, resolved by the store client's own runtime machinery.
pub type RecordFuture<T> = BoxFuture<'static, TypedStoreResult<T>>;

/// Raw records emitted one at a time by the store client.
pub type RecordStream = BoxStream<'static, TypedStoreResult<RawRecord>>;

/// The operations a document store client offers to the access layer.
///
/// # Purpose
/// This is the narrow interface through which the typed access layer reaches the
/// persistence engine. Storage, indexing and query execution all live behind it.
///
/// # Execution forms
/// Every fetch comes in three forms:
/// - **blocking**: runs on the caller's thread and returns the records
/// - **future** (`*_async`): the call is issued when the method is invoked and the
///   returned future completes with the records
/// - **stream** (`stream_*`): the call is issued when the method is invoked and the
///   returned stream emits records as the store produces them
///
/// The future and stream forms have default implementations that run the blocking form
/// eagerly and wrap its outcome, so a minimal client only implements the blocking form.
///
/// # Contract
/// - A missing document is `Ok(None)` from `fetch_by_id`, not an error; the stream form
///   then ends without emitting anything
/// - Query forms return records in the store's native order
/// - Failures are reported with [ErrorKind::StoreCommunicationError](crate::errors::ErrorKind)
///
/// # Thread Safety
/// Implementers must be `Send + Sync`; one client is shared by every call of a template.
pub trait StoreOperationsProvider: Send + Sync {
    fn fetch_by_id(&self, id: &str) -> TypedStoreResult<Option<RawRecord>>;

    fn fetch_by_query(&self, query: &ViewQuery) -> TypedStoreResult<Vec<RawRecord>>;

    fn fetch_by_spatial_query(&self, query: &SpatialQuery) -> TypedStoreResult<Vec<RawRecord>>;

    /// Returns the full content of every document the query's filter accepts.
    fn fetch_by_filter(&self, query: &FilterQuery) -> TypedStoreResult<Vec<RawRecord>>;

    fn fetch_by_projection(&self, query: &ProjectionQuery) -> TypedStoreResult<Vec<RawRecord>>;

    fn fetch_by_id_async(&self, id: &str) -> RecordFuture<Option<RawRecord>> {
        future::ready(self.fetch_by_id(id)).boxed()
    }

    fn fetch_by_query_async(&self, query: &ViewQuery) -> RecordFuture<Vec<RawRecord>> {
        future::ready(self.fetch_by_query(query)).boxed()
    }

    fn fetch_by_spatial_query_async(&self, query: &SpatialQuery) -> RecordFuture<Vec<RawRecord>> {
        future::ready(self.fetch_by_spatial_query(query)).boxed()
    }

    fn fetch_by_filter_async(&self, query: &FilterQuery) -> RecordFuture<Vec<RawRecord>> {
        future::ready(self.fetch_by_filter(query)).boxed()
    }

    fn fetch_by_projection_async(&self, query: &ProjectionQuery) -> RecordFuture<Vec<RawRecord>> {
        future::ready(self.fetch_by_projection(query)).boxed()
    }

    fn stream_by_id(&self, id: &str) -> RecordStream {
        match self.fetch_by_id(id) {
            Ok(record) => stream::iter(record.map(Ok)).boxed(),
            Err(err) => stream::once(future::ready(Err(err))).boxed(),
        }
    }

    fn stream_by_query(&self, query: &ViewQuery) -> RecordStream {
        records_to_stream(self.fetch_by_query(query))
    }

    fn stream_by_spatial_query(&self, query: &SpatialQuery) -> RecordStream {
        records_to_stream(self.fetch_by_spatial_query(query))
    }

    fn stream_by_filter(&self, query: &FilterQuery) -> RecordStream {
        records_to_stream(self.fetch_by_filter(query))
    }

    fn stream_by_projection(&self, query: &ProjectionQuery) -> RecordStream {
        records_to_stream(self.fetch_by_projection(query))
    }

    /// Inserts or replaces the document stored under `id` and returns its new CAS token.
    fn upsert(&self, id: &str, document: Document) -> TypedStoreResult<u64>;

    /// Removes the document stored under `id`. Returns whether a document was removed.
    fn remove(&self, id: &str) -> TypedStoreResult<bool>;

    fn exists(&self, id: &str) -> TypedStoreResult<bool>;
}

fn records_to_stream(records: TypedStoreResult<Vec<RawRecord>>) -> RecordStream {
    match records {
        Ok(records) => stream::iter(records.into_iter().map(Ok)).boxed(),
        Err(err) => stream::once(future::ready(Err(err))).boxed(),
    }
}

/// Shared handle to a store client.
///
/// # Purpose
/// Wraps any [StoreOperationsProvider] behind an `Arc` so that the template, every
/// operations facade and every in-flight deferred or streamed call can hold the same
/// client. Implements `Deref` for direct access to the provider methods.
///
/// Cloning is cheap; it only increments the reference count.
#[derive(Clone)]
pub struct Store {
    inner: Arc<dyn StoreOperationsProvider>,
}

impl Store {
    pub fn new<T: StoreOperationsProvider + 'static>(inner: T) -> Self {
        Store {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for Store {
    type Target = Arc<dyn StoreOperationsProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
