use crate::descriptor::TypeDescriptor;
use crate::document::RawRecord;
use crate::errors::{ErrorKind, TypedStoreError, TypedStoreResult};
use crate::query::QueryDescriptor;
use crate::store::{RecordFuture, RecordStream, Store};
use futures_util::FutureExt;
use std::sync::Arc;

/// A validated retrieval, ready to be issued against the store in any execution mode.
///
/// The plan owns the resolved descriptor, so every record of its result set is
/// materialized with the same one.
#[derive(Clone)]
pub struct FetchPlan {
    store: Store,
    query: QueryDescriptor,
    descriptor: Arc<TypeDescriptor>,
}

impl FetchPlan {
    pub(crate) fn new(store: Store, query: QueryDescriptor, descriptor: Arc<TypeDescriptor>) -> Self {
        FetchPlan {
            store,
            query,
            descriptor,
        }
    }

    pub(crate) fn descriptor(&self) -> Arc<TypeDescriptor> {
        self.descriptor.clone()
    }

    /// The identifier of a by-id plan, `None` for query plans.
    pub(crate) fn single_id(&self) -> Option<&str> {
        match &self.query {
            QueryDescriptor::ById(id) => Some(id),
            _ => None,
        }
    }

    /// Issues the fetch on the calling thread.
    ///
    /// A by-id plan that finds nothing fails with [ErrorKind::NotFound].
    pub(crate) fn execute(&self) -> TypedStoreResult<Vec<RawRecord>> {
        log::debug!("Fetching {} as {}", self.query, self.descriptor.type_name());
        match &self.query {
            QueryDescriptor::ById(id) => match self.store.fetch_by_id(id)? {
                Some(record) => Ok(vec![record]),
                None => Err(not_found(id)),
            },
            QueryDescriptor::SecondaryIndex(query) => self.store.fetch_by_query(query),
            QueryDescriptor::Spatial(query) => self.store.fetch_by_spatial_query(query),
            QueryDescriptor::Filter(query) => self.store.fetch_by_filter(query),
            QueryDescriptor::Projection(query) => self.store.fetch_by_projection(query),
        }
    }

    /// Issues the fetch now and returns the store's pending result.
    pub(crate) fn execute_async(&self) -> RecordFuture<Vec<RawRecord>> {
        log::debug!(
            "Issuing deferred fetch {} as {}",
            self.query,
            self.descriptor.type_name()
        );
        match &self.query {
            QueryDescriptor::ById(id) => {
                let id = id.clone();
                self.store
                    .fetch_by_id_async(&id)
                    .map(move |result| match result? {
                        Some(record) => Ok(vec![record]),
                        None => Err(not_found(&id)),
                    })
                    .boxed()
            }
            QueryDescriptor::SecondaryIndex(query) => self.store.fetch_by_query_async(query),
            QueryDescriptor::Spatial(query) => self.store.fetch_by_spatial_query_async(query),
            QueryDescriptor::Filter(query) => self.store.fetch_by_filter_async(query),
            QueryDescriptor::Projection(query) => self.store.fetch_by_projection_async(query),
        }
    }

    /// Opens the store's record stream for this plan.
    pub(crate) fn execute_stream(&self) -> RecordStream {
        log::debug!(
            "Opening record stream {} as {}",
            self.query,
            self.descriptor.type_name()
        );
        match &self.query {
            QueryDescriptor::ById(id) => self.store.stream_by_id(id),
            QueryDescriptor::SecondaryIndex(query) => self.store.stream_by_query(query),
            QueryDescriptor::Spatial(query) => self.store.stream_by_spatial_query(query),
            QueryDescriptor::Filter(query) => self.store.stream_by_filter(query),
            QueryDescriptor::Projection(query) => self.store.stream_by_projection(query),
        }
    }
}

pub(crate) fn not_found(id: &str) -> TypedStoreError {
    log::error!("No document found for id {}", id);
    TypedStoreError::new(
        &format!("No document found for id {}", id),
        ErrorKind::NotFound,
    )
}

/// Takes the single record of a by-id result.
pub(crate) fn only_record(records: Vec<RawRecord>) -> TypedStoreResult<RawRecord> {
    match records.into_iter().next() {
        Some(record) => Ok(record),
        None => {
            log::error!("Single-document fetch returned no record");
            Err(TypedStoreError::new(
                "Single-document fetch returned no record",
                ErrorKind::InternalError,
            ))
        }
    }
}
