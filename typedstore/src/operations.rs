use crate::descriptor::TypeResolver;
use crate::entity::TypedEntity;
use crate::errors::TypedStoreResult;
use crate::mode::{ExecutionMode, FetchPlan};
use crate::query::{
    FilterQuery, ProjectionQuery, QueryDescriptor, ScanConsistency, SpatialQuery, ViewQuery,
};
use crate::store::Store;

/// Typed retrieval operations bound to one execution mode.
///
/// `Operations` is obtained from a [crate::template::DocumentTemplate] through
/// [blocking](crate::template::DocumentTemplate::blocking),
/// [future](crate::template::DocumentTemplate::future) or
/// [stream](crate::template::DocumentTemplate::stream). Every method is generic over the
/// entity type; the type's descriptor is resolved once per call and reused for every
/// record the call returns.
///
/// The handle each method returns depends on the mode `M`:
///
/// | Mode          | `find_by_id`         | query methods              |
/// |---------------|----------------------|----------------------------|
/// | [Blocking]    | `TypedStoreResult<T>`| `TypedStoreResult<Vec<T>>` |
/// | [Deferred]    | `EntityFuture<T>`    | `EntityFuture<Vec<T>>`     |
/// | [Streaming]   | `EntityStream<T>`    | `EntityStream<T>`          |
///
/// Type resolution failures and invalid arguments never reach the store. In blocking
/// mode they are returned, a future resolves to them, and a stream yields them as its
/// only item.
///
/// # Examples
///
/// ```rust,ignore
/// let ops = template.blocking();
/// let person = ops.find_by_id::<Person>("doc-1")?;
///
/// let query = ViewQuery::new("people", "by_city").key("Oslo").limit(10);
/// let people = ops.find_by_query::<Person>(&query)?;
/// ```
///
/// [Blocking]: crate::mode::Blocking
/// [Deferred]: crate::mode::Deferred
/// [Streaming]: crate::mode::Streaming
#[derive(Clone)]
pub struct Operations<M: ExecutionMode> {
    store: Store,
    resolver: TypeResolver,
    consistency: ScanConsistency,
    mode: M,
}

impl<M: ExecutionMode> Operations<M> {
    pub(crate) fn new(
        store: Store,
        resolver: TypeResolver,
        consistency: ScanConsistency,
        mode: M,
    ) -> Self {
        Operations {
            store,
            resolver,
            consistency,
            mode,
        }
    }

    /// Retrieves the document stored under `id` as a `T`.
    ///
    /// # Errors
    ///
    /// * [InvalidEntityType](crate::errors::ErrorKind::InvalidEntityType) when `T` has no
    ///   usable identifier field.
    /// * [InvalidId](crate::errors::ErrorKind::InvalidId) when `id` is empty.
    /// * [NotFound](crate::errors::ErrorKind::NotFound) when no document exists under `id`.
    /// * [ObjectMappingError](crate::errors::ErrorKind::ObjectMappingError) when the
    ///   document does not fit `T`.
    pub fn find_by_id<T: TypedEntity>(&self, id: &str) -> M::Single<T> {
        let plan = self.plan::<T>(QueryDescriptor::ById(id.to_string()));
        self.mode.single(plan)
    }

    /// Retrieves the documents a view query selects, in the view's order.
    ///
    /// A query that selects nothing produces an empty result, not an error.
    pub fn find_by_query<T: TypedEntity>(&self, query: &ViewQuery) -> M::Many<T> {
        let plan = self.plan::<T>(QueryDescriptor::SecondaryIndex(query.clone()));
        self.mode.many(plan)
    }

    /// Retrieves the documents whose spatial view point lies in the query's bounding box.
    pub fn find_by_spatial_query<T: TypedEntity>(&self, query: &SpatialQuery) -> M::Many<T> {
        let plan = self.plan::<T>(QueryDescriptor::Spatial(query.clone()));
        self.mode.many(plan)
    }

    /// Retrieves every document the query's filter accepts, with all of its fields.
    ///
    /// A filter on the identifier field of `T` compares against the document id.
    pub fn find_by_filter<T: TypedEntity>(&self, query: &FilterQuery) -> M::Many<T> {
        let plan = self.plan::<T>(QueryDescriptor::Filter(query.clone()));
        self.mode.many(plan)
    }

    /// Retrieves the projected fields of matching documents.
    ///
    /// Fields of `T` outside the projection keep their default value; the identifier is
    /// always populated from the document id.
    pub fn find_by_query_projection<T: TypedEntity>(&self, query: &ProjectionQuery) -> M::Many<T> {
        let plan = self.plan::<T>(QueryDescriptor::Projection(query.clone()));
        self.mode.many(plan)
    }

    fn plan<T: TypedEntity>(&self, query: QueryDescriptor) -> TypedStoreResult<FetchPlan> {
        let descriptor = self.resolver.resolve::<T>()?;
        query.validate()?;
        Ok(FetchPlan::new(
            self.store.clone(),
            query
                .with_default_consistency(self.consistency)
                .with_default_id_field(descriptor.id_field()),
            descriptor,
        ))
    }
}
