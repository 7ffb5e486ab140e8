//! Execution modes for retrieval operations.
//!
//! Every facade operation builds one [FetchPlan] and hands it to an [ExecutionMode],
//! which decides how the fetch is issued and what handle the caller gets back:
//!
//! * [Blocking] runs the fetch on the caller's thread and returns the result directly.
//! * [Deferred] issues the fetch immediately and returns an [EntityFuture].
//! * [Streaming] returns an [EntityStream] that materializes records as they arrive.
//!
//! Type resolution and query validation happen before the plan reaches the mode, so the
//! error classification is the same in all three.
mod blocking;
mod deferred;
mod fetch_plan;
mod streaming;

pub use blocking::*;
pub use deferred::*;
pub use fetch_plan::FetchPlan;
pub(crate) use fetch_plan::{not_found, only_record};
pub use streaming::*;

use crate::entity::TypedEntity;
use crate::errors::TypedStoreResult;

/// Strategy that turns a fetch plan into the handle a caller receives.
///
/// `Single` is the handle for by-id retrieval, `Many` the handle for query retrieval.
/// A plan that failed to build is passed as `Err` and must be surfaced without touching
/// the store.
pub trait ExecutionMode: Send + Sync {
    type Single<T: TypedEntity>;
    type Many<T: TypedEntity>;

    #[doc(hidden)]
    fn single<T: TypedEntity>(&self, plan: TypedStoreResult<FetchPlan>) -> Self::Single<T>;

    #[doc(hidden)]
    fn many<T: TypedEntity>(&self, plan: TypedStoreResult<FetchPlan>) -> Self::Many<T>;
}
