use crate::entity::TypedEntity;
use crate::errors::TypedStoreResult;
use crate::materializer::{materialize, materialize_all};
use crate::mode::{only_record, ExecutionMode, FetchPlan};

/// Runs each retrieval on the caller's thread and returns its result directly.
#[derive(Clone, Copy, Debug, Default)]
pub struct Blocking;

impl ExecutionMode for Blocking {
    type Single<T: TypedEntity> = TypedStoreResult<T>;
    type Many<T: TypedEntity> = TypedStoreResult<Vec<T>>;

    fn single<T: TypedEntity>(&self, plan: TypedStoreResult<FetchPlan>) -> TypedStoreResult<T> {
        let plan = plan?;
        let record = only_record(plan.execute()?)?;
        materialize(&plan.descriptor(), record)
    }

    fn many<T: TypedEntity>(&self, plan: TypedStoreResult<FetchPlan>) -> TypedStoreResult<Vec<T>> {
        let plan = plan?;
        let records = plan.execute()?;
        materialize_all(&plan.descriptor(), records)
    }
}
