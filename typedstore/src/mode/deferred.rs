use crate::entity::TypedEntity;
use crate::errors::{TypedStoreError, TypedStoreResult};
use crate::materializer::{materialize, materialize_all};
use crate::mode::{only_record, ExecutionMode, FetchPlan};
use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Issues each retrieval immediately and returns an [EntityFuture] for its result.
///
/// The store call is made while the operation is invoked; materialization runs as a
/// continuation of the store's future on the runtime this mode was created with.
#[derive(Clone)]
pub struct Deferred {
    handle: Handle,
}

impl Deferred {
    pub(crate) fn new(handle: Handle) -> Self {
        Deferred { handle }
    }

    fn spawn<T, F>(&self, task: F) -> EntityFuture<T>
    where
        T: Send + 'static,
        F: Future<Output = TypedStoreResult<T>> + Send + 'static,
    {
        EntityFuture {
            state: FutureState::Running(self.handle.spawn(task)),
        }
    }
}

impl Debug for Deferred {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deferred").finish_non_exhaustive()
    }
}

impl ExecutionMode for Deferred {
    type Single<T: TypedEntity> = EntityFuture<T>;
    type Many<T: TypedEntity> = EntityFuture<Vec<T>>;

    fn single<T: TypedEntity>(&self, plan: TypedStoreResult<FetchPlan>) -> EntityFuture<T> {
        let plan = match plan {
            Ok(plan) => plan,
            Err(err) => return EntityFuture::failed(err),
        };

        let descriptor = plan.descriptor();
        let pending = plan.execute_async();
        self.spawn(async move {
            let record = only_record(pending.await?)?;
            materialize::<T>(&descriptor, record)
        })
    }

    fn many<T: TypedEntity>(&self, plan: TypedStoreResult<FetchPlan>) -> EntityFuture<Vec<T>> {
        let plan = match plan {
            Ok(plan) => plan,
            Err(err) => return EntityFuture::failed(err),
        };

        let descriptor = plan.descriptor();
        let pending = plan.execute_async();
        self.spawn(async move {
            let records = pending.await?;
            materialize_all::<T>(&descriptor, records)
        })
    }
}

/// Pending result of a deferred retrieval.
///
/// Resolves to the materialized value or to the error that ended the retrieval. The
/// handle belongs to the call that created it and resolves once; polling it again after
/// completion yields [crate::errors::ErrorKind::InvalidOperation].
///
/// Dropping the future, or calling [EntityFuture::cancel], aborts the retrieval; a
/// cancelled future resolves to [crate::errors::ErrorKind::Cancelled].
///
/// # Examples
///
/// ```rust,ignore
/// let person: Person = template.future()?.find_by_id::<Person>("doc-1").await?;
/// ```
pub struct EntityFuture<T> {
    state: FutureState<T>,
}

enum FutureState<T> {
    Failed(TypedStoreError),
    Running(JoinHandle<TypedStoreResult<T>>),
    Done,
}

impl<T> EntityFuture<T> {
    pub(crate) fn failed(error: TypedStoreError) -> Self {
        EntityFuture {
            state: FutureState::Failed(error),
        }
    }

    /// Aborts the retrieval. Entities already delivered elsewhere are unaffected.
    pub fn cancel(&self) {
        if let FutureState::Running(task) = &self.state {
            log::debug!("Cancelling deferred retrieval");
            task.abort();
        }
    }

    /// Returns `true` once the result is available without waiting.
    pub fn is_finished(&self) -> bool {
        match &self.state {
            FutureState::Running(task) => task.is_finished(),
            _ => true,
        }
    }
}

impl<T> Future for EntityFuture<T> {
    type Output = TypedStoreResult<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.state {
            FutureState::Running(task) => match Pin::new(task).poll(cx) {
                Poll::Pending => Poll::Pending,
                Poll::Ready(joined) => {
                    this.state = FutureState::Done;
                    Poll::Ready(joined.map_err(TypedStoreError::from).and_then(|r| r))
                }
            },
            FutureState::Failed(_) => {
                match std::mem::replace(&mut this.state, FutureState::Done) {
                    FutureState::Failed(err) => Poll::Ready(Err(err)),
                    _ => Poll::Pending,
                }
            }
            FutureState::Done => {
                log::error!("Entity future polled after completion");
                Poll::Ready(Err(TypedStoreError::new(
                    "Entity future polled after completion",
                    crate::errors::ErrorKind::InvalidOperation,
                )))
            }
        }
    }
}

impl<T> Drop for EntityFuture<T> {
    fn drop(&mut self) {
        if let FutureState::Running(task) = &self.state {
            task.abort();
        }
    }
}

impl<T> Debug for EntityFuture<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            FutureState::Failed(_) => "failed",
            FutureState::Running(_) => "running",
            FutureState::Done => "done",
        };
        f.debug_struct("EntityFuture").field("state", &state).finish()
    }
}
