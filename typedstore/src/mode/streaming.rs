use crate::descriptor::TypeDescriptor;
use crate::entity::TypedEntity;
use crate::errors::{TypedStoreError, TypedStoreResult};
use crate::materializer::materialize;
use crate::mode::{not_found, ExecutionMode, FetchPlan};
use crate::store::RecordStream;
use futures_util::stream::FusedStream;
use futures_util::{Stream, StreamExt};
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// Returns an [EntityStream] that materializes each record as the store emits it.
#[derive(Clone, Copy, Debug, Default)]
pub struct Streaming;

impl ExecutionMode for Streaming {
    type Single<T: TypedEntity> = EntityStream<T>;
    type Many<T: TypedEntity> = EntityStream<T>;

    fn single<T: TypedEntity>(&self, plan: TypedStoreResult<FetchPlan>) -> EntityStream<T> {
        match plan {
            Ok(plan) => {
                let missing = plan.single_id().map(str::to_string);
                EntityStream::open(plan.execute_stream(), plan.descriptor(), missing)
            }
            Err(err) => EntityStream::failed(err),
        }
    }

    fn many<T: TypedEntity>(&self, plan: TypedStoreResult<FetchPlan>) -> EntityStream<T> {
        match plan {
            Ok(plan) => EntityStream::open(plan.execute_stream(), plan.descriptor(), None),
            Err(err) => EntityStream::failed(err),
        }
    }
}

/// A finite stream of entities produced by one retrieval.
///
/// Each item is materialized when the store emits the underlying record. The first
/// error, whether reported by the store or raised while mapping a record, is yielded
/// once and then the stream ends; entities yielded before it stay valid. The stream
/// cannot be restarted, and dropping it stops consumption of the store's stream.
pub struct EntityStream<T> {
    records: Option<RecordStream>,
    descriptor: Option<Arc<TypeDescriptor>>,
    pending_error: Option<TypedStoreError>,
    // by-id retrievals report NotFound when the store emits nothing
    missing_id: Option<String>,
    emitted: usize,
    _entity: PhantomData<fn() -> T>,
}

impl<T> EntityStream<T> {
    fn open(
        records: RecordStream,
        descriptor: Arc<TypeDescriptor>,
        missing_id: Option<String>,
    ) -> Self {
        EntityStream {
            records: Some(records),
            descriptor: Some(descriptor),
            pending_error: None,
            missing_id,
            emitted: 0,
            _entity: PhantomData,
        }
    }

    fn failed(error: TypedStoreError) -> Self {
        EntityStream {
            records: None,
            descriptor: None,
            pending_error: Some(error),
            missing_id: None,
            emitted: 0,
            _entity: PhantomData,
        }
    }

    /// Number of entities yielded so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    fn terminate(&mut self) {
        self.records = None;
        self.descriptor = None;
        self.missing_id = None;
    }
}

impl<T: TypedEntity> Stream for EntityStream<T> {
    type Item = TypedStoreResult<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if let Some(err) = this.pending_error.take() {
            this.terminate();
            return Poll::Ready(Some(Err(err)));
        }

        let records = match this.records.as_mut() {
            Some(records) => records,
            None => return Poll::Ready(None),
        };

        match records.poll_next_unpin(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(record))) => {
                let result = match &this.descriptor {
                    Some(descriptor) => materialize::<T>(descriptor, record),
                    None => return Poll::Ready(None),
                };
                match result {
                    Ok(entity) => {
                        this.emitted += 1;
                        Poll::Ready(Some(Ok(entity)))
                    }
                    Err(err) => {
                        this.terminate();
                        Poll::Ready(Some(Err(err)))
                    }
                }
            }
            Poll::Ready(Some(Err(err))) => {
                this.terminate();
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                let missing = if this.emitted == 0 {
                    this.missing_id.take()
                } else {
                    None
                };
                this.terminate();
                match missing {
                    Some(id) => Poll::Ready(Some(Err(not_found(&id)))),
                    None => Poll::Ready(None),
                }
            }
        }
    }
}

impl<T: TypedEntity> FusedStream for EntityStream<T> {
    fn is_terminated(&self) -> bool {
        self.records.is_none() && self.pending_error.is_none()
    }
}

impl<T> Debug for EntityStream<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStream")
            .field("open", &self.records.is_some())
            .field("emitted", &self.emitted)
            .finish()
    }
}
