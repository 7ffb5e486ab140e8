use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Operations a store client counts calls for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    FetchById,
    FetchByQuery,
    FetchBySpatialQuery,
    FetchByFilter,
    FetchByProjection,
    Upsert,
    Remove,
    Exists,
}

impl StoreOperation {
    const ALL: [StoreOperation; 8] = [
        StoreOperation::FetchById,
        StoreOperation::FetchByQuery,
        StoreOperation::FetchBySpatialQuery,
        StoreOperation::FetchByFilter,
        StoreOperation::FetchByProjection,
        StoreOperation::Upsert,
        StoreOperation::Remove,
        StoreOperation::Exists,
    ];

    fn index(&self) -> usize {
        match self {
            StoreOperation::FetchById => 0,
            StoreOperation::FetchByQuery => 1,
            StoreOperation::FetchBySpatialQuery => 2,
            StoreOperation::FetchByFilter => 3,
            StoreOperation::FetchByProjection => 4,
            StoreOperation::Upsert => 5,
            StoreOperation::Remove => 6,
            StoreOperation::Exists => 7,
        }
    }

    pub fn is_fetch(&self) -> bool {
        matches!(
            self,
            StoreOperation::FetchById
                | StoreOperation::FetchByQuery
                | StoreOperation::FetchBySpatialQuery
                | StoreOperation::FetchByFilter
                | StoreOperation::FetchByProjection
        )
    }
}

impl Display for StoreOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreOperation::FetchById => write!(f, "fetch_by_id"),
            StoreOperation::FetchByQuery => write!(f, "fetch_by_query"),
            StoreOperation::FetchBySpatialQuery => write!(f, "fetch_by_spatial_query"),
            StoreOperation::FetchByFilter => write!(f, "fetch_by_filter"),
            StoreOperation::FetchByProjection => write!(f, "fetch_by_projection"),
            StoreOperation::Upsert => write!(f, "upsert"),
            StoreOperation::Remove => write!(f, "remove"),
            StoreOperation::Exists => write!(f, "exists"),
        }
    }
}

/// Per-operation call counters of a store client.
///
/// A call is counted when it is issued, whatever its outcome and whichever execution
/// form (blocking, future or stream) issued it. Cloning is cheap; clones share counters.
#[derive(Clone, Default)]
pub struct StoreStats {
    counters: Arc<[AtomicUsize; 8]>,
}

impl StoreStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, operation: StoreOperation) {
        self.counters[operation.index()].fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self, operation: StoreOperation) -> usize {
        self.counters[operation.index()].load(Ordering::SeqCst)
    }

    /// Total number of fetch calls of any kind.
    pub fn fetch_count(&self) -> usize {
        StoreOperation::ALL
            .iter()
            .filter(|op| op.is_fetch())
            .map(|op| self.count(*op))
            .sum()
    }

    /// Total number of calls of any kind.
    pub fn total(&self) -> usize {
        StoreOperation::ALL.iter().map(|op| self.count(*op)).sum()
    }

    pub fn reset(&self) {
        for counter in self.counters.iter() {
            counter.store(0, Ordering::SeqCst);
        }
    }
}

impl std::fmt::Debug for StoreStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for op in StoreOperation::ALL.iter() {
            map.entry(&op.to_string(), &self.count(*op));
        }
        map.finish()
    }
}
