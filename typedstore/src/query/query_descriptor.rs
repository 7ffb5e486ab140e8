use crate::errors::{ErrorKind, TypedStoreError, TypedStoreResult};
use crate::query::{FilterQuery, ProjectionQuery, ScanConsistency, SpatialQuery, ViewQuery};
use std::fmt::{Display, Formatter};

/// Everything a retrieval can be asked to fetch: one document by identifier, or the
/// results of a view, spatial, filter or projection query.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryDescriptor {
    ById(String),
    SecondaryIndex(ViewQuery),
    Spatial(SpatialQuery),
    Filter(FilterQuery),
    Projection(ProjectionQuery),
}

impl QueryDescriptor {
    /// Checks the descriptor before any store call is made.
    pub fn validate(&self) -> TypedStoreResult<()> {
        match self {
            QueryDescriptor::ById(id) => {
                if id.is_empty() {
                    log::error!("Document id cannot be empty");
                    return Err(TypedStoreError::new(
                        "Document id cannot be empty",
                        ErrorKind::InvalidId,
                    ));
                }
                Ok(())
            }
            QueryDescriptor::SecondaryIndex(query) => query.validate(),
            QueryDescriptor::Spatial(query) => query.validate(),
            QueryDescriptor::Filter(query) => query.validate(),
            QueryDescriptor::Projection(query) => query.validate(),
        }
    }

    /// Fills in `consistency` on queries that do not name one.
    pub(crate) fn with_default_consistency(self, consistency: ScanConsistency) -> Self {
        match self {
            QueryDescriptor::ById(id) => QueryDescriptor::ById(id),
            QueryDescriptor::SecondaryIndex(query) => {
                QueryDescriptor::SecondaryIndex(query.with_default_consistency(consistency))
            }
            QueryDescriptor::Spatial(query) => {
                QueryDescriptor::Spatial(query.with_default_consistency(consistency))
            }
            QueryDescriptor::Filter(query) => {
                QueryDescriptor::Filter(query.with_default_consistency(consistency))
            }
            QueryDescriptor::Projection(query) => {
                QueryDescriptor::Projection(query.with_default_consistency(consistency))
            }
        }
    }

    /// Binds predicate queries that name no id field to `id_field`.
    pub(crate) fn with_default_id_field(self, id_field: &str) -> Self {
        match self {
            QueryDescriptor::Filter(query) => {
                QueryDescriptor::Filter(query.with_default_id_field(id_field))
            }
            QueryDescriptor::Projection(query) => {
                QueryDescriptor::Projection(query.with_default_id_field(id_field))
            }
            other => other,
        }
    }
}

impl Display for QueryDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryDescriptor::ById(id) => write!(f, "by id {}", id),
            QueryDescriptor::SecondaryIndex(query) => write!(
                f,
                "view {}/{}",
                query.design_document(),
                query.view_name()
            ),
            QueryDescriptor::Spatial(query) => write!(
                f,
                "spatial view {}/{}",
                query.design_document(),
                query.view_name()
            ),
            QueryDescriptor::Filter(query) => write!(f, "filter {}", query.get_filter()),
            QueryDescriptor::Projection(query) => write!(
                f,
                "projection of [{}] where {}",
                query.fields().join(", "),
                query.get_filter()
            ),
        }
    }
}
