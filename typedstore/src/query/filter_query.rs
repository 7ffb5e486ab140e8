use super::projection::validate_id_field;
use crate::document::Document;
use crate::errors::TypedStoreResult;
use crate::query::{Filter, ScanConsistency};

/// A query returning the whole of every document matching a [Filter].
///
/// This is the full-document sibling of [ProjectionQuery](crate::query::ProjectionQuery):
/// same predicate, skip and limit, but nothing is left out of the returned content.
///
/// # Examples
///
/// ```rust,ignore
/// let query = FilterQuery::new(field("address.city").eq("Oslo")).limit(10);
/// let people = template.blocking().find_by_filter::<Person>(&query)?;
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FilterQuery {
    filter: Filter,
    skip: usize,
    limit: Option<usize>,
    consistency: Option<ScanConsistency>,
    id_field: Option<String>,
}

impl FilterQuery {
    pub fn new(filter: Filter) -> Self {
        FilterQuery {
            filter,
            skip: 0,
            limit: None,
            consistency: None,
            id_field: None,
        }
    }

    /// Matches every document.
    pub fn all() -> Self {
        Self::new(Filter::All)
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn consistency(mut self, consistency: ScanConsistency) -> Self {
        self.consistency = Some(consistency);
        self
    }

    /// Names the field that filters resolve to the document id.
    pub fn id_field(mut self, id_field: &str) -> Self {
        self.id_field = Some(id_field.to_string());
        self
    }

    pub fn get_filter(&self) -> &Filter {
        &self.filter
    }

    pub fn get_skip(&self) -> usize {
        self.skip
    }

    pub fn get_limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn get_consistency(&self) -> Option<ScanConsistency> {
        self.consistency
    }

    pub fn get_id_field(&self) -> Option<&str> {
        self.id_field.as_deref()
    }

    /// Whether the stored document `id` passes the filter.
    pub fn matches(&self, id: &str, document: &Document) -> TypedStoreResult<bool> {
        self.filter
            .apply_to_record(self.id_field.as_deref(), id, document)
    }

    pub(crate) fn with_default_consistency(&self, consistency: ScanConsistency) -> Self {
        let mut query = self.clone();
        query.consistency.get_or_insert(consistency);
        query
    }

    pub(crate) fn with_default_id_field(&self, id_field: &str) -> Self {
        let mut query = self.clone();
        query.id_field.get_or_insert_with(|| id_field.to_string());
        query
    }

    pub fn validate(&self) -> TypedStoreResult<()> {
        validate_id_field(self.id_field.as_deref())
    }
}
