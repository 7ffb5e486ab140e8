use crate::common::Value;
use crate::document::Document;
use crate::errors::{ErrorKind, TypedStoreError, TypedStoreResult};
use crate::query::{Filter, ScanConsistency};

/// A query returning a subset of fields of every document matching a [Filter].
///
/// Entity fields left out of the projection are materialized with their type's default
/// value. The identifier is always carried by the record itself, so it does not need to
/// be listed. Filters on the identifier field compare against the document id once the
/// query is bound to that field with [ProjectionQuery::id_field]; typed retrieval binds it
/// to the entity's identifier field.
///
/// # Examples
///
/// ```rust,ignore
/// let query = ProjectionQuery::new(vec!["name", "address.city"])
///     .filter(field("age").gte(18))
///     .limit(20);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectionQuery {
    fields: Vec<String>,
    filter: Filter,
    skip: usize,
    limit: Option<usize>,
    consistency: Option<ScanConsistency>,
    id_field: Option<String>,
}

impl ProjectionQuery {
    pub fn new(fields: Vec<&str>) -> Self {
        ProjectionQuery {
            fields: fields.into_iter().map(|f| f.to_string()).collect(),
            filter: Filter::All,
            skip: 0,
            limit: None,
            consistency: None,
            id_field: None,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
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

    pub fn fields(&self) -> &[String] {
        &self.fields
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

    /// Copies the projected fields of `document` into a new document. Fields missing from
    /// the source are left out rather than written as null.
    pub fn project(&self, document: &Document) -> TypedStoreResult<Document> {
        let mut projected = Document::new();
        for field in &self.fields {
            let value = document.get(field)?;
            if !matches!(value, Value::Null) {
                projected.put(field.as_str(), value)?;
            }
        }
        Ok(projected)
    }

    pub fn validate(&self) -> TypedStoreResult<()> {
        if self.fields.is_empty() {
            log::error!("Projection query requires at least one field");
            return Err(TypedStoreError::new(
                "Projection query requires at least one field",
                ErrorKind::InvalidQuery,
            ));
        }

        validate_id_field(self.id_field.as_deref())?;

        if let Some(empty) = self.fields.iter().find(|f| f.trim().is_empty()) {
            log::error!("Projection query contains an empty field name {:?}", empty);
            return Err(TypedStoreError::new(
                "Projection query contains an empty field name",
                ErrorKind::InvalidQuery,
            ));
        }
        Ok(())
    }
}

pub(crate) fn validate_id_field(id_field: Option<&str>) -> TypedStoreResult<()> {
    if let Some(id_field) = id_field {
        if id_field.trim().is_empty() {
            log::error!("Query id field name cannot be empty");
            return Err(TypedStoreError::new(
                "Query id field name cannot be empty",
                ErrorKind::InvalidQuery,
            ));
        }
    }
    Ok(())
}
