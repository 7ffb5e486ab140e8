use crate::common::{Value, DEFAULT_VIEW_NAME};
use crate::errors::{ErrorKind, TypedStoreError, TypedStoreResult};
use crate::query::ScanConsistency;
use std::cmp::Ordering;

/// A query against a precomputed secondary index (a view).
///
/// A view is addressed by its design document and view name. Rows can be narrowed by an
/// exact key, a set of keys or a key range, then paged with `skip` and `limit`. Rows come
/// back in key order, reversed when `descending` is set.
///
/// The query is immutable once built: every option is set through a consuming builder
/// method and read back through a getter.
///
/// # Examples
///
/// ```rust,ignore
/// let query = ViewQuery::new("person", "by_age")
///     .range(18, 65)
///     .inclusive_end(false)
///     .limit(10)
///     .consistency(ScanConsistency::RequestPlus);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ViewQuery {
    design_document: String,
    view_name: String,
    key: Option<Value>,
    keys: Option<Vec<Value>>,
    start_key: Option<Value>,
    end_key: Option<Value>,
    inclusive_end: bool,
    skip: usize,
    limit: Option<usize>,
    descending: bool,
    consistency: Option<ScanConsistency>,
}

impl ViewQuery {
    pub fn new(design_document: &str, view_name: &str) -> Self {
        ViewQuery {
            design_document: design_document.to_string(),
            view_name: view_name.to_string(),
            key: None,
            keys: None,
            start_key: None,
            end_key: None,
            inclusive_end: true,
            skip: 0,
            limit: None,
            descending: false,
            consistency: None,
        }
    }

    /// Queries the default view of a design document.
    pub fn all(design_document: &str) -> Self {
        ViewQuery::new(design_document, DEFAULT_VIEW_NAME)
    }

    pub fn key<T: Into<Value>>(mut self, key: T) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn keys<T: Into<Value>>(mut self, keys: Vec<T>) -> Self {
        self.keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Restricts rows to keys between `start` and `end`. With `descending` set, `start`
    /// is the upper bound.
    pub fn range<S: Into<Value>, E: Into<Value>>(mut self, start: S, end: E) -> Self {
        self.start_key = Some(start.into());
        self.end_key = Some(end.into());
        self
    }

    pub fn start_key<T: Into<Value>>(mut self, start: T) -> Self {
        self.start_key = Some(start.into());
        self
    }

    pub fn end_key<T: Into<Value>>(mut self, end: T) -> Self {
        self.end_key = Some(end.into());
        self
    }

    pub fn inclusive_end(mut self, inclusive_end: bool) -> Self {
        self.inclusive_end = inclusive_end;
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

    pub fn descending(mut self, descending: bool) -> Self {
        self.descending = descending;
        self
    }

    pub fn consistency(mut self, consistency: ScanConsistency) -> Self {
        self.consistency = Some(consistency);
        self
    }

    pub fn design_document(&self) -> &str {
        &self.design_document
    }

    pub fn view_name(&self) -> &str {
        &self.view_name
    }

    pub fn get_key(&self) -> Option<&Value> {
        self.key.as_ref()
    }

    pub fn get_keys(&self) -> Option<&[Value]> {
        self.keys.as_deref()
    }

    pub fn get_start_key(&self) -> Option<&Value> {
        self.start_key.as_ref()
    }

    pub fn get_end_key(&self) -> Option<&Value> {
        self.end_key.as_ref()
    }

    pub fn is_inclusive_end(&self) -> bool {
        self.inclusive_end
    }

    pub fn get_skip(&self) -> usize {
        self.skip
    }

    pub fn get_limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn is_descending(&self) -> bool {
        self.descending
    }

    pub fn get_consistency(&self) -> Option<ScanConsistency> {
        self.consistency
    }

    /// Returns a copy carrying `consistency` unless the query already names one.
    pub(crate) fn with_default_consistency(&self, consistency: ScanConsistency) -> Self {
        let mut query = self.clone();
        query.consistency.get_or_insert(consistency);
        query
    }

    /// Whether a row with `key` passes the key, keys and range restrictions.
    pub fn matches_key(&self, key: &Value) -> bool {
        if let Some(expected) = &self.key {
            if expected != key {
                return false;
            }
        }

        if let Some(keys) = &self.keys {
            if !keys.contains(key) {
                return false;
            }
        }

        let (lower, upper) = if self.descending {
            (&self.end_key, &self.start_key)
        } else {
            (&self.start_key, &self.end_key)
        };

        // the end key is the bound reached last in scan order
        let (lower_inclusive, upper_inclusive) = if self.descending {
            (self.inclusive_end, true)
        } else {
            (true, self.inclusive_end)
        };

        if let Some(lower) = lower {
            match key.cmp(lower) {
                Ordering::Less => return false,
                Ordering::Equal if !lower_inclusive => return false,
                _ => {}
            }
        }

        if let Some(upper) = upper {
            match key.cmp(upper) {
                Ordering::Greater => return false,
                Ordering::Equal if !upper_inclusive => return false,
                _ => {}
            }
        }
        true
    }

    pub fn validate(&self) -> TypedStoreResult<()> {
        if self.design_document.is_empty() || self.view_name.is_empty() {
            log::error!("View query requires a design document and a view name");
            return Err(TypedStoreError::new(
                "View query requires a design document and a view name",
                ErrorKind::InvalidQuery,
            ));
        }

        if self.key.is_some() && self.keys.is_some() {
            log::error!("View query cannot combine a key with a key set");
            return Err(TypedStoreError::new(
                "View query cannot combine a key with a key set",
                ErrorKind::InvalidQuery,
            ));
        }

        if let (Some(start), Some(end)) = (&self.start_key, &self.end_key) {
            let inverted = if self.descending { start < end } else { start > end };
            if inverted {
                log::error!("View query range {} to {} is inverted", start, end);
                return Err(TypedStoreError::new(
                    &format!("View query range {} to {} is inverted", start, end),
                    ErrorKind::InvalidQuery,
                ));
            }
        }

        if let Some(bytes) = [&self.key, &self.start_key, &self.end_key]
            .into_iter()
            .flatten()
            .find(|k| k.as_bytes().is_some())
        {
            log::error!("View keys cannot be binary: {}", bytes);
            return Err(TypedStoreError::new(
                "View keys cannot be binary",
                ErrorKind::InvalidQuery,
            ));
        }
        Ok(())
    }
}
