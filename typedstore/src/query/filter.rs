use crate::common::Value;
use crate::document::Document;
use crate::errors::TypedStoreResult;
use itertools::Itertools;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// A predicate evaluated by the store against each candidate document of a projection
/// query.
///
/// Filters are plain values: cloneable, comparable and printable. Build them with
/// [all], [field] and the combinators [and], [or] and [not].
///
/// # Examples
///
/// ```rust,ignore
/// use typedstore::query::{and, field};
///
/// let adults_in_berlin = and(vec![
///     field("age").gte(18),
///     field("address.city").eq("Berlin"),
/// ]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    All,
    Eq(String, Value),
    Ne(String, Value),
    Gt(String, Value),
    Gte(String, Value),
    Lt(String, Value),
    Lte(String, Value),
    In(String, Vec<Value>),
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    /// Evaluates this filter against `document`.
    ///
    /// Relational comparisons only match when both sides are numbers or both are strings;
    /// a missing field never satisfies them.
    pub fn apply(&self, document: &Document) -> TypedStoreResult<bool> {
        match self {
            Filter::All => Ok(true),
            Filter::Eq(name, value) => Ok(&document.get(name)? == value),
            Filter::Ne(name, value) => Ok(&document.get(name)? != value),
            Filter::Gt(name, value) => compare(document, name, value, |o| o == Ordering::Greater),
            Filter::Gte(name, value) => compare(document, name, value, |o| o != Ordering::Less),
            Filter::Lt(name, value) => compare(document, name, value, |o| o == Ordering::Less),
            Filter::Lte(name, value) => compare(document, name, value, |o| o != Ordering::Greater),
            Filter::In(name, values) => {
                let actual = document.get(name)?;
                Ok(values.contains(&actual))
            }
            Filter::And(filters) => {
                for filter in filters {
                    if !filter.apply(document)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Filter::Or(filters) => {
                for filter in filters {
                    if filter.apply(document)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Filter::Not(filter) => Ok(!filter.apply(document)?),
        }
    }

    /// Evaluates this filter against a stored record.
    ///
    /// When `id_field` is given, that field reads as the record's id whatever the content
    /// holds under it, the same way materialization treats the identifier.
    pub fn apply_to_record(
        &self,
        id_field: Option<&str>,
        id: &str,
        document: &Document,
    ) -> TypedStoreResult<bool> {
        match id_field {
            Some(id_field) => {
                let mut candidate = document.clone();
                candidate.put(id_field, id)?;
                self.apply(&candidate)
            }
            None => self.apply(document),
        }
    }

    pub fn and(self, other: Filter) -> Filter {
        match self {
            Filter::And(mut filters) => {
                filters.push(other);
                Filter::And(filters)
            }
            filter => Filter::And(vec![filter, other]),
        }
    }

    pub fn or(self, other: Filter) -> Filter {
        match self {
            Filter::Or(mut filters) => {
                filters.push(other);
                Filter::Or(filters)
            }
            filter => Filter::Or(vec![filter, other]),
        }
    }

    pub fn not(self) -> Filter {
        Filter::Not(Box::new(self))
    }
}

fn compare(
    document: &Document,
    name: &str,
    expected: &Value,
    accept: impl Fn(Ordering) -> bool,
) -> TypedStoreResult<bool> {
    let actual = document.get(name)?;
    let comparable = (actual.is_number() && expected.is_number())
        || (actual.is_string() && expected.is_string());
    Ok(comparable && accept(actual.cmp(expected)))
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::All => write!(f, "true"),
            Filter::Eq(name, value) => write!(f, "({} == {})", name, value),
            Filter::Ne(name, value) => write!(f, "({} != {})", name, value),
            Filter::Gt(name, value) => write!(f, "({} > {})", name, value),
            Filter::Gte(name, value) => write!(f, "({} >= {})", name, value),
            Filter::Lt(name, value) => write!(f, "({} < {})", name, value),
            Filter::Lte(name, value) => write!(f, "({} <= {})", name, value),
            Filter::In(name, values) => {
                write!(f, "({} in [{}])", name, values.iter().join(", "))
            }
            Filter::And(filters) => write!(f, "({})", filters.iter().join(" && ")),
            Filter::Or(filters) => write!(f, "({})", filters.iter().join(" || ")),
            Filter::Not(filter) => write!(f, "!{}", filter),
        }
    }
}

/// Matches every document.
pub fn all() -> Filter {
    Filter::All
}

pub fn and(filters: Vec<Filter>) -> Filter {
    Filter::And(filters)
}

pub fn or(filters: Vec<Filter>) -> Filter {
    Filter::Or(filters)
}

pub fn not(filter: Filter) -> Filter {
    Filter::Not(Box::new(filter))
}

/// Starts a fluent filter on the named field. Embedded fields use the `.` separator.
pub fn field(field_name: &str) -> FluentFilter {
    FluentFilter {
        field_name: field_name.to_string(),
    }
}

/// Builds single-field filters. Returned by [field].
pub struct FluentFilter {
    field_name: String,
}

impl FluentFilter {
    #[inline]
    pub fn eq<T: Into<Value>>(self, value: T) -> Filter {
        Filter::Eq(self.field_name, value.into())
    }

    #[inline]
    pub fn ne<T: Into<Value>>(self, value: T) -> Filter {
        Filter::Ne(self.field_name, value.into())
    }

    #[inline]
    pub fn gt<T: Into<Value>>(self, value: T) -> Filter {
        Filter::Gt(self.field_name, value.into())
    }

    #[inline]
    pub fn gte<T: Into<Value>>(self, value: T) -> Filter {
        Filter::Gte(self.field_name, value.into())
    }

    #[inline]
    pub fn lt<T: Into<Value>>(self, value: T) -> Filter {
        Filter::Lt(self.field_name, value.into())
    }

    #[inline]
    pub fn lte<T: Into<Value>>(self, value: T) -> Filter {
        Filter::Lte(self.field_name, value.into())
    }

    /// Matches documents whose field equals any of `values`.
    pub fn in_array<T: Into<Value>>(self, values: Vec<T>) -> Filter {
        Filter::In(self.field_name, values.into_iter().map(Into::into).collect())
    }
}
