use im::OrdMap;
use smallvec::SmallVec;

use crate::common::{Value, FIELD_SEPARATOR};
use crate::errors::{ErrorKind, TypedStoreError, TypedStoreResult};
use itertools::Itertools;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};

type FieldVec = SmallVec<[String; 8]>;

/// Represents the raw content of one stored document using a persistent data structure.
///
/// A document is composed of key-value pairs. The key is always a [String] and the value
/// is a [Value]. Nested documents are addressed with keys separated by [FIELD_SEPARATOR],
/// so the value inside `{"a": {"b": 1}}` is reachable with `document.get("a.b")`.
///
/// Store clients hand documents back wrapped in a [RawRecord](crate::document::RawRecord);
/// the materializer converts them into entities.
///
/// ## Persistent Design
///
/// This struct uses `im::OrdMap` (a persistent ordered map):
/// - O(1) cloning via internal Arc sharing
/// - Mutations create new maps via structural sharing
/// - Records cloned out of a store never alias the stored copy
#[derive(Clone, Eq, PartialEq, Hash, Default, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Document {
    data: OrdMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let doc = Document::new();
    /// assert!(doc.is_empty());
    /// assert_eq!(doc.size(), 0);
    /// ```
    pub fn new() -> Self {
        Document {
            data: OrdMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Associates the specified [Value] with the specified key in this document.
    ///
    /// If the key already exists its value is replaced. Embedded keys such as
    /// `"location.address.zip"` create the intermediate documents as needed.
    ///
    /// # Arguments
    ///
    /// * `key` - The key as a string or string slice. Cannot be empty.
    /// * `value` - Anything convertible into a [Value].
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::InvalidOperation] if the key, or any segment of an embedded key,
    /// is empty.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let mut doc = Document::new();
    /// doc.put("user.name", "Alice")?;
    /// assert_eq!(doc.get("user.name")?, Value::String("Alice".to_string()));
    /// ```
    pub fn put<'a, T: Into<Value>>(
        &mut self,
        key: impl Into<Cow<'a, str>>,
        value: T,
    ) -> TypedStoreResult<()> {
        let key = key.into();
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(TypedStoreError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        let value = value.into();
        if key.contains(FIELD_SEPARATOR) {
            let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
            self.deep_put(&splits, value)
        } else {
            self.data = self.data.update(key.to_string(), value);
            Ok(())
        }
    }

    /// Returns the [Value] associated with `key`, or [Value::Null] when there is none.
    ///
    /// Embedded keys traverse nested documents; a numeric segment indexes into an array,
    /// any other segment applied to an array collects the matching values of its elements.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let doc = doc!{ location: { city: "New York" }, items: [1, 2, 3] };
    /// assert_eq!(doc.get("location.city")?, Value::String("New York".to_string()));
    /// assert_eq!(doc.get("items.1")?, Value::I32(2));
    /// assert_eq!(doc.get("missing")?, Value::Null);
    /// ```
    pub fn get(&self, key: &str) -> TypedStoreResult<Value> {
        match self.data.get(key) {
            Some(value) => Ok(value.clone()),
            None => {
                if key.contains(FIELD_SEPARATOR) {
                    self.get_by_embedded_key(key)
                } else {
                    Ok(Value::Null)
                }
            }
        }
    }

    /// Returns all field paths of this document, descending into nested documents.
    pub fn fields(&self) -> FieldVec {
        self.get_fields_internal("")
    }

    /// Removes the mapping for `key`. Removing the last field of a nested document removes
    /// the nested document too.
    pub fn remove(&mut self, key: &str) -> TypedStoreResult<()> {
        if key.contains(FIELD_SEPARATOR) && !self.data.contains_key(key) {
            let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
            self.deep_remove(&splits)
        } else {
            self.data = self.data.without(key);
            Ok(())
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Copies every field of `other` into this document, merging nested documents.
    pub fn merge(&mut self, other: &Document) -> TypedStoreResult<()> {
        for (key, value) in other.data.iter() {
            match (self.data.get(key), value) {
                (Some(Value::Document(current)), Value::Document(incoming)) => {
                    let mut merged = current.clone();
                    merged.merge(incoming)?;
                    self.data = self.data.update(key.clone(), Value::Document(merged));
                }
                _ => {
                    self.data = self.data.update(key.clone(), value.clone());
                }
            }
        }
        Ok(())
    }

    /// Checks whether a top level key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Checks whether a field path, embedded or not, is present.
    pub fn contains_field(&self, field: &str) -> bool {
        if self.contains_key(field) {
            true
        } else {
            self.fields().iter().any(|f| f == field)
        }
    }

    pub fn to_map(&self) -> BTreeMap<String, Value> {
        self.data
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Iterates over the top level entries in key order.
    pub fn iter(&self) -> DocumentIter {
        DocumentIter {
            keys: self.data.keys().cloned().collect(),
            data: self.clone(),
            index: 0,
        }
    }

    pub(crate) fn to_pretty_json(&self, indent: usize) -> String {
        if self.data.is_empty() {
            return "{}".to_string();
        }

        let estimated_size = self.data.len() * 30 + indent * 2;
        let mut json_string = String::with_capacity(estimated_size);

        json_string.push_str("{\n");
        let indent_str = " ".repeat(indent + 2);
        for (key, value) in self.data.iter() {
            json_string.push_str(&format!(
                "{}\"{}\": {},\n",
                indent_str,
                key,
                value.to_pretty_json(indent + 2)
            ));
        }

        json_string.pop();
        json_string.pop();
        json_string.push_str(&format!("\n{}}}", " ".repeat(indent)));
        json_string
    }

    pub(crate) fn to_debug_string(&self, indent: usize) -> String {
        if self.data.is_empty() {
            return "{}".to_string();
        }

        let mut debug_string = String::new();
        debug_string.push_str("{\n");
        let indent_str = " ".repeat(indent + 2);
        for (key, value) in self.data.iter() {
            debug_string.push_str(&format!(
                "{}\"{}\": {},\n",
                indent_str,
                key,
                value.to_debug_string(indent + 2)
            ));
        }

        debug_string.pop();
        debug_string.pop();
        debug_string.push_str(&format!("\n{}}}", " ".repeat(indent)));
        debug_string
    }

    fn get_fields_internal(&self, prefix: &str) -> FieldVec {
        let mut fields = FieldVec::new();
        for key in self.data.keys() {
            if key.is_empty() {
                continue;
            }

            let field = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}{}{}", prefix, FIELD_SEPARATOR, key)
            };

            match self.data.get(key) {
                Some(Value::Document(doc)) if !doc.is_empty() => {
                    fields.append(&mut doc.get_fields_internal(&field));
                }
                _ => fields.push(field),
            }
        }
        fields
    }

    fn deep_put(&mut self, splits: &[&str], value: Value) -> TypedStoreResult<()> {
        let Some((key, remaining)) = splits.split_first() else {
            log::error!("Empty embedded key");
            return Err(TypedStoreError::new(
                "Empty embedded key",
                ErrorKind::InvalidOperation,
            ));
        };

        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(TypedStoreError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        if remaining.is_empty() {
            self.data = self.data.update(key.to_string(), value);
            return Ok(());
        }

        // descend into the existing nested document, or start a fresh one
        let mut nested = match self.data.get(*key) {
            Some(Value::Document(obj)) => obj.clone(),
            _ => Document::new(),
        };
        let result = nested.deep_put(remaining, value);
        self.data = self.data.update(key.to_string(), Value::Document(nested));
        result
    }

    fn deep_remove(&mut self, splits: &[&str]) -> TypedStoreResult<()> {
        let Some((key, remaining)) = splits.split_first() else {
            log::error!("Empty embedded key");
            return Err(TypedStoreError::new(
                "Empty embedded key",
                ErrorKind::InvalidOperation,
            ));
        };

        if remaining.is_empty() {
            self.data = self.data.without(*key);
            return Ok(());
        }

        if let Some(Value::Document(obj)) = self.data.get(*key) {
            let mut nested = obj.clone();
            let result = nested.deep_remove(remaining);
            if nested.is_empty() {
                self.data = self.data.without(*key);
            } else {
                self.data = self.data.update(key.to_string(), Value::Document(nested));
            }
            result
        } else {
            Ok(())
        }
    }

    fn get_by_embedded_key(&self, key: &str) -> TypedStoreResult<Value> {
        let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
        let Some((first, remaining)) = splits.split_first() else {
            return Ok(Value::Null);
        };

        if first.is_empty() {
            log::error!("Document does not support empty key");
            return Err(TypedStoreError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        self.recursive_get(self.data.get(*first), remaining)
    }

    fn recursive_get(&self, value: Option<&Value>, splits: &[&str]) -> TypedStoreResult<Value> {
        let value = match value {
            None => return Ok(Value::Null),
            Some(v) => v,
        };

        let Some((key, remaining)) = splits.split_first() else {
            return Ok(value.clone());
        };

        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(TypedStoreError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        match value {
            Value::Document(obj) => self.recursive_get(obj.data.get(*key), remaining),
            Value::Array(arr) => {
                if let Ok(index) = key.parse::<usize>() {
                    if index >= arr.len() {
                        log::error!("Array index {} out of bound", index);
                        return Err(TypedStoreError::new(
                            &format!("Array index {} out of bound", index),
                            ErrorKind::InvalidOperation,
                        ));
                    }
                    self.recursive_get(Some(&arr[index]), remaining)
                } else {
                    // not an index, collect the field from every element
                    self.decompose(arr, splits)
                }
            }
            _ => Ok(Value::Null),
        }
    }

    fn decompose(&self, arr: &[Value], splits: &[&str]) -> TypedStoreResult<Value> {
        let mut items: Vec<Value> = Vec::with_capacity(arr.len());
        for item in arr {
            match self.recursive_get(Some(item), splits)? {
                Value::Array(values) => items.extend(values),
                Value::Null => {}
                value => items.push(value),
            }
        }
        Ok(Value::Array(items.into_iter().unique().collect()))
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_debug_string(0))
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_pretty_json(0))
    }
}

pub struct DocumentIter {
    keys: Vec<String>,
    data: Document,
    index: usize,
}

impl Iterator for DocumentIter {
    type Item = (String, Value);

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.keys.len() {
            let key = &self.keys[self.index];
            self.index += 1;
            if let Some(value) = self.data.data.get(key) {
                return Some((key.clone(), value.clone()));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.keys.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

/// Strips the quotes `stringify!` leaves around string literal keys in [doc!](crate::doc).
pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a [Document] with JSON-like syntax.
///
/// # Examples
///
/// ```rust
/// use typedstore::doc;
///
/// let empty = doc!{};
///
/// let person = doc!{
///     name: "Alice",
///     age: 30,
///     address: {
///         city: "Berlin",
///         tags: ["home", "primary"]
///     }
/// };
///
/// let base = 100;
/// let computed = doc!{ score: (base * 2) };
/// ```
#[macro_export]
macro_rules! doc {
    ({}) => {
        $crate::document::Document::new()
    };

    () => {
        $crate::document::Document::new()
    };

    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::doc!($($key : $value),*)
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut doc = $crate::document::Document::new();
            $(
                doc.put($crate::document::normalize(stringify!($key)), $crate::doc_value!($value))
                .expect(&format!("Failed to put value {} in document", stringify!($value)));
            )*
            doc
        }
    };
}

/// Helper macro to convert values for the [doc!](crate::doc) macro.
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        {
            $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
        }
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
