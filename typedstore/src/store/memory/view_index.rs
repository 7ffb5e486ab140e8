use crate::common::Value;
use crate::document::Document;
use crate::errors::TypedStoreResult;
use std::collections::BTreeMap;

/// Defines a secondary index of the in-memory store.
///
/// The view emits one row per stored document whose `key_field` is not null, keyed by
/// that field's value. `emit_when` narrows the emitted documents to those carrying a
/// given value in a field, typically a type marker.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewDefinition {
    design_document: String,
    view_name: String,
    key_field: String,
    condition: Option<(String, Value)>,
}

impl ViewDefinition {
    pub fn new(design_document: &str, view_name: &str, key_field: &str) -> Self {
        ViewDefinition {
            design_document: design_document.to_string(),
            view_name: view_name.to_string(),
            key_field: key_field.to_string(),
            condition: None,
        }
    }

    pub fn emit_when<T: Into<Value>>(mut self, field: &str, value: T) -> Self {
        self.condition = Some((field.to_string(), value.into()));
        self
    }

    pub fn design_document(&self) -> &str {
        &self.design_document
    }

    pub fn view_name(&self) -> &str {
        &self.view_name
    }

    pub(crate) fn emit(&self, document: &Document) -> TypedStoreResult<Option<Value>> {
        if !passes(&self.condition, document)? {
            return Ok(None);
        }
        let key = document.get(&self.key_field)?;
        Ok(if key.is_null() { None } else { Some(key) })
    }
}

/// Defines a spatial index of the in-memory store.
///
/// The view emits one point per stored document whose `x_field` and `y_field` both hold
/// numbers.
#[derive(Clone, Debug, PartialEq)]
pub struct SpatialViewDefinition {
    design_document: String,
    view_name: String,
    x_field: String,
    y_field: String,
    condition: Option<(String, Value)>,
}

impl SpatialViewDefinition {
    pub fn new(design_document: &str, view_name: &str, x_field: &str, y_field: &str) -> Self {
        SpatialViewDefinition {
            design_document: design_document.to_string(),
            view_name: view_name.to_string(),
            x_field: x_field.to_string(),
            y_field: y_field.to_string(),
            condition: None,
        }
    }

    pub fn emit_when<T: Into<Value>>(mut self, field: &str, value: T) -> Self {
        self.condition = Some((field.to_string(), value.into()));
        self
    }

    pub fn design_document(&self) -> &str {
        &self.design_document
    }

    pub fn view_name(&self) -> &str {
        &self.view_name
    }

    pub(crate) fn emit(&self, document: &Document) -> TypedStoreResult<Option<(f64, f64)>> {
        if !passes(&self.condition, document)? {
            return Ok(None);
        }
        let x = document.get(&self.x_field)?.as_number();
        let y = document.get(&self.y_field)?.as_number();
        Ok(x.zip(y))
    }
}

fn passes(condition: &Option<(String, Value)>, document: &Document) -> TypedStoreResult<bool> {
    match condition {
        Some((field, expected)) => Ok(&document.get(field)? == expected),
        None => Ok(true),
    }
}

/// A materialized view: rows sorted by key then document id, and the store revision the
/// rows were built at.
pub(crate) struct ViewIndex {
    pub(crate) definition: ViewDefinition,
    pub(crate) rows: Vec<(Value, String)>,
    pub(crate) built_at: Option<u64>,
}

impl ViewIndex {
    pub(crate) fn new(definition: ViewDefinition) -> Self {
        ViewIndex {
            definition,
            rows: Vec::new(),
            built_at: None,
        }
    }

    pub(crate) fn rebuild(
        &mut self,
        documents: &BTreeMap<String, StoredDocument>,
        revision: u64,
    ) -> TypedStoreResult<()> {
        let mut rows = Vec::new();
        for (id, stored) in documents {
            if let Some(key) = self.definition.emit(&stored.content)? {
                rows.push((key, id.clone()));
            }
        }
        rows.sort();
        self.rows = rows;
        self.built_at = Some(revision);
        Ok(())
    }
}

pub(crate) struct SpatialIndex {
    pub(crate) definition: SpatialViewDefinition,
    pub(crate) rows: Vec<(f64, f64, String)>,
    pub(crate) built_at: Option<u64>,
}

impl SpatialIndex {
    pub(crate) fn new(definition: SpatialViewDefinition) -> Self {
        SpatialIndex {
            definition,
            rows: Vec::new(),
            built_at: None,
        }
    }

    pub(crate) fn rebuild(
        &mut self,
        documents: &BTreeMap<String, StoredDocument>,
        revision: u64,
    ) -> TypedStoreResult<()> {
        let mut rows = Vec::new();
        for (id, stored) in documents {
            if let Some((x, y)) = self.definition.emit(&stored.content)? {
                rows.push((x, y, id.clone()));
            }
        }
        self.rows = rows;
        self.built_at = Some(revision);
        Ok(())
    }
}

/// One stored revision of a document.
#[derive(Clone, Debug)]
pub(crate) struct StoredDocument {
    pub(crate) content: Document,
    pub(crate) cas: u64,
}
