//! Hand-written entities shared by the unit tests of this crate.

use crate::common::{Convertible, Value};
use crate::doc;
use crate::entity::{DocumentEntity, EntityId};
use crate::errors::{ErrorKind, TypedStoreError, TypedStoreResult};

fn field_or_default<T>(value: &Value, name: &str) -> TypedStoreResult<T>
where
    T: Convertible<Output = T> + Default,
{
    let doc = value.as_document().ok_or_else(|| {
        TypedStoreError::new("Value is not a document", ErrorKind::ObjectMappingError)
    })?;
    match doc.get(name)? {
        Value::Null => Ok(T::default()),
        field => T::from_value(&field),
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct Person {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) age: u32,
}

impl Convertible for Person {
    type Output = Person;

    fn to_value(&self) -> TypedStoreResult<Value> {
        Ok(Value::Document(doc! {
            id: (self.id.clone()),
            name: (self.name.clone()),
            age: (self.age),
        }))
    }

    fn from_value(value: &Value) -> TypedStoreResult<Self::Output> {
        Ok(Person {
            id: field_or_default(value, "id")?,
            name: field_or_default(value, "name")?,
            age: field_or_default(value, "age")?,
        })
    }
}

impl DocumentEntity for Person {
    type Id = String;

    fn entity_name(&self) -> String {
        "person".to_string()
    }

    fn entity_id(&self) -> Option<EntityId> {
        Some(EntityId::new("id"))
    }

    fn entity_version(&self) -> Option<String> {
        None
    }

    fn entity_fields(&self) -> Vec<String> {
        vec!["id".to_string(), "name".to_string(), "age".to_string()]
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct Versioned {
    pub(crate) key: Option<String>,
    pub(crate) label: String,
    pub(crate) revision: u64,
}

impl Convertible for Versioned {
    type Output = Versioned;

    fn to_value(&self) -> TypedStoreResult<Value> {
        Ok(Value::Document(doc! {
            key: (Value::from_option(self.key.clone())),
            label: (self.label.clone()),
            revision: (self.revision),
        }))
    }

    fn from_value(value: &Value) -> TypedStoreResult<Self::Output> {
        Ok(Versioned {
            key: field_or_default(value, "key")?,
            label: field_or_default(value, "label")?,
            revision: field_or_default(value, "revision")?,
        })
    }
}

impl DocumentEntity for Versioned {
    type Id = Option<String>;

    fn entity_name(&self) -> String {
        "versioned".to_string()
    }

    fn entity_id(&self) -> Option<EntityId> {
        Some(EntityId::new("key"))
    }

    fn entity_version(&self) -> Option<String> {
        Some("revision".to_string())
    }

    fn entity_fields(&self) -> Vec<String> {
        vec!["key".to_string(), "label".to_string(), "revision".to_string()]
    }
}

/// An entity without an identifier field.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct Anonymous {
    pub(crate) name: String,
}

impl Convertible for Anonymous {
    type Output = Anonymous;

    fn to_value(&self) -> TypedStoreResult<Value> {
        Ok(Value::Document(doc! { name: (self.name.clone()) }))
    }

    fn from_value(value: &Value) -> TypedStoreResult<Self::Output> {
        Ok(Anonymous {
            name: field_or_default(value, "name")?,
        })
    }
}

impl DocumentEntity for Anonymous {
    type Id = ();

    fn entity_name(&self) -> String {
        "anonymous".to_string()
    }

    fn entity_id(&self) -> Option<EntityId> {
        None
    }

    fn entity_version(&self) -> Option<String> {
        None
    }

    fn entity_fields(&self) -> Vec<String> {
        vec!["name".to_string()]
    }
}
