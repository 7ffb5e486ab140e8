use crate::common::{Convertible, Value};
use crate::descriptor::TypeDescriptor;
use crate::document::{Document, RawRecord};
use crate::entity::TypedEntity;
use crate::errors::{ErrorKind, TypedStoreError, TypedStoreResult};

/// Converts one raw record into an entity of type `T`.
///
/// The identifier field is always set from the record's document identifier, and the
/// version field, when the type declares one, from the record's CAS token. Fields the
/// record does not carry keep the default the entity's conversion assigns them.
///
/// # Errors
///
/// Returns [ErrorKind::ObjectMappingError] when the content already holds a non-string
/// value in the identifier field, or when the content cannot be converted into `T`.
/// Nothing is returned for a record that fails part-way.
pub(crate) fn materialize<T: TypedEntity>(
    descriptor: &TypeDescriptor,
    record: RawRecord,
) -> TypedStoreResult<T> {
    let (id, cas, mut content) = record.into_parts();
    let id_field = descriptor.id_field();

    match content.get(id_field)? {
        Value::Null => {}
        Value::String(stored) => {
            if stored != id {
                log::warn!(
                    "Record {} carries id {} in field {}, using the record id",
                    id,
                    stored,
                    id_field
                );
            }
        }
        other => {
            log::error!(
                "Record {} holds a {} in id field {} of {}",
                id,
                other.type_name(),
                id_field,
                descriptor.type_name()
            );
            return Err(TypedStoreError::new(
                &format!(
                    "Record {} holds a {} in id field {} of {}",
                    id,
                    other.type_name(),
                    id_field,
                    descriptor.type_name()
                ),
                ErrorKind::ObjectMappingError,
            ));
        }
    }
    content.put(id_field, id.as_str())?;

    if let (Some(version_field), Some(cas)) = (descriptor.version_field(), cas) {
        content.put(version_field, cas)?;
    }

    T::from_value(&Value::Document(content)).map_err(|err| {
        log::error!(
            "Failed to materialize record {} as {}: {}",
            id,
            descriptor.type_name(),
            err
        );
        TypedStoreError::new_with_cause(
            &format!(
                "Failed to materialize record {} as {}",
                id,
                descriptor.type_name()
            ),
            ErrorKind::ObjectMappingError,
            err,
        )
    })
}

/// Converts every record, failing the whole batch on the first bad one.
pub(crate) fn materialize_all<T: TypedEntity>(
    descriptor: &TypeDescriptor,
    records: Vec<RawRecord>,
) -> TypedStoreResult<Vec<T>> {
    records
        .into_iter()
        .map(|record| materialize(descriptor, record))
        .collect()
}

/// Converts an entity into the identifier and content it is stored under.
///
/// The version field is not stored; the store assigns CAS tokens itself.
///
/// # Errors
///
/// Returns [ErrorKind::InvalidId] when the identifier field is null or empty, and
/// [ErrorKind::ObjectMappingError] when the entity does not convert into a document.
pub(crate) fn dematerialize<T: TypedEntity>(
    descriptor: &TypeDescriptor,
    entity: &T,
) -> TypedStoreResult<(String, Document)> {
    let mut content = match entity.to_value()? {
        Value::Document(doc) => doc,
        other => {
            log::error!(
                "Entity {} converted into a {} instead of a document",
                descriptor.type_name(),
                other.type_name()
            );
            return Err(TypedStoreError::new(
                &format!(
                    "Entity {} converted into a {} instead of a document",
                    descriptor.type_name(),
                    other.type_name()
                ),
                ErrorKind::ObjectMappingError,
            ));
        }
    };

    let id = match content.get(descriptor.id_field())? {
        Value::String(id) if !id.is_empty() => id,
        _ => {
            log::error!(
                "Entity {} has no id in field {}",
                descriptor.type_name(),
                descriptor.id_field()
            );
            return Err(TypedStoreError::new(
                &format!(
                    "Entity {} has no id in field {}",
                    descriptor.type_name(),
                    descriptor.id_field()
                ),
                ErrorKind::InvalidId,
            ));
        }
    };

    if let Some(version_field) = descriptor.version_field() {
        content.remove(version_field)?;
    }
    Ok((id, content))
}
