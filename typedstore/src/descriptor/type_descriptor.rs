use std::any::TypeId;

/// Materialization metadata for one entity type.
///
/// A descriptor is resolved once per logical call and shared through an `Arc` by every
/// record that call materializes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDescriptor {
    type_id: TypeId,
    type_name: &'static str,
    entity_name: String,
    id_field: String,
    version_field: Option<String>,
    fields: Vec<String>,
}

impl TypeDescriptor {
    pub(crate) fn new(
        type_id: TypeId,
        type_name: &'static str,
        entity_name: String,
        id_field: String,
        version_field: Option<String>,
        fields: Vec<String>,
    ) -> Self {
        TypeDescriptor {
            type_id,
            type_name,
            entity_name,
            id_field,
            version_field,
            fields,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The fully qualified Rust type name, as reported by `std::any::type_name`.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    pub fn version_field(&self) -> Option<&str> {
        self.version_field.as_deref()
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }
}
