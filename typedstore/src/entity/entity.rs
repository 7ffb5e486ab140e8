use crate::common::Convertible;

/// Describes the persisted shape of an entity type.
///
/// # Purpose
/// Supplies the metadata the type resolver needs to turn a requested result type into a
/// [TypeDescriptor](crate::descriptor::TypeDescriptor): the entity name, the identifier
/// field, the optional version field and the persisted field names. Callers never pass
/// this metadata by hand; it is read from `T::default()` when an operation is invoked.
///
/// # Characteristics
/// - Must implement Default so the resolver can obtain an instance to query
/// - Associated type `Id` is the declared type of the identifier field; only `String`
///   and `Option<String>` identifiers are accepted by the resolver
/// - Typically implemented via `#[derive(DocumentEntity)]`
///
/// # Usage
/// ```ignore
/// #[derive(Default, Convertible, DocumentEntity)]
/// #[entity(name = "person", id(field = "id"), version(field = "revision"))]
/// pub struct Person {
///     id: String,
///     name: String,
///     revision: u64,
/// }
/// ```
pub trait DocumentEntity: Default {
    /// Declared type of the identifier field, `()` when the type declares none.
    type Id: Convertible + Send + Sync + 'static;

    /// Returns the entity name. Defaults to the struct name when not customized via
    /// `#[entity(name = "...")]`.
    fn entity_name(&self) -> String;

    /// Returns the identifier field configuration, if any.
    fn entity_id(&self) -> Option<EntityId>;

    /// Returns the name of the field that receives the record's CAS token, if any.
    fn entity_version(&self) -> Option<String>;

    /// Returns the names of every persisted field.
    fn entity_fields(&self) -> Vec<String>;
}

/// An entity type the access layer can materialize: it describes its shape and converts
/// from a document value into itself.
pub trait TypedEntity: DocumentEntity + Convertible<Output = Self> + Send + 'static {}

impl<T> TypedEntity for T where T: DocumentEntity + Convertible<Output = T> + Send + 'static {}

/// Identifier field configuration of an entity.
///
/// The identifier field receives the record's document identifier during
/// materialization, so its value always equals the key the document was fetched with.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct EntityId {
    field_name: String,
}

impl EntityId {
    pub fn new(field_name: &str) -> Self {
        EntityId {
            field_name: field_name.to_string(),
        }
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }
}
