use crate::descriptor::TypeDescriptor;
use crate::entity::DocumentEntity;
use crate::errors::{ErrorKind, TypedStoreError, TypedStoreResult};
use dashmap::DashMap;
use std::any::{type_name, TypeId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Resolves a requested result type into the [TypeDescriptor] used to materialize it.
///
/// Resolution reads the [DocumentEntity] metadata of `T::default()` and performs no I/O.
/// When caching is enabled, descriptors are kept in a concurrent map keyed by [TypeId] and
/// shared between calls; otherwise every call resolves afresh.
///
/// Cloning is cheap; clones share the same cache.
#[derive(Clone)]
pub struct TypeResolver {
    inner: Arc<TypeResolverInner>,
}

impl TypeResolver {
    /// Creates a resolver. `cache_enabled` turns descriptor caching on.
    pub fn new(cache_enabled: bool) -> Self {
        TypeResolver {
            inner: Arc::new(TypeResolverInner::new(cache_enabled)),
        }
    }

    /// Resolves the descriptor of `T`.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::InvalidEntityType] when `T` declares no identifier field, when
    /// the identifier field is not one of its persisted fields, or when the identifier is
    /// neither `String` nor `Option<String>`.
    pub fn resolve<T: DocumentEntity + 'static>(&self) -> TypedStoreResult<Arc<TypeDescriptor>> {
        self.inner.resolve::<T>()
    }

    pub fn is_cache_enabled(&self) -> bool {
        self.inner.cache.is_some()
    }

    /// Number of descriptors currently cached.
    pub fn cached_count(&self) -> usize {
        self.inner.cache.as_ref().map_or(0, |c| c.len())
    }

    /// Number of descriptors built from entity metadata, cache hits excluded.
    pub fn resolution_count(&self) -> usize {
        self.inner.resolutions.load(Ordering::Relaxed)
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = &self.inner.cache {
            cache.clear();
        }
    }
}

struct TypeResolverInner {
    cache: Option<DashMap<TypeId, Arc<TypeDescriptor>>>,
    resolutions: AtomicUsize,
}

impl TypeResolverInner {
    fn new(cache_enabled: bool) -> Self {
        TypeResolverInner {
            cache: if cache_enabled { Some(DashMap::new()) } else { None },
            resolutions: AtomicUsize::new(0),
        }
    }

    fn resolve<T: DocumentEntity + 'static>(&self) -> TypedStoreResult<Arc<TypeDescriptor>> {
        let type_id = TypeId::of::<T>();
        if let Some(cache) = &self.cache {
            if let Some(descriptor) = cache.get(&type_id) {
                return Ok(descriptor.value().clone());
            }
        }

        let descriptor = Arc::new(self.build::<T>()?);
        self.resolutions.fetch_add(1, Ordering::Relaxed);

        if let Some(cache) = &self.cache {
            log::debug!("Caching type descriptor for {}", descriptor.type_name());
            // a concurrent resolution may have won the race; keep the first one
            let entry = cache.entry(type_id).or_insert(descriptor);
            return Ok(entry.value().clone());
        }
        Ok(descriptor)
    }

    fn build<T: DocumentEntity + 'static>(&self) -> TypedStoreResult<TypeDescriptor> {
        let type_name = type_name::<T>();
        let entity = T::default();

        let id_field = match entity.entity_id() {
            Some(id) if !id.field_name().is_empty() => id.field_name().to_string(),
            _ => {
                log::error!("Type {} does not declare an id field", type_name);
                return Err(TypedStoreError::new(
                    &format!("Type {} does not declare an id field", type_name),
                    ErrorKind::InvalidEntityType,
                ));
            }
        };

        let fields = entity.entity_fields();
        if !fields.iter().any(|f| f == &id_field) {
            log::error!("Id field {} is not a field of type {}", id_field, type_name);
            return Err(TypedStoreError::new(
                &format!("Id field {} is not a field of type {}", id_field, type_name),
                ErrorKind::InvalidEntityType,
            ));
        }

        let id_type = TypeId::of::<T::Id>();
        if id_type != TypeId::of::<String>() && id_type != TypeId::of::<Option<String>>() {
            log::error!(
                "Id field {} of type {} must be a String, found {}",
                id_field,
                type_name,
                std::any::type_name::<T::Id>()
            );
            return Err(TypedStoreError::new(
                &format!(
                    "Id field {} of type {} must be a String, found {}",
                    id_field,
                    type_name,
                    std::any::type_name::<T::Id>()
                ),
                ErrorKind::InvalidEntityType,
            ));
        }

        let version_field = entity.entity_version();
        if let Some(version) = &version_field {
            if !fields.iter().any(|f| f == version) {
                log::error!("Version field {} is not a field of type {}", version, type_name);
                return Err(TypedStoreError::new(
                    &format!("Version field {} is not a field of type {}", version, type_name),
                    ErrorKind::InvalidEntityType,
                ));
            }
        }

        log::debug!("Resolved type descriptor for {} with id field {}", type_name, id_field);
        Ok(TypeDescriptor::new(
            TypeId::of::<T>(),
            type_name,
            entity.entity_name(),
            id_field,
            version_field,
            fields,
        ))
    }
}
