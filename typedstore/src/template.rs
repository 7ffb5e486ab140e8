use crate::descriptor::TypeResolver;
use crate::document::RawRecord;
use crate::entity::TypedEntity;
use crate::errors::{ErrorKind, TypedStoreError, TypedStoreResult};
use crate::materializer::{dematerialize, materialize};
use crate::mode::{Blocking, Deferred, Streaming};
use crate::operations::Operations;
use crate::store::{Store, StoreOperationsProvider};
use crate::template_builder::TemplateBuilder;
use crate::template_config::TemplateConfig;
use std::sync::Arc;

/// Entry point for typed access to a document store.
///
/// A template owns the store client, the type resolver and the configuration, and hands
/// out [Operations] facades bound to an execution mode:
///
/// * [blocking](DocumentTemplate::blocking): results are returned on the caller's thread.
/// * [future](DocumentTemplate::future): results arrive through an
///   [EntityFuture](crate::mode::EntityFuture).
/// * [stream](DocumentTemplate::stream): results arrive through an
///   [EntityStream](crate::mode::EntityStream).
///
/// All facades share the template's descriptor cache, so a type resolved in one mode is
/// not resolved again in another.
///
/// Cloning is cheap; clones share the same store and resolver.
///
/// # Examples
///
/// ```rust,ignore
/// use typedstore::store::memory::InMemoryStore;
/// use typedstore::template::DocumentTemplate;
///
/// let template = DocumentTemplate::builder()
///     .store(InMemoryStore::new())
///     .build()?;
///
/// template.save(&Person { id: "doc-1".into(), name: "Ada".into(), ..Default::default() })?;
///
/// let person = template.blocking().find_by_id::<Person>("doc-1")?;
/// let person = template.future()?.find_by_id::<Person>("doc-1").await?;
/// let mut people = template.stream().find_by_query::<Person>(&query);
/// while let Some(person) = people.next().await {
///     println!("{:?}", person?);
/// }
/// ```
#[derive(Clone)]
pub struct DocumentTemplate {
    inner: Arc<DocumentTemplateInner>,
}

impl DocumentTemplate {
    pub fn builder() -> TemplateBuilder {
        TemplateBuilder::new()
    }

    /// Creates a template over `store` with the default configuration.
    pub fn new<S: StoreOperationsProvider + 'static>(store: S) -> TypedStoreResult<Self> {
        TemplateBuilder::new().store(store).build()
    }

    pub(crate) fn with_config(config: TemplateConfig) -> TypedStoreResult<Self> {
        config.initialize()?;
        let store = config.store()?;
        let resolver = TypeResolver::new(config.is_descriptor_cache_enabled());
        log::debug!(
            "Document template created, default consistency {}, descriptor cache {}",
            config.default_consistency(),
            if resolver.is_cache_enabled() { "on" } else { "off" }
        );

        Ok(DocumentTemplate {
            inner: Arc::new(DocumentTemplateInner {
                config,
                store,
                resolver,
            }),
        })
    }

    /// Operations that run on the caller's thread.
    pub fn blocking(&self) -> Operations<Blocking> {
        self.operations(Blocking)
    }

    /// Operations that issue their fetch immediately and resolve later.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::ConfigurationError] when no runtime was configured and the
    /// caller is outside of any tokio runtime.
    pub fn future(&self) -> TypedStoreResult<Operations<Deferred>> {
        let handle = self.inner.config.runtime()?;
        Ok(self.operations(Deferred::new(handle)))
    }

    /// Operations that stream their results.
    pub fn stream(&self) -> Operations<Streaming> {
        self.operations(Streaming)
    }

    /// Shorthand for `blocking().find_by_id::<T>(id)`.
    pub fn find_by_id<T: TypedEntity>(&self, id: &str) -> TypedStoreResult<T> {
        self.blocking().find_by_id::<T>(id)
    }

    /// Stores `entity` under the id held in its identifier field, replacing any document
    /// already stored there.
    ///
    /// Returns the stored entity with its version field, if it has one, set to the new
    /// CAS token. The version value of `entity` itself is not sent to the store.
    ///
    /// # Errors
    ///
    /// * [ErrorKind::InvalidEntityType] when `T` has no usable identifier field.
    /// * [ErrorKind::InvalidId] when the identifier field is empty.
    /// * Any error reported by the store.
    pub fn save<T: TypedEntity>(&self, entity: &T) -> TypedStoreResult<T> {
        let descriptor = self.inner.resolver.resolve::<T>()?;
        let (id, content) = dematerialize(&descriptor, entity)?;
        let cas = self.inner.store.upsert(&id, content.clone())?;
        log::debug!("Saved {} {} with cas {}", descriptor.type_name(), id, cas);
        materialize(&descriptor, RawRecord::with_cas(id, cas, content))
    }

    /// Removes the document stored under `id`. Returns whether a document was removed.
    pub fn remove_by_id(&self, id: &str) -> TypedStoreResult<bool> {
        check_id(id)?;
        self.inner.store.remove(id)
    }

    pub fn exists(&self, id: &str) -> TypedStoreResult<bool> {
        check_id(id)?;
        self.inner.store.exists(id)
    }

    pub fn store(&self) -> Store {
        self.inner.store.clone()
    }

    pub fn resolver(&self) -> &TypeResolver {
        &self.inner.resolver
    }

    pub fn config(&self) -> &TemplateConfig {
        &self.inner.config
    }

    fn operations<M: crate::mode::ExecutionMode>(&self, mode: M) -> Operations<M> {
        Operations::new(
            self.inner.store.clone(),
            self.inner.resolver.clone(),
            self.inner.config.default_consistency(),
            mode,
        )
    }
}

struct DocumentTemplateInner {
    config: TemplateConfig,
    store: Store,
    resolver: TypeResolver,
}

fn check_id(id: &str) -> TypedStoreResult<()> {
    if id.is_empty() {
        log::error!("Document id cannot be empty");
        return Err(TypedStoreError::new(
            "Document id cannot be empty",
            ErrorKind::InvalidId,
        ));
    }
    Ok(())
}
