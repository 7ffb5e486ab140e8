use crate::errors::{TypedStoreError, TypedStoreResult};
use crate::query::ScanConsistency;
use crate::store::{Store, StoreOperationsProvider};
use crate::template::DocumentTemplate;
use crate::template_config::TemplateConfig;
use tokio::runtime::Handle;

/// Builder for creating and configuring a [DocumentTemplate].
///
/// Configuration errors are captured as they occur and returned by
/// [build](TemplateBuilder::build); the first error wins.
///
/// # Examples
///
/// ```rust,ignore
/// use typedstore::store::memory::InMemoryStore;
/// use typedstore::query::ScanConsistency;
/// use typedstore::template::DocumentTemplate;
///
/// let template = DocumentTemplate::builder()
///     .store(InMemoryStore::new())
///     .default_consistency(ScanConsistency::NotBounded)
///     .build()?;
/// ```
#[derive(Default)]
pub struct TemplateBuilder {
    error: Option<TypedStoreError>,
    config: TemplateConfig,
}

impl TemplateBuilder {
    pub fn new() -> Self {
        TemplateBuilder {
            error: None,
            config: TemplateConfig::new(),
        }
    }

    /// Sets the store client the template reads from and writes to.
    pub fn store<S: StoreOperationsProvider + 'static>(self, store: S) -> Self {
        self.shared_store(Store::new(store))
    }

    /// Sets a store client that is already shared with other users.
    pub fn shared_store(mut self, store: Store) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_store(store) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Scan consistency for queries that do not specify one. Defaults to `RequestPlus`.
    pub fn default_consistency(mut self, consistency: ScanConsistency) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_default_consistency(consistency) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Turns descriptor caching on or off. Caching is on by default.
    pub fn descriptor_cache(mut self, enabled: bool) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_descriptor_cache_enabled(enabled) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Runtime deferred retrievals are spawned on. Without one, the runtime the caller
    /// is running in is used.
    pub fn runtime(mut self, handle: Handle) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_runtime(handle) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Builds the template.
    ///
    /// # Errors
    ///
    /// Returns the first error captured while configuring, or
    /// [ConfigurationError](crate::errors::ErrorKind::ConfigurationError) when no store
    /// was set.
    pub fn build(self) -> TypedStoreResult<DocumentTemplate> {
        if let Some(error) = self.error {
            return Err(error);
        }
        DocumentTemplate::with_config(self.config)
    }
}
