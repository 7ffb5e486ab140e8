//! Configuration management for a document template.

use crate::errors::{ErrorKind, TypedStoreError, TypedStoreResult};
use crate::query::ScanConsistency;
use crate::store::Store;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::runtime::Handle;

/// Settings shared by a [crate::template::DocumentTemplate] and every operations facade
/// it hands out.
///
/// Settings can be changed until the template is built; afterwards they are frozen and
/// setters fail with [ErrorKind::InvalidOperation].
///
/// # Examples
///
/// ```rust,ignore
/// use typedstore::template_config::TemplateConfig;
/// use typedstore::query::ScanConsistency;
///
/// let config = TemplateConfig::new();
/// config.set_default_consistency(ScanConsistency::NotBounded)?;
/// config.set_descriptor_cache_enabled(false)?;
/// ```
#[derive(Clone)]
pub struct TemplateConfig {
    /// The pointer to implementation. Uses Arc for cheap cloning and thread safety.
    inner: Arc<TemplateConfigInner>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateConfig {
    /// Creates a configuration with `RequestPlus` consistency, descriptor caching on and
    /// no store.
    pub fn new() -> Self {
        TemplateConfig {
            inner: Arc::new(TemplateConfigInner::new()),
        }
    }

    /// Gets the configured store client.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::ConfigurationError] if no store is configured.
    pub fn store(&self) -> TypedStoreResult<Store> {
        self.inner.store()
    }

    /// Sets the store client. A store can only be set once.
    pub fn set_store(&self, store: Store) -> TypedStoreResult<()> {
        self.inner.set_store(store)
    }

    /// Scan consistency applied to queries that do not specify one.
    pub fn default_consistency(&self) -> ScanConsistency {
        *self.inner.default_consistency.read()
    }

    pub fn set_default_consistency(&self, consistency: ScanConsistency) -> TypedStoreResult<()> {
        self.inner.check_not_configured("Default consistency")?;
        *self.inner.default_consistency.write() = consistency;
        Ok(())
    }

    pub fn is_descriptor_cache_enabled(&self) -> bool {
        self.inner.descriptor_cache.load(Ordering::Relaxed)
    }

    pub fn set_descriptor_cache_enabled(&self, enabled: bool) -> TypedStoreResult<()> {
        self.inner.check_not_configured("Descriptor cache")?;
        self.inner.descriptor_cache.store(enabled, Ordering::Relaxed);
        Ok(())
    }

    /// Sets the runtime deferred retrievals are spawned on.
    pub fn set_runtime(&self, handle: Handle) -> TypedStoreResult<()> {
        self.inner.check_not_configured("Runtime")?;
        *self.inner.runtime.write() = Some(handle);
        Ok(())
    }

    /// Returns the runtime for deferred retrievals.
    ///
    /// Falls back to the runtime the caller is running in when none was configured.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::ConfigurationError] when no runtime is configured and the
    /// caller is outside of any tokio runtime.
    pub fn runtime(&self) -> TypedStoreResult<Handle> {
        self.inner.runtime()
    }

    pub fn is_configured(&self) -> bool {
        self.inner.configured.load(Ordering::Relaxed)
    }

    /// Freezes the configuration. Fails if no store was set.
    pub(crate) fn initialize(&self) -> TypedStoreResult<()> {
        self.inner.store()?;
        self.inner.configured.store(true, Ordering::Relaxed);
        Ok(())
    }
}

struct TemplateConfigInner {
    configured: AtomicBool,
    store: OnceLock<Store>,
    default_consistency: RwLock<ScanConsistency>,
    descriptor_cache: AtomicBool,
    runtime: RwLock<Option<Handle>>,
}

impl TemplateConfigInner {
    fn new() -> Self {
        TemplateConfigInner {
            configured: AtomicBool::from(false),
            store: OnceLock::new(),
            default_consistency: RwLock::new(ScanConsistency::default()),
            descriptor_cache: AtomicBool::from(true),
            runtime: RwLock::new(None),
        }
    }

    fn check_not_configured(&self, setting: &str) -> TypedStoreResult<()> {
        if self.configured.load(Ordering::Relaxed) {
            log::error!("{} cannot be changed after initialization", setting);
            return Err(TypedStoreError::new(
                &format!("{} cannot be changed after initialization", setting),
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }

    fn store(&self) -> TypedStoreResult<Store> {
        match self.store.get() {
            Some(store) => Ok(store.clone()),
            None => {
                log::error!("No store is configured");
                Err(TypedStoreError::new(
                    "No store is configured",
                    ErrorKind::ConfigurationError,
                ))
            }
        }
    }

    fn set_store(&self, store: Store) -> TypedStoreResult<()> {
        self.check_not_configured("Store")?;
        if self.store.set(store).is_err() {
            log::error!("Store is already configured");
            return Err(TypedStoreError::new(
                "Store is already configured",
                ErrorKind::ConfigurationError,
            ));
        }
        Ok(())
    }

    fn runtime(&self) -> TypedStoreResult<Handle> {
        if let Some(handle) = self.runtime.read().as_ref() {
            return Ok(handle.clone());
        }

        Handle::try_current().map_err(|err| {
            log::error!("No runtime available for deferred retrieval: {}", err);
            TypedStoreError::new(
                &format!("No runtime available for deferred retrieval: {}", err),
                ErrorKind::ConfigurationError,
            )
        })
    }
}
