//! Cache manager that resolves providers by name.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use cachehub_core::error::{CacheError, ErrorKind};
use cachehub_core::guard;
use cachehub_core::result::CacheResult;
use cachehub_core::traits::CacheProvider;

use crate::registry::CacheRegistry;

/// Consumer-facing handle over a [`CacheRegistry`].
///
/// Cheap to clone. Resolution returns shared references to the registered
/// providers; the manager adds no caching of its own.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// The frozen registry.
    registry: Arc<CacheRegistry>,
}

impl CacheManager {
    /// Create a manager over a built registry.
    pub fn new(registry: CacheRegistry) -> Self {
        info!(
            providers = registry.len(),
            default = %registry.default_name(),
            "Cache manager initialized"
        );
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Create a cache manager from a single provider, which becomes the
    /// default (for testing).
    pub fn from_provider(provider: Arc<dyn CacheProvider>) -> Self {
        let name = provider.name().to_string();
        let mut registry = CacheRegistry::new();
        registry.insert(name.clone(), provider);
        registry.set_default_name(name);
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Resolve a provider by name, or the default when the name is absent or
    /// blank.
    pub fn resolve<'a>(
        &self,
        name: impl Into<Option<&'a str>>,
    ) -> CacheResult<Arc<dyn CacheProvider>> {
        let name = name.into();
        let name = if guard::is_null_or_blank(name) {
            self.registry.default_name()
        } else {
            name.unwrap_or_default()
        };

        self.registry.get(name).ok_or_else(|| {
            CacheError::not_found(format!("No cache provider registered under '{name}'"))
        })
    }

    /// Resolve the default provider.
    pub fn default_provider(&self) -> CacheResult<Arc<dyn CacheProvider>> {
        self.resolve(None::<&str>)
    }

    /// Registered provider names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Get a reference to the registry.
    pub fn registry(&self) -> &CacheRegistry {
        &self.registry
    }

    /// Health-check every provider, opening network connections eagerly.
    ///
    /// Returns the first failure in name order. A provider that answers but
    /// reports itself unhealthy is treated as unavailable.
    pub async fn warm_up(&self) -> CacheResult<()> {
        for name in self.registry.names() {
            let Some(provider) = self.registry.get(&name) else {
                continue;
            };
            match provider.health_check().await {
                Ok(true) => {}
                Ok(false) => {
                    return Err(CacheError::provider_unavailable(format!(
                        "Cache provider '{name}' reported unhealthy"
                    )));
                }
                Err(e) => return Err(e),
            }
        }

        info!(providers = self.registry.len(), "Cache providers warmed up");
        Ok(())
    }

    /// Check health of all registered providers.
    pub async fn health_check_all(&self) -> BTreeMap<String, bool> {
        let checks = self.registry.iter().map(|(name, provider)| async move {
            let healthy = match provider.health_check().await {
                Ok(healthy) => healthy,
                Err(e) => {
                    if !e.is(ErrorKind::InvalidOperation) {
                        warn!(provider = %name, error = %e, "Cache provider health check failed");
                    }
                    false
                }
            };
            (name.to_string(), healthy)
        });

        join_all(checks).await.into_iter().collect()
    }

    /// Dispose every provider. Returns how many failed to dispose.
    pub async fn shutdown(&self) -> usize {
        info!("Shutting down cache providers");
        self.registry.dispose_all().await
    }
}

impl From<CacheRegistry> for CacheManager {
    fn from(registry: CacheRegistry) -> Self {
        Self::new(registry)
    }
}
