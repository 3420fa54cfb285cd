//! Provider registry: a frozen map of names to provider instances.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use cachehub_core::lifecycle::ProviderState;
use cachehub_core::traits::{CacheProvider, ProviderKind};

/// Name resolved when no default is configured.
pub const DEFAULT_PROVIDER_NAME: &str = "default";

/// Summary of one registered provider.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderInfo {
    /// Registration name.
    pub name: String,
    /// Backend family.
    pub kind: ProviderKind,
    /// Lifecycle state.
    pub state: ProviderState,
}

/// Map of provider names to instances.
///
/// Built once by [`CacheBuilder`](crate::builder::CacheBuilder) and never
/// mutated afterwards. Names are case-sensitive.
#[derive(Debug)]
pub struct CacheRegistry {
    /// Name → provider instance.
    providers: HashMap<String, Arc<dyn CacheProvider>>,
    /// Name resolved when callers do not name a provider.
    default_name: String,
}

impl CacheRegistry {
    pub(crate) fn new() -> Self {
        Self {
            providers: HashMap::new(),
            default_name: DEFAULT_PROVIDER_NAME.to_string(),
        }
    }

    /// Register a provider under `name`, returning the one it replaced.
    pub(crate) fn insert(
        &mut self,
        name: String,
        provider: Arc<dyn CacheProvider>,
    ) -> Option<Arc<dyn CacheProvider>> {
        self.providers.insert(name, provider)
    }

    pub(crate) fn set_default_name(&mut self, name: String) {
        self.default_name = name;
    }

    /// Get a provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn CacheProvider>> {
        self.providers.get(name).cloned()
    }

    /// Whether a provider is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Name resolved when none is given.
    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether no provider is registered.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Summaries of every provider, sorted by name.
    pub fn infos(&self) -> Vec<ProviderInfo> {
        let mut infos: Vec<ProviderInfo> = self
            .providers
            .iter()
            .map(|(name, provider)| ProviderInfo {
                name: name.clone(),
                kind: provider.kind(),
                state: provider.state(),
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// Providers with their names, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn CacheProvider>)> {
        self.providers
            .iter()
            .map(|(name, provider)| (name.as_str(), provider))
    }

    /// Dispose every provider.
    ///
    /// Failures are logged and do not stop the remaining providers from
    /// being disposed. Returns how many providers failed.
    pub async fn dispose_all(&self) -> usize {
        let results = join_all(self.providers.iter().map(|(name, provider)| async move {
            (name, provider.dispose().await)
        }))
        .await;

        let mut failed = 0;
        for (name, result) in results {
            if let Err(e) = result {
                warn!(provider = %name, error = %e, "Failed to dispose cache provider");
                failed += 1;
            }
        }

        info!(
            disposed = self.providers.len() - failed,
            failed, "Cache providers disposed"
        );
        failed
    }
}
