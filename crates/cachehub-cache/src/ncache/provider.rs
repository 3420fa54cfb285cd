//! NCache cache provider implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use validator::Validate;

use cachehub_core::config::options::NCacheOptions;
use cachehub_core::entry::CacheEntry;
use cachehub_core::error::{CacheError, ErrorKind};
use cachehub_core::guard;
use cachehub_core::lifecycle::{Lifecycle, ProviderState};
use cachehub_core::result::CacheResult;
use cachehub_core::traits::{CacheProvider, ProviderKind};

use super::client::{ClientError, NCacheConnector, NCacheHandle, NCacheItem};
use crate::deadline;

/// NCache-backed cache provider.
///
/// Expiration, priority and tags are forwarded to the cluster unchanged.
/// The handle is opened on first use.
#[derive(Debug)]
pub struct NCacheProvider {
    /// Registration name.
    name: String,
    /// Options the handle is opened with.
    options: NCacheOptions,
    /// Client binding.
    connector: Arc<dyn NCacheConnector>,
    /// Open handle, once the first operation has run.
    handle: Mutex<Option<Arc<dyn NCacheHandle>>>,
    /// Upper bound on a single request.
    request_timeout: Duration,
    /// Lifecycle state.
    lifecycle: Lifecycle,
}

impl NCacheProvider {
    /// Create a provider. The name defaults to the cache id.
    pub fn new(
        name: Option<&str>,
        options: NCacheOptions,
        connector: Arc<dyn NCacheConnector>,
    ) -> CacheResult<Self> {
        options.validate()?;
        let name = guard::name_or(name, &options.cache_id);

        let lifecycle = Lifecycle::new();
        lifecycle.mark_ready();

        info!(
            provider = %name,
            cache_id = %options.cache_id,
            servers = options.servers.len(),
            "NCache cache registered"
        );
        Ok(Self {
            name,
            request_timeout: Duration::from_millis(options.request_timeout_ms),
            options,
            connector,
            handle: Mutex::new(None),
            lifecycle,
        })
    }

    /// The options this provider was created with.
    pub fn options(&self) -> &NCacheOptions {
        &self.options
    }

    /// Get the handle, opening it on first use.
    async fn handle(&self) -> CacheResult<Arc<dyn NCacheHandle>> {
        let mut slot = self.handle.lock().await;
        if let Some(handle) = slot.as_ref() {
            return Ok(Arc::clone(handle));
        }

        info!(provider = %self.name, cache_id = %self.options.cache_id, "Connecting to NCache");
        let handle = deadline::bounded(&self.name, "connect", self.request_timeout, async {
            self.connector
                .connect(&self.options)
                .await
                .map_err(|e| self.map_err("connect", e))
        })
        .await?;

        *slot = Some(Arc::clone(&handle));
        Ok(handle)
    }

    /// Validate state and key, then get the handle.
    async fn ready(&self, key: Option<&str>) -> CacheResult<Arc<dyn NCacheHandle>> {
        self.lifecycle.ensure_ready(&self.name)?;
        if let Some(key) = key {
            guard::ensure_not_blank(Some(key), "key")?;
        }
        self.handle().await
    }

    fn map_err(&self, operation: &str, e: ClientError) -> CacheError {
        CacheError {
            kind: ErrorKind::ProviderUnavailable,
            message: format!("Cache provider '{}' failed during {operation}: {e}", self.name),
            source: Some(e),
        }
    }
}

#[async_trait]
impl CacheProvider for NCacheProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::NCache
    }

    fn state(&self) -> ProviderState {
        self.lifecycle.state()
    }

    async fn set(&self, entry: CacheEntry) -> CacheResult<()> {
        let handle = self.ready(Some(entry.key())).await?;
        let expiration = entry.expiration().or_default_ttl(self.options.default_ttl());
        let priority = entry.priority();
        let tags = entry.tags().to_vec();
        let (key, value) = entry.into_parts();
        let item = NCacheItem {
            value,
            expiration,
            priority,
            tags,
        };

        deadline::bounded(&self.name, "set", self.request_timeout, async {
            handle
                .insert(&key, item)
                .await
                .map_err(|e| self.map_err("set", e))
        })
        .await
    }

    async fn get(&self, key: &str) -> CacheResult<Option<Bytes>> {
        let handle = self.ready(Some(key)).await?;
        deadline::bounded(&self.name, "get", self.request_timeout, async {
            handle.get(key).await.map_err(|e| self.map_err("get", e))
        })
        .await
    }

    async fn remove(&self, key: &str) -> CacheResult<bool> {
        let handle = self.ready(Some(key)).await?;
        deadline::bounded(&self.name, "remove", self.request_timeout, async {
            handle.remove(key).await.map_err(|e| self.map_err("remove", e))
        })
        .await
    }

    async fn contains(&self, key: &str) -> CacheResult<bool> {
        let handle = self.ready(Some(key)).await?;
        deadline::bounded(&self.name, "contains", self.request_timeout, async {
            handle
                .contains(key)
                .await
                .map_err(|e| self.map_err("contains", e))
        })
        .await
    }

    async fn clear(&self) -> CacheResult<()> {
        let handle = self.ready(None).await?;
        deadline::bounded(&self.name, "clear", self.request_timeout, async {
            handle.clear().await.map_err(|e| self.map_err("clear", e))
        })
        .await?;
        debug!(provider = %self.name, "NCache cache cleared");
        Ok(())
    }

    async fn health_check(&self) -> CacheResult<bool> {
        let handle = self.ready(None).await?;
        deadline::bounded(&self.name, "health_check", self.request_timeout, async {
            handle
                .ping()
                .await
                .map_err(|e| self.map_err("health_check", e))
        })
        .await?;
        Ok(true)
    }

    async fn dispose(&self) -> CacheResult<()> {
        if !self.lifecycle.dispose() {
            return Ok(());
        }

        let Some(handle) = self.handle.lock().await.take() else {
            debug!(provider = %self.name, "NCache cache disposed before connecting");
            return Ok(());
        };

        match handle.dispose().await {
            Ok(()) => {
                debug!(provider = %self.name, "NCache cache disposed");
                Ok(())
            }
            Err(e) => {
                warn!(provider = %self.name, error = %e, "NCache handle failed to dispose");
                Err(self.map_err("dispose", e))
            }
        }
    }
}
