//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use cachehub::config::options::{NCacheOptions, RedisOptions};
use cachehub::providers::{ClientError, NCacheConnector, NCacheHandle, NCacheItem};
use cachehub::{CacheEntry, CacheError, CacheProvider, CacheResult, ProviderKind, ProviderState};

/// In-process stand-in for an NCache cluster.
///
/// Honors absolute and sliding expiration the way the cluster does.
#[derive(Debug, Default)]
pub struct FakeNCache {
    /// Key → (item, last access).
    pub items: DashMap<String, (NCacheItem, DateTime<Utc>)>,
    /// Set once `dispose` has been called on the handle.
    pub disposed: AtomicBool,
}

impl FakeNCache {
    fn live(&self, key: &str) -> Option<NCacheItem> {
        let now = Utc::now();
        let mut slot = self.items.get_mut(key)?;
        let (item, touched) = slot.value_mut();
        if item.expiration.is_expired(*touched, now) {
            drop(slot);
            self.items.remove(key);
            return None;
        }
        *touched = now;
        Some(item.clone())
    }
}

#[async_trait]
impl NCacheHandle for FakeNCache {
    async fn insert(&self, key: &str, item: NCacheItem) -> Result<(), ClientError> {
        self.items.insert(key.to_string(), (item, Utc::now()));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>, ClientError> {
        Ok(self.live(key).map(|item| item.value))
    }

    async fn remove(&self, key: &str) -> Result<bool, ClientError> {
        let now = Utc::now();
        Ok(self
            .items
            .remove(key)
            .is_some_and(|(_, (item, touched))| !item.expiration.is_expired(touched, now)))
    }

    async fn contains(&self, key: &str) -> Result<bool, ClientError> {
        Ok(self.live(key).is_some())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        self.items.clear();
        Ok(())
    }

    async fn ping(&self) -> Result<(), ClientError> {
        Ok(())
    }

    async fn dispose(&self) -> Result<(), ClientError> {
        self.disposed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Connector that hands out one shared [`FakeNCache`].
#[derive(Debug, Default)]
pub struct FakeConnector {
    /// The cluster every handle points at.
    pub cluster: Arc<FakeNCache>,
    /// Number of `connect` calls.
    pub connects: AtomicUsize,
    /// Cache id of the last connect.
    pub last_cache_id: std::sync::Mutex<Option<String>>,
}

impl FakeConnector {
    /// Number of `connect` calls so far.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NCacheConnector for FakeConnector {
    async fn connect(&self, options: &NCacheOptions) -> Result<Arc<dyn NCacheHandle>, ClientError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_cache_id.lock() {
            *last = Some(options.cache_id.clone());
        }
        let handle: Arc<dyn NCacheHandle> = self.cluster.clone();
        Ok(handle)
    }
}

/// A custom provider whose `dispose` always fails.
#[derive(Debug)]
pub struct FailingDisposeProvider {
    /// Registration name.
    pub name: String,
    /// Set once `dispose` was attempted.
    pub dispose_attempted: AtomicBool,
}

impl FailingDisposeProvider {
    /// Create a provider registered as `name`.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            dispose_attempted: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl CacheProvider for FailingDisposeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Custom
    }

    fn state(&self) -> ProviderState {
        ProviderState::Ready
    }

    async fn set(&self, _entry: CacheEntry) -> CacheResult<()> {
        Ok(())
    }

    async fn get(&self, _key: &str) -> CacheResult<Option<Bytes>> {
        Ok(None)
    }

    async fn remove(&self, _key: &str) -> CacheResult<bool> {
        Ok(false)
    }

    async fn contains(&self, _key: &str) -> CacheResult<bool> {
        Ok(false)
    }

    async fn clear(&self) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Ok(true)
    }

    async fn dispose(&self) -> CacheResult<()> {
        self.dispose_attempted.store(true, Ordering::SeqCst);
        Err(CacheError::provider_unavailable("backend refused to release"))
    }
}

/// Redis options pointing at a port nothing listens on, with short timeouts.
pub fn unreachable_redis(connection_string: &str) -> RedisOptions {
    RedisOptions {
        connect_timeout_ms: 300,
        operation_timeout_ms: 300,
        ..RedisOptions::new(connection_string)
    }
}

/// Write a TOML settings file and return it. The file lives until dropped.
pub fn settings_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("Failed to create settings file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write settings file");
    file
}
