//! In-memory cache implementation using the moka crate.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use moka::Expiry;
use moka::future::Cache;
use tracing::debug;
use validator::Validate;

use cachehub_core::config::options::MemoryOptions;
use cachehub_core::entry::{CacheEntry, Expiration};
use cachehub_core::guard;
use cachehub_core::lifecycle::{Lifecycle, ProviderState};
use cachehub_core::result::CacheResult;
use cachehub_core::traits::{CacheProvider, ProviderKind};

/// Payload plus the policy that governs its lifetime.
#[derive(Debug, Clone)]
struct StoredValue {
    payload: Bytes,
    expiration: Expiration,
}

/// Per-entry expiry for moka.
///
/// Absolute deadlines are converted to a remaining TTL at insert time.
/// Sliding windows restart on every read.
#[derive(Debug, Clone)]
struct EntryExpiry {
    default_ttl: Option<Duration>,
}

impl EntryExpiry {
    fn ttl_for(&self, value: &StoredValue) -> Option<Duration> {
        value
            .expiration
            .time_to_live(Utc::now())
            .or(self.default_ttl)
    }
}

impl Expiry<String, StoredValue> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        self.ttl_for(value)
    }

    fn expire_after_read(
        &self,
        _key: &String,
        value: &StoredValue,
        _read_at: Instant,
        duration_until_expiry: Option<Duration>,
        _last_modified_at: Instant,
    ) -> Option<Duration> {
        match value.expiration {
            Expiration::Sliding(window) => Some(window),
            _ => duration_until_expiry,
        }
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        self.ttl_for(value)
    }
}

/// In-memory cache provider using moka.
///
/// Honors absolute and sliding expiration per entry. Priority and tags are
/// accepted and ignored; eviction under capacity pressure follows moka's
/// TinyLFU policy.
#[derive(Debug)]
pub struct MemoryCacheProvider {
    /// Registration name.
    name: String,
    /// The underlying moka cache.
    cache: Cache<String, StoredValue>,
    /// Lifecycle state.
    lifecycle: Lifecycle,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from options.
    pub fn new(name: &str, options: &MemoryOptions) -> CacheResult<Self> {
        let name = guard::ensure_not_blank(Some(name), "name")?;
        options.validate()?;

        let lifecycle = Lifecycle::new();
        let cache = Cache::builder()
            .name(name)
            .max_capacity(options.max_capacity)
            .expire_after(EntryExpiry {
                default_ttl: options.default_ttl(),
            })
            .build();
        lifecycle.mark_ready();

        debug!(provider = name, capacity = options.max_capacity, "Memory cache ready");
        Ok(Self {
            name: name.to_string(),
            cache,
            lifecycle,
        })
    }

    /// Approximate number of live entries.
    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Memory
    }

    fn state(&self) -> ProviderState {
        self.lifecycle.state()
    }

    async fn set(&self, entry: CacheEntry) -> CacheResult<()> {
        self.lifecycle.ensure_ready(&self.name)?;
        let expiration = entry.expiration();
        let (key, payload) = entry.into_parts();
        self.cache
            .insert(
                key,
                StoredValue {
                    payload,
                    expiration,
                },
            )
            .await;
        Ok(())
    }

    async fn get(&self, key: &str) -> CacheResult<Option<Bytes>> {
        self.lifecycle.ensure_ready(&self.name)?;
        let key = guard::ensure_not_blank(Some(key), "key")?;
        Ok(self.cache.get(key).await.map(|value| value.payload))
    }

    async fn remove(&self, key: &str) -> CacheResult<bool> {
        self.lifecycle.ensure_ready(&self.name)?;
        let key = guard::ensure_not_blank(Some(key), "key")?;
        // moka hands back expired values on remove; only a live one counts.
        let live = self.cache.contains_key(key);
        let removed = self.cache.remove(key).await;
        Ok(live && removed.is_some())
    }

    async fn contains(&self, key: &str) -> CacheResult<bool> {
        self.lifecycle.ensure_ready(&self.name)?;
        let key = guard::ensure_not_blank(Some(key), "key")?;
        Ok(self.cache.contains_key(key))
    }

    async fn clear(&self) -> CacheResult<()> {
        self.lifecycle.ensure_ready(&self.name)?;
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        debug!(provider = %self.name, "Memory cache cleared");
        Ok(())
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Ok(self.lifecycle.state() == ProviderState::Ready)
    }

    async fn dispose(&self) -> CacheResult<()> {
        if self.lifecycle.dispose() {
            self.cache.invalidate_all();
            self.cache.run_pending_tasks().await;
            debug!(provider = %self.name, "Memory cache disposed");
        }
        Ok(())
    }
}
