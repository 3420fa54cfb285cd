//! Enterprise Library style cache manager: an in-process table with
//! expiration polling and priority-based scavenging.

use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use validator::Validate;

use cachehub_core::config::options::EnterpriseLibraryOptions;
use cachehub_core::entry::{CacheEntry, CachePriority, Expiration};
use cachehub_core::guard;
use cachehub_core::lifecycle::{Lifecycle, ProviderState};
use cachehub_core::result::CacheResult;
use cachehub_core::traits::{CacheProvider, ProviderKind};

#[derive(Debug, Clone)]
struct StoredItem {
    value: Bytes,
    expiration: Expiration,
    priority: CachePriority,
    last_accessed: DateTime<Utc>,
}

impl StoredItem {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration.is_expired(self.last_accessed, now)
    }
}

type ItemTable = DashMap<String, StoredItem>;

/// Cache manager bound to one configuration section.
///
/// Expired items are never returned. They are dropped when touched and by a
/// background sweep every `expiration_poll_seconds`. Once the table holds
/// more than `max_elements_before_scavenging` items, a scavenging pass
/// removes `elements_to_remove_when_scavenging` of them, lowest priority
/// first and least recently accessed within a priority. `NotRemovable`
/// items and the item whose insertion triggered the pass are never
/// scavenged.
#[derive(Debug)]
pub struct EnterpriseLibraryCacheProvider {
    /// Registration name.
    name: String,
    /// Section options.
    options: EnterpriseLibraryOptions,
    /// Backing table, shared weakly with the sweep task.
    items: Arc<ItemTable>,
    /// Background expiration sweep, when a runtime was available.
    poller: Option<JoinHandle<()>>,
    /// Lifecycle state.
    lifecycle: Lifecycle,
}

impl EnterpriseLibraryCacheProvider {
    /// Create a cache manager. The name defaults to the section name.
    ///
    /// The expiration sweep is only started when called inside a tokio
    /// runtime; expiration is still enforced on access without it.
    pub fn new(name: Option<&str>, options: EnterpriseLibraryOptions) -> CacheResult<Self> {
        options.validate()?;
        let name = guard::name_or(name, &options.section_name);
        let items = Arc::new(ItemTable::new());

        let poller = tokio::runtime::Handle::try_current().ok().map(|runtime| {
            runtime.spawn(poll_expirations(
                Arc::downgrade(&items),
                options.poll_interval(),
                name.clone(),
            ))
        });

        let lifecycle = Lifecycle::new();
        lifecycle.mark_ready();

        info!(
            provider = %name,
            section = %options.section_name,
            max_elements = options.max_elements_before_scavenging,
            polling = poller.is_some(),
            "Enterprise Library cache registered"
        );
        Ok(Self {
            name,
            options,
            items,
            poller,
            lifecycle,
        })
    }

    /// The section options this cache manager was created with.
    pub fn options(&self) -> &EnterpriseLibraryOptions {
        &self.options
    }

    /// Number of items held, including expired ones not yet swept.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Run a scavenging pass if the table is over its limit. `inserted` is
    /// kept.
    fn scavenge(&self, inserted: &str) {
        if self.items.len() <= self.options.max_elements_before_scavenging {
            return;
        }

        let expired = purge_expired(&self.items, Utc::now());
        if self.items.len() <= self.options.max_elements_before_scavenging {
            debug!(provider = %self.name, expired, "Scavenging satisfied by expired items");
            return;
        }

        let mut candidates: Vec<(CachePriority, DateTime<Utc>, String)> = self
            .items
            .iter()
            .filter(|item| item.priority != CachePriority::NotRemovable && item.key() != inserted)
            .map(|item| (item.priority, item.last_accessed, item.key().clone()))
            .collect();
        candidates.sort();

        let scavenged = candidates
            .into_iter()
            .take(self.options.elements_to_remove_when_scavenging)
            .filter(|(_, _, key)| self.items.remove(key).is_some())
            .count();

        debug!(
            provider = %self.name,
            expired,
            scavenged,
            remaining = self.items.len(),
            "Scavenging pass completed"
        );
    }
}

impl Drop for EnterpriseLibraryCacheProvider {
    fn drop(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
    }
}

/// Remove every expired item. Returns how many were removed.
fn purge_expired(items: &ItemTable, now: DateTime<Utc>) -> usize {
    let before = items.len();
    items.retain(|_, item| !item.is_expired(now));
    before.saturating_sub(items.len())
}

async fn poll_expirations(table: Weak<ItemTable>, period: Duration, provider: String) {
    let mut interval = tokio::time::interval(period);
    // The first tick completes immediately.
    interval.tick().await;

    loop {
        interval.tick().await;

        let Some(items) = table.upgrade() else {
            break;
        };
        let removed = purge_expired(&items, Utc::now());
        if removed > 0 {
            debug!(provider = %provider, removed, "Expired items swept");
        }
    }

    debug!(provider = %provider, "Expiration sweep stopped");
}

#[async_trait]
impl CacheProvider for EnterpriseLibraryCacheProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::EnterpriseLibrary
    }

    fn state(&self) -> ProviderState {
        self.lifecycle.state()
    }

    async fn set(&self, entry: CacheEntry) -> CacheResult<()> {
        self.lifecycle.ensure_ready(&self.name)?;
        let expiration = entry.expiration().or_default_ttl(self.options.default_ttl());
        let priority = entry.priority();
        let (key, value) = entry.into_parts();

        self.items.insert(
            key.clone(),
            StoredItem {
                value,
                expiration,
                priority,
                last_accessed: Utc::now(),
            },
        );
        self.scavenge(&key);
        Ok(())
    }

    async fn get(&self, key: &str) -> CacheResult<Option<Bytes>> {
        self.lifecycle.ensure_ready(&self.name)?;
        let key = guard::ensure_not_blank(Some(key), "key")?;
        let now = Utc::now();

        match self.items.get_mut(key) {
            None => return Ok(None),
            Some(mut item) if !item.is_expired(now) => {
                item.last_accessed = now;
                return Ok(Some(item.value.clone()));
            }
            Some(_) => {}
        }

        self.items.remove_if(key, |_, item| item.is_expired(now));
        Ok(None)
    }

    async fn remove(&self, key: &str) -> CacheResult<bool> {
        self.lifecycle.ensure_ready(&self.name)?;
        let key = guard::ensure_not_blank(Some(key), "key")?;
        let now = Utc::now();
        Ok(self
            .items
            .remove(key)
            .is_some_and(|(_, item)| !item.is_expired(now)))
    }

    async fn contains(&self, key: &str) -> CacheResult<bool> {
        self.lifecycle.ensure_ready(&self.name)?;
        let key = guard::ensure_not_blank(Some(key), "key")?;
        let now = Utc::now();
        Ok(self.items.get(key).is_some_and(|item| !item.is_expired(now)))
    }

    async fn clear(&self) -> CacheResult<()> {
        self.lifecycle.ensure_ready(&self.name)?;
        self.items.clear();
        debug!(provider = %self.name, "Enterprise Library cache flushed");
        Ok(())
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Ok(self.lifecycle.state() == ProviderState::Ready)
    }

    async fn dispose(&self) -> CacheResult<()> {
        if self.lifecycle.dispose() {
            if let Some(poller) = &self.poller {
                poller.abort();
            }
            self.items.clear();
            debug!(provider = %self.name, "Enterprise Library cache disposed");
        }
        Ok(())
    }
}
