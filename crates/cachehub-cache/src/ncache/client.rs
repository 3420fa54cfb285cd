//! Client contract for NCache bindings.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use cachehub_core::config::options::NCacheOptions;
use cachehub_core::entry::{CachePriority, Expiration};

/// Error type reported by client bindings.
pub type ClientError = Box<dyn std::error::Error + Send + Sync>;

/// An item as handed to the NCache client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NCacheItem {
    /// Serialized payload.
    pub value: Bytes,
    /// Absolute or sliding expiration, enforced by the cluster.
    pub expiration: Expiration,
    /// Eviction priority.
    pub priority: CachePriority,
    /// Group tags.
    pub tags: Vec<String>,
}

/// An open handle on one clustered cache.
#[async_trait]
pub trait NCacheHandle: Send + Sync + fmt::Debug {
    /// Insert or overwrite an item.
    async fn insert(&self, key: &str, item: NCacheItem) -> Result<(), ClientError>;

    /// Get an item's payload. Expired items are absent.
    async fn get(&self, key: &str) -> Result<Option<Bytes>, ClientError>;

    /// Remove an item. Returns whether it existed.
    async fn remove(&self, key: &str) -> Result<bool, ClientError>;

    /// Whether a live item exists.
    async fn contains(&self, key: &str) -> Result<bool, ClientError>;

    /// Remove every item in the cache.
    async fn clear(&self) -> Result<(), ClientError>;

    /// Round-trip to the cluster.
    async fn ping(&self) -> Result<(), ClientError>;

    /// Release the handle.
    async fn dispose(&self) -> Result<(), ClientError>;
}

/// Opens handles for a cache id.
#[async_trait]
pub trait NCacheConnector: Send + Sync + fmt::Debug {
    /// Attach to the cache described by `options`.
    async fn connect(&self, options: &NCacheOptions) -> Result<Arc<dyn NCacheHandle>, ClientError>;
}
