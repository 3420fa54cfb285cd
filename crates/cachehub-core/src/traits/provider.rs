//! Cache provider trait for pluggable caching backends.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::codec::{JsonCodec, ValueCodec};
use crate::entry::{CacheEntry, Expiration};
use crate::lifecycle::ProviderState;
use crate::result::CacheResult;

/// The backend family a provider adapts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// In-process cache.
    Memory,
    /// Redis server.
    Redis,
    /// NCache cluster.
    NCache,
    /// Legacy in-process cache manager with scavenging.
    EnterpriseLibrary,
    /// Application-supplied implementation.
    Custom,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Redis => write!(f, "redis"),
            Self::NCache => write!(f, "ncache"),
            Self::EnterpriseLibrary => write!(f, "enterprise_library"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// Uniform contract over every cache backend.
///
/// A cache miss is `Ok(None)`, never an error. Backend connectivity problems
/// surface as `ProviderUnavailable`, and every operation on a disposed
/// provider fails with `InvalidOperation`.
#[async_trait]
pub trait CacheProvider: Send + Sync + fmt::Debug + 'static {
    /// The name this provider is registered under.
    fn name(&self) -> &str;

    /// The backend family.
    fn kind(&self) -> ProviderKind;

    /// Current lifecycle state.
    fn state(&self) -> ProviderState;

    /// Insert or overwrite an entry.
    async fn set(&self, entry: CacheEntry) -> CacheResult<()>;

    /// Insert or overwrite an entry if one is given.
    ///
    /// Returns `false` without touching the backend when `entry` is `None`.
    async fn add(&self, entry: Option<CacheEntry>) -> CacheResult<bool> {
        match entry {
            Some(entry) => {
                self.set(entry).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Get a value by key. Returns `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> CacheResult<Option<Bytes>>;

    /// Remove a key. Returns whether a live value was removed.
    async fn remove(&self, key: &str) -> CacheResult<bool>;

    /// Check whether a live value exists for the key.
    async fn contains(&self, key: &str) -> CacheResult<bool>;

    /// Remove every entry this provider owns. Best effort per backend.
    async fn clear(&self) -> CacheResult<()>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> CacheResult<bool>;

    /// Release the backend handle. Idempotent.
    async fn dispose(&self) -> CacheResult<()>;
}

/// Typed access on top of [`CacheProvider`], usable through `dyn` references.
#[async_trait]
pub trait CacheProviderExt: CacheProvider {
    /// Get a value and decode it with `codec`.
    async fn get_with<T, C>(&self, key: &str, codec: &C) -> CacheResult<Option<T>>
    where
        T: DeserializeOwned + Send,
        C: ValueCodec,
    {
        match self.get(key).await? {
            Some(payload) => Ok(Some(codec.decode(&payload)?)),
            None => Ok(None),
        }
    }

    /// Encode a value with `codec` and store it.
    async fn add_with<T, C>(
        &self,
        key: &str,
        value: &T,
        expiration: Expiration,
        codec: &C,
    ) -> CacheResult<bool>
    where
        T: Serialize + Sync + ?Sized,
        C: ValueCodec,
    {
        let entry = CacheEntry::encode(key, value, codec)?.with_expiration(expiration);
        self.add(Some(entry)).await
    }

    /// Get a typed value by deserializing from JSON.
    async fn get_json<T: DeserializeOwned + Send>(&self, key: &str) -> CacheResult<Option<T>> {
        self.get_with(key, &JsonCodec).await
    }

    /// Set a typed value by serializing to JSON.
    async fn add_json<T: Serialize + Sync + ?Sized>(
        &self,
        key: &str,
        value: &T,
        expiration: Expiration,
    ) -> CacheResult<bool> {
        self.add_with(key, value, expiration, &JsonCodec).await
    }
}

impl<P: CacheProvider + ?Sized> CacheProviderExt for P {}
