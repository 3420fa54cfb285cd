//! # cachehub
//!
//! Named, pluggable cache providers behind one contract.
//!
//! Register backends with a [`CacheBuilder`], hand the resulting registry to
//! a [`CacheManager`], and resolve providers by name wherever a cache is
//! needed:
//!
//! ```no_run
//! use cachehub::{CacheBuilder, CacheEntry, CacheManager};
//!
//! # async fn run() -> cachehub::CacheResult<()> {
//! let manager = CacheManager::new(
//!     CacheBuilder::new()
//!         .add_memory_cache("local")?
//!         .add_redis_cache("cache-01:6379", "shared")?
//!         .default_provider("local")?
//!         .build(),
//! );
//!
//! let cache = manager.resolve("local")?;
//! cache.add(Some(CacheEntry::new("greeting", "hello")?)).await?;
//! # Ok(())
//! # }
//! ```

pub use cachehub_cache::{
    CacheBuilder, CacheManager, CacheRegistry, DEFAULT_PROVIDER_NAME, ProviderInfo, cancellable,
};
pub use cachehub_core::{
    CacheEntry, CacheError, CachePriority, CacheProvider, CacheProviderExt, CacheResult,
    ErrorKind, Expiration, JsonCodec, ProviderKind, ProviderState, ValueCodec,
};

/// Backend implementations.
pub mod providers {
    pub use cachehub_cache::enterprise::EnterpriseLibraryCacheProvider;
    pub use cachehub_cache::memory::MemoryCacheProvider;
    pub use cachehub_cache::ncache::{
        ClientError, NCacheConnector, NCacheHandle, NCacheItem, NCacheProvider,
    };
    pub use cachehub_cache::redis::RedisCacheProvider;
}

/// Settings schemas and loading.
pub use cachehub_core::config;
/// Argument guards.
pub use cachehub_core::guard;
