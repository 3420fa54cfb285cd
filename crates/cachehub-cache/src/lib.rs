//! # cachehub-cache
//!
//! Cache providers for CacheHub and the machinery that names them:
//!
//! - **memory**: in-process cache using [moka](https://crates.io/crates/moka)
//! - **redis**: Redis-backed cache using the [redis](https://crates.io/crates/redis) crate
//! - **ncache**: adapter over an NCache client binding
//! - **enterprise**: in-process cache manager with expiration polling and scavenging
//!
//! Providers are registered with a [`CacheBuilder`], frozen into a
//! [`CacheRegistry`], and resolved by name through a [`CacheManager`].

pub mod builder;
pub mod deadline;
#[cfg(feature = "enterprise-library")]
pub mod enterprise;
pub mod manager;
#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "ncache")]
pub mod ncache;
#[cfg(feature = "redis-backend")]
pub mod redis;
pub mod registry;

pub use builder::CacheBuilder;
pub use deadline::cancellable;
pub use manager::CacheManager;
pub use registry::{CacheRegistry, DEFAULT_PROVIDER_NAME, ProviderInfo};
