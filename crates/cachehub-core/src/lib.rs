//! # cachehub-core
//!
//! Core crate for CacheHub. Contains the provider contract, the cache entry
//! model, per-backend option schemas, settings loading, argument guards,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other CacheHub crates.

pub mod codec;
pub mod config;
pub mod entry;
pub mod error;
pub mod guard;
pub mod lifecycle;
pub mod result;
pub mod traits;

pub use codec::{JsonCodec, ValueCodec};
pub use entry::{CacheEntry, CachePriority, Expiration};
pub use error::{CacheError, ErrorKind};
pub use lifecycle::{Lifecycle, ProviderState};
pub use result::CacheResult;
pub use traits::{CacheProvider, CacheProviderExt, ProviderKind};
