//! Core traits defined in `cachehub-core` and implemented by other crates.

pub mod provider;

pub use provider::{CacheProvider, CacheProviderExt, ProviderKind};
