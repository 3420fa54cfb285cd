//! NCache cache provider.
//!
//! The provider is written against a small client contract
//! ([`NCacheConnector`] / [`NCacheHandle`]) so any NCache client binding can
//! be plugged in through the builder.

pub mod client;
pub mod provider;

pub use client::{ClientError, NCacheConnector, NCacheHandle, NCacheItem};
pub use provider::NCacheProvider;
