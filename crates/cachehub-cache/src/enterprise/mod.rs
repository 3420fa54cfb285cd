//! Enterprise Library cache provider.

pub mod store;

pub use store::EnterpriseLibraryCacheProvider;
