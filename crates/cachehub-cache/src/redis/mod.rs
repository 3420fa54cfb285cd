//! Redis cache provider.

pub mod client;
pub mod connection_string;
pub mod operations;

pub use client::RedisClient;
pub use connection_string::RedisConnectionString;
pub use operations::RedisCacheProvider;
