//! Redis connection management.

use std::fmt;
use std::time::Duration;

use redis::Client;
use redis::aio::ConnectionManager;
use tokio::sync::Mutex;
use tracing::info;

use cachehub_core::error::{CacheError, ErrorKind};
use cachehub_core::result::CacheResult;

use super::connection_string::{RedisConnectionString, mask_redis_url};
use crate::deadline;

/// Redis client wrapper with lazy connection management.
///
/// Opening the client performs no I/O. The first operation establishes a
/// reconnecting [`ConnectionManager`], which is then shared by clones.
pub struct RedisClient {
    /// Redis client handle.
    client: Client,
    /// Established connection, once the first operation has run.
    conn: Mutex<Option<ConnectionManager>>,
    /// Key prefix for all keys.
    key_prefix: String,
    /// Credential-free endpoint identity.
    identity: String,
    /// Upper bound on establishing the connection.
    connect_timeout: Duration,
}

impl fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisClient")
            .field("identity", &self.identity)
            .field("key_prefix", &self.key_prefix)
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}

impl RedisClient {
    /// Create a client for a parsed connection string.
    pub fn open(
        connection: &RedisConnectionString,
        key_prefix: &str,
        connect_timeout: Duration,
    ) -> CacheResult<Self> {
        let client = Client::open(connection.url()).map_err(|e| {
            CacheError::with_source(
                ErrorKind::InvalidArgument,
                format!(
                    "Invalid Redis connection string '{}'",
                    mask_redis_url(connection.url())
                ),
                e,
            )
        })?;

        Ok(Self {
            client,
            conn: Mutex::new(None),
            key_prefix: key_prefix.to_string(),
            identity: connection.identity().to_string(),
            connect_timeout,
        })
    }

    /// Get a connection, establishing it on first use.
    pub async fn connection(&self, provider: &str) -> CacheResult<ConnectionManager> {
        let mut slot = self.conn.lock().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        info!(provider, endpoint = %self.identity, "Connecting to Redis");
        let client = self.client.clone();
        let conn = deadline::bounded(provider, "connect", self.connect_timeout, async move {
            ConnectionManager::new(client).await.map_err(|e| {
                CacheError::with_source(
                    ErrorKind::ProviderUnavailable,
                    format!("Cache provider '{provider}' failed to connect to Redis"),
                    e,
                )
            })
        })
        .await?;

        info!(provider, endpoint = %self.identity, "Successfully connected to Redis");
        *slot = Some(conn.clone());
        Ok(conn)
    }

    /// Drop the established connection. Returns whether one existed.
    pub async fn release(&self) -> bool {
        self.conn.lock().await.take().is_some()
    }

    /// Build a full key with the configured prefix.
    pub fn prefixed_key(&self, key: &str) -> String {
        format!("{}{key}", self.key_prefix)
    }

    /// Return the key prefix.
    pub fn prefix(&self) -> &str {
        &self.key_prefix
    }

    /// Credential-free endpoint identity.
    pub fn identity(&self) -> &str {
        &self.identity
    }
}
