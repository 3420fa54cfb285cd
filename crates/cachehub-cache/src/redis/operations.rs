//! Redis cache provider implementation.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::{debug, info, warn};
use validator::Validate;

use cachehub_core::config::options::RedisOptions;
use cachehub_core::entry::{CacheEntry, Expiration};
use cachehub_core::error::{CacheError, ErrorKind};
use cachehub_core::guard;
use cachehub_core::lifecycle::{Lifecycle, ProviderState};
use cachehub_core::result::CacheResult;
use cachehub_core::traits::{CacheProvider, ProviderKind};

use super::client::RedisClient;
use super::connection_string::RedisConnectionString;
use crate::deadline;

/// Keys requested per `SCAN` round-trip during `clear`.
const SCAN_BATCH: usize = 500;

/// Redis-backed cache provider.
///
/// Absolute deadlines become `PX` TTLs. A sliding window is stored as a TTL
/// of the window length and is not renewed by reads.
#[derive(Debug)]
pub struct RedisCacheProvider {
    /// Registration name.
    name: String,
    /// Redis client.
    client: RedisClient,
    /// TTL for entries stored without an expiration.
    default_ttl: Option<Duration>,
    /// Upper bound on a single command.
    operation_timeout: Duration,
    /// Lifecycle state.
    lifecycle: Lifecycle,
}

impl RedisCacheProvider {
    /// Create a provider. No connection is opened until the first operation.
    ///
    /// The name defaults to the credential-free endpoint identity.
    pub fn new(name: Option<&str>, options: &RedisOptions) -> CacheResult<Self> {
        options.validate()?;
        let connection = RedisConnectionString::parse(&options.connection_string)?;

        let connect_timeout = connection
            .connect_timeout()
            .unwrap_or(Duration::from_millis(options.connect_timeout_ms));
        let operation_timeout = connection
            .operation_timeout()
            .unwrap_or(Duration::from_millis(options.operation_timeout_ms));

        let client = RedisClient::open(&connection, &options.key_prefix, connect_timeout)?;
        let name = guard::name_or(name, connection.identity());

        let lifecycle = Lifecycle::new();
        lifecycle.mark_ready();

        info!(
            provider = %name,
            endpoint = %connection.identity(),
            prefix = %options.key_prefix,
            "Redis cache registered"
        );
        Ok(Self {
            name,
            client,
            default_ttl: options.default_ttl(),
            operation_timeout,
            lifecycle,
        })
    }

    /// Map a Redis error to a `CacheError`.
    fn map_err(&self, operation: &str, e: redis::RedisError) -> CacheError {
        CacheError::with_source(
            ErrorKind::ProviderUnavailable,
            format!("Cache provider '{}' failed during {operation}: {e}", self.name),
            e,
        )
    }

    /// Validate state and key, returning the prefixed key.
    fn full_key(&self, key: &str) -> CacheResult<String> {
        self.lifecycle.ensure_ready(&self.name)?;
        let key = guard::ensure_not_blank(Some(key), "key")?;
        Ok(self.client.prefixed_key(key))
    }

    async fn connection(&self) -> CacheResult<ConnectionManager> {
        self.client.connection(&self.name).await
    }

    async fn bounded<T, F>(&self, operation: &str, call: F) -> CacheResult<T>
    where
        F: Future<Output = CacheResult<T>>,
    {
        deadline::bounded(&self.name, operation, self.operation_timeout, call).await
    }
}

/// TTL to store a value with, as seen at `now`.
///
/// `None` stores without expiry. `Some(ZERO)` means the deadline has passed
/// and the key must be deleted instead. Sliding windows map to a TTL of the
/// full window.
fn redis_ttl(
    expiration: Expiration,
    default_ttl: Option<Duration>,
    now: DateTime<Utc>,
) -> Option<Duration> {
    expiration.or_default_ttl(default_ttl).time_to_live(now)
}

/// Escape glob metacharacters so a prefix matches literally in `SCAN MATCH`.
fn escape_glob(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Redis
    }

    fn state(&self) -> ProviderState {
        self.lifecycle.state()
    }

    async fn set(&self, entry: CacheEntry) -> CacheResult<()> {
        let full_key = self.full_key(entry.key())?;
        let ttl = redis_ttl(entry.expiration(), self.default_ttl, Utc::now());
        let (_, payload) = entry.into_parts();
        let mut conn = self.connection().await?;

        self.bounded("set", async {
            match ttl {
                Some(ttl) if ttl.is_zero() => {
                    let _: () = conn
                        .del(&full_key)
                        .await
                        .map_err(|e| self.map_err("set", e))?;
                }
                Some(ttl) => {
                    let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
                    let _: () = conn
                        .pset_ex(&full_key, &payload[..], millis)
                        .await
                        .map_err(|e| self.map_err("set", e))?;
                }
                None => {
                    let _: () = conn
                        .set(&full_key, &payload[..])
                        .await
                        .map_err(|e| self.map_err("set", e))?;
                }
            }
            Ok::<_, CacheError>(())
        })
        .await
    }

    async fn get(&self, key: &str) -> CacheResult<Option<Bytes>> {
        let full_key = self.full_key(key)?;
        let mut conn = self.connection().await?;
        self.bounded("get", async {
            let value: Option<Vec<u8>> = conn
                .get(&full_key)
                .await
                .map_err(|e| self.map_err("get", e))?;
            Ok::<_, CacheError>(value.map(Bytes::from))
        })
        .await
    }

    async fn remove(&self, key: &str) -> CacheResult<bool> {
        let full_key = self.full_key(key)?;
        let mut conn = self.connection().await?;
        self.bounded("remove", async {
            let removed: u64 = conn
                .del(&full_key)
                .await
                .map_err(|e| self.map_err("remove", e))?;
            Ok::<_, CacheError>(removed > 0)
        })
        .await
    }

    async fn contains(&self, key: &str) -> CacheResult<bool> {
        let full_key = self.full_key(key)?;
        let mut conn = self.connection().await?;
        self.bounded("contains", async {
            let exists: bool = conn
                .exists(&full_key)
                .await
                .map_err(|e| self.map_err("contains", e))?;
            Ok::<_, CacheError>(exists)
        })
        .await
    }

    async fn clear(&self) -> CacheResult<()> {
        self.lifecycle.ensure_ready(&self.name)?;
        if self.client.prefix().is_empty() {
            // Only keys under our prefix are ours to delete.
            warn!(provider = %self.name, "Redis clear skipped: no key prefix configured");
            return Ok(());
        }

        let pattern = format!("{}*", escape_glob(self.client.prefix()));
        let mut conn = self.connection().await?;
        let mut cursor: u64 = 0;
        let mut deleted: usize = 0;

        loop {
            let (next, keys) = self
                .bounded("clear", async {
                    let page: (u64, Vec<String>) = redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(&pattern)
                        .arg("COUNT")
                        .arg(SCAN_BATCH)
                        .query_async(&mut conn)
                        .await
                        .map_err(|e| self.map_err("clear", e))?;
                    Ok::<_, CacheError>(page)
                })
                .await?;

            if !keys.is_empty() {
                deleted += keys.len();
                self.bounded("clear", async {
                    let _: () = conn
                        .del(&keys)
                        .await
                        .map_err(|e| self.map_err("clear", e))?;
                    Ok::<_, CacheError>(())
                })
                .await?;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!(provider = %self.name, deleted, "Redis cache cleared");
        Ok(())
    }

    async fn health_check(&self) -> CacheResult<bool> {
        self.lifecycle.ensure_ready(&self.name)?;
        let mut conn = self.connection().await?;
        self.bounded("health_check", async {
            let pong: String = redis::cmd("PING")
                .query_async(&mut conn)
                .await
                .map_err(|e| self.map_err("health_check", e))?;
            Ok::<_, CacheError>(pong == "PONG")
        })
        .await
    }

    async fn dispose(&self) -> CacheResult<()> {
        if self.lifecycle.dispose() {
            let had_connection = self.client.release().await;
            debug!(provider = %self.name, had_connection, "Redis cache disposed");
        }
        Ok(())
    }
}
