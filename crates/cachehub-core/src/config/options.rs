//! Per-backend provider options.
//!
//! Every struct deserializes from the `options` table of a provider entry in
//! the settings file and is validated with `validator` before a provider is
//! constructed.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// In-memory cache backend options.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct MemoryOptions {
    /// Maximum number of entries in the cache.
    #[serde(default = "default_max_capacity")]
    #[validate(range(min = 1))]
    pub max_capacity: u64,
    /// TTL applied to entries stored without an explicit expiration.
    #[serde(default)]
    pub default_ttl_seconds: Option<u64>,
}

impl Default for MemoryOptions {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
            default_ttl_seconds: None,
        }
    }
}

impl MemoryOptions {
    /// The default TTL as a [`Duration`].
    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl_seconds.map(Duration::from_secs)
    }
}

/// Redis cache backend options.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct RedisOptions {
    /// Redis URL (`redis://host:port/db`) or configuration string
    /// (`host:port,password=secret,ssl=true`).
    #[validate(length(min = 1))]
    pub connection_string: String,
    /// Prefix prepended to every key. Also scopes `clear`.
    #[serde(default)]
    pub key_prefix: String,
    /// TTL applied to entries stored without an explicit expiration.
    #[serde(default)]
    pub default_ttl_seconds: Option<u64>,
    /// Upper bound for establishing the connection.
    #[serde(default = "default_connect_timeout_ms")]
    #[validate(range(min = 1))]
    pub connect_timeout_ms: u64,
    /// Upper bound for a single command round-trip.
    #[serde(default = "default_operation_timeout_ms")]
    #[validate(range(min = 1))]
    pub operation_timeout_ms: u64,
}

impl RedisOptions {
    /// Options with the given connection string and defaults elsewhere.
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            key_prefix: String::new(),
            default_ttl_seconds: None,
            connect_timeout_ms: default_connect_timeout_ms(),
            operation_timeout_ms: default_operation_timeout_ms(),
        }
    }

    /// The default TTL as a [`Duration`].
    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl_seconds.map(Duration::from_secs)
    }
}

/// NCache backend options.
///
/// Builder callers receive a fresh instance inside the `add_ncache`
/// configuration callback.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct NCacheOptions {
    /// Name of the clustered cache to attach to.
    #[serde(default)]
    #[validate(length(min = 1))]
    pub cache_id: String,
    /// Cache servers (`host` or `host:port`). Empty means client.ncconf defaults.
    #[serde(default)]
    pub servers: Vec<String>,
    /// TTL applied to entries stored without an explicit expiration.
    #[serde(default)]
    pub default_ttl_seconds: Option<u64>,
    /// Upper bound for a single client request.
    #[serde(default = "default_operation_timeout_ms")]
    #[validate(range(min = 1))]
    pub request_timeout_ms: u64,
    /// Additional client properties passed through untouched.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl Default for NCacheOptions {
    fn default() -> Self {
        Self {
            cache_id: String::new(),
            servers: Vec::new(),
            default_ttl_seconds: None,
            request_timeout_ms: default_operation_timeout_ms(),
            properties: BTreeMap::new(),
        }
    }
}

impl NCacheOptions {
    /// The default TTL as a [`Duration`].
    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl_seconds.map(Duration::from_secs)
    }

    /// Set a client property.
    pub fn property(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Legacy Enterprise Library cache manager options, one per configuration
/// section.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct EnterpriseLibraryOptions {
    /// Configuration section name this cache manager is declared under.
    #[serde(default = "default_section_name")]
    #[validate(length(min = 1))]
    pub section_name: String,
    /// Item count above which scavenging runs.
    #[serde(default = "default_max_elements")]
    #[validate(range(min = 1))]
    pub max_elements_before_scavenging: usize,
    /// Items removed per scavenging pass.
    #[serde(default = "default_elements_to_remove")]
    #[validate(range(min = 1))]
    pub elements_to_remove_when_scavenging: usize,
    /// Interval of the background expiration sweep.
    #[serde(default = "default_poll_seconds")]
    #[validate(range(min = 1))]
    pub expiration_poll_seconds: u64,
    /// TTL applied to entries stored without an explicit expiration.
    #[serde(default)]
    pub default_ttl_seconds: Option<u64>,
}

impl Default for EnterpriseLibraryOptions {
    fn default() -> Self {
        Self {
            section_name: default_section_name(),
            max_elements_before_scavenging: default_max_elements(),
            elements_to_remove_when_scavenging: default_elements_to_remove(),
            expiration_poll_seconds: default_poll_seconds(),
            default_ttl_seconds: None,
        }
    }
}

impl EnterpriseLibraryOptions {
    /// The default TTL as a [`Duration`].
    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl_seconds.map(Duration::from_secs)
    }

    /// The expiration sweep interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.expiration_poll_seconds)
    }
}

/// Section name used when none is configured.
pub const DEFAULT_SECTION_NAME: &str = "Cache Manager";

fn default_max_capacity() -> u64 {
    10_000
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_operation_timeout_ms() -> u64 {
    5_000
}

fn default_section_name() -> String {
    DEFAULT_SECTION_NAME.to_string()
}

fn default_max_elements() -> usize {
    1_000
}

fn default_elements_to_remove() -> usize {
    10
}

fn default_poll_seconds() -> u64 {
    60
}
