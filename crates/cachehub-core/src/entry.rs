//! Cache entry model: key, payload, expiration, priority, and tags.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::ValueCodec;
use crate::guard;
use crate::result::CacheResult;

/// When a cached value stops being visible.
///
/// Absolute and sliding expiration are mutually exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expiration {
    /// No explicit expiration. The backend default TTL applies if configured.
    #[default]
    Never,
    /// Fixed wall-clock deadline.
    Absolute(DateTime<Utc>),
    /// Deadline that moves forward by the window on every read.
    Sliding(Duration),
}

impl Expiration {
    /// Absolute expiration `ttl` from now.
    pub fn after(ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        Self::Absolute(Utc::now().checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC))
    }

    /// Remaining lifetime as seen at `now`.
    ///
    /// `None` for [`Expiration::Never`]. A deadline already in the past yields
    /// [`Duration::ZERO`]. Sliding entries report the full window.
    pub fn time_to_live(&self, now: DateTime<Utc>) -> Option<Duration> {
        match self {
            Self::Never => None,
            Self::Absolute(at) => Some((*at - now).to_std().unwrap_or(Duration::ZERO)),
            Self::Sliding(window) => Some(*window),
        }
    }

    /// The deadline for an entry last touched at `last_touch`.
    pub fn deadline(&self, last_touch: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Never => None,
            Self::Absolute(at) => Some(*at),
            Self::Sliding(window) => {
                let window = chrono::Duration::from_std(*window).ok()?;
                last_touch.checked_add_signed(window)
            }
        }
    }

    /// Whether an entry last touched at `last_touch` is expired at `now`.
    pub fn is_expired(&self, last_touch: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.deadline(last_touch).is_some_and(|deadline| now >= deadline)
    }

    /// Replace [`Expiration::Never`] with an absolute deadline `ttl` from now.
    pub fn or_default_ttl(self, ttl: Option<Duration>) -> Self {
        match (self, ttl) {
            (Self::Never, Some(ttl)) => Self::after(ttl),
            (other, _) => other,
        }
    }
}

/// Relative importance used by scavenging backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePriority {
    /// Scavenged first.
    Low,
    /// Default priority.
    #[default]
    Normal,
    /// Scavenged last.
    High,
    /// Never scavenged; only expiration or explicit removal evicts it.
    NotRemovable,
}

impl fmt::Display for CachePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Normal => write!(f, "normal"),
            Self::High => write!(f, "high"),
            Self::NotRemovable => write!(f, "not_removable"),
        }
    }
}

/// A single value to be stored under a key.
///
/// Construction rejects blank keys, so every `CacheEntry` in circulation has
/// a usable key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    key: String,
    value: Bytes,
    expiration: Expiration,
    priority: CachePriority,
    tags: Vec<String>,
}

impl CacheEntry {
    /// Create an entry that never expires.
    pub fn new(key: impl AsRef<str>, value: impl Into<Bytes>) -> CacheResult<Self> {
        let key = guard::ensure_not_blank(Some(key.as_ref()), "key")?;
        Ok(Self {
            key: key.to_string(),
            value: value.into(),
            expiration: Expiration::Never,
            priority: CachePriority::Normal,
            tags: Vec::new(),
        })
    }

    /// Create an entry whose value is encoded with `codec`.
    pub fn encode<T, C>(key: impl AsRef<str>, value: &T, codec: &C) -> CacheResult<Self>
    where
        T: Serialize + ?Sized,
        C: ValueCodec + ?Sized,
    {
        Self::new(key, codec.encode(value)?)
    }

    /// Set an absolute deadline.
    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expiration = Expiration::Absolute(at);
        self
    }

    /// Set an absolute deadline `ttl` from now.
    pub fn expires_after(mut self, ttl: Duration) -> Self {
        self.expiration = Expiration::after(ttl);
        self
    }

    /// Set a sliding window.
    pub fn sliding(mut self, window: Duration) -> Self {
        self.expiration = Expiration::Sliding(window);
        self
    }

    /// Set the expiration directly.
    pub fn with_expiration(mut self, expiration: Expiration) -> Self {
        self.expiration = expiration;
        self
    }

    /// Set the scavenging priority.
    pub fn with_priority(mut self, priority: CachePriority) -> Self {
        self.priority = priority;
        self
    }

    /// Attach a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// The entry key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The payload.
    pub fn value(&self) -> &Bytes {
        &self.value
    }

    /// The expiration policy.
    pub fn expiration(&self) -> Expiration {
        self.expiration
    }

    /// The scavenging priority.
    pub fn priority(&self) -> CachePriority {
        self.priority
    }

    /// Attached tags.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Split the entry into its key and payload.
    pub fn into_parts(self) -> (String, Bytes) {
        (self.key, self.value)
    }
}
