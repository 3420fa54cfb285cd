//! Settings schemas.
//!
//! Settings are deserialized from a TOML file via the `config` crate, with
//! `CACHEHUB__*` environment variables layered on top.

pub mod logging;
pub mod options;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use self::logging::LoggingConfig;
use self::options::{EnterpriseLibraryOptions, MemoryOptions, NCacheOptions, RedisOptions};

use crate::error::CacheError;

/// Root settings document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Name resolved when callers do not ask for a specific provider.
    #[serde(default)]
    pub default_provider: Option<String>,
    /// Providers to register, in order. Later entries replace earlier ones
    /// with the same name.
    #[serde(default)]
    pub providers: Vec<ProviderSettings>,
    /// Enterprise Library cache manager sections keyed by section name.
    #[serde(default)]
    pub enterprise_library: BTreeMap<String, EnterpriseLibraryOptions>,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// One provider declaration, tagged by backend `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderSettings {
    /// In-process cache.
    Memory {
        /// Registration name; defaults to `"default"`.
        #[serde(default)]
        name: Option<String>,
        /// Backend options.
        #[serde(default)]
        options: MemoryOptions,
    },
    /// Redis server.
    Redis {
        /// Registration name; defaults to the connection identity.
        #[serde(default)]
        name: Option<String>,
        /// Backend options.
        options: RedisOptions,
    },
    /// NCache cluster. Requires a client connector on the builder.
    #[serde(rename = "ncache")]
    NCache {
        /// Registration name; defaults to the cache id.
        #[serde(default)]
        name: Option<String>,
        /// Backend options.
        options: NCacheOptions,
    },
    /// Legacy cache manager bound to a configuration section.
    EnterpriseLibrary {
        /// Registration name; defaults to the section name.
        #[serde(default)]
        name: Option<String>,
        /// Section to take options from; defaults to `name`.
        #[serde(default)]
        section: Option<String>,
    },
}

impl ProviderSettings {
    /// The declared registration name, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Memory { name, .. }
            | Self::Redis { name, .. }
            | Self::NCache { name, .. }
            | Self::EnterpriseLibrary { name, .. } => name.as_deref(),
        }
    }

    /// The backend kind as written in settings.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Memory { .. } => "memory",
            Self::Redis { .. } => "redis",
            Self::NCache { .. } => "ncache",
            Self::EnterpriseLibrary { .. } => "enterprise_library",
        }
    }
}

impl CacheSettings {
    /// Load settings from a TOML file and the environment.
    ///
    /// A missing file is not an error; environment variables prefixed with
    /// `CACHEHUB__` still apply (`CACHEHUB__DEFAULT_PROVIDER=sessions`).
    pub fn load(path: &str) -> Result<Self, CacheError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("CACHEHUB")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| CacheError::configuration(format!("Failed to build config: {e}")))?;

        let settings: Self = config
            .try_deserialize()
            .map_err(|e| CacheError::configuration(format!("Failed to deserialize config: {e}")))?;

        debug!(
            path,
            providers = settings.providers.len(),
            sections = settings.enterprise_library.len(),
            "Cache settings loaded"
        );
        Ok(settings)
    }

    /// Options for an Enterprise Library section, or defaults carrying the
    /// section name when the section is not declared.
    pub fn enterprise_section(&self, section: &str) -> EnterpriseLibraryOptions {
        self.enterprise_library
            .get(section)
            .cloned()
            .map(|mut options| {
                options.section_name = section.to_string();
                options
            })
            .unwrap_or_else(|| EnterpriseLibraryOptions {
                section_name: section.to_string(),
                ..Default::default()
            })
    }
}
