//! Fluent registration of cache providers.

use std::sync::Arc;

use tracing::{info, warn};

use cachehub_core::config::options::{
    DEFAULT_SECTION_NAME, EnterpriseLibraryOptions, MemoryOptions, NCacheOptions, RedisOptions,
};
use cachehub_core::config::{CacheSettings, ProviderSettings};
use cachehub_core::error::CacheError;
use cachehub_core::guard;
use cachehub_core::result::CacheResult;
use cachehub_core::traits::CacheProvider;

#[cfg(feature = "ncache")]
use crate::ncache::NCacheConnector;
use crate::registry::{CacheRegistry, DEFAULT_PROVIDER_NAME};

/// Callback that fills in NCache options for [`CacheBuilder::add_ncache`].
pub type NCacheConfigure<'a> = &'a dyn Fn(&mut NCacheOptions) -> CacheResult<()>;

/// Collects provider registrations and produces a [`CacheRegistry`].
///
/// Every `add*` method validates its arguments and constructs the provider
/// immediately, so misconfiguration surfaces here rather than on first use.
/// Network providers connect lazily. Registering a name twice replaces the
/// earlier provider.
///
/// ```no_run
/// use cachehub_cache::{CacheBuilder, CacheManager};
///
/// # fn main() -> cachehub_core::CacheResult<()> {
/// let registry = CacheBuilder::new()
///     .add_memory_cache(None)?
///     .add_redis_cache("cache-01:6379,defaultDatabase=1", "shared")?
///     .build();
/// let manager = CacheManager::new(registry);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CacheBuilder {
    /// Registrations so far.
    registry: CacheRegistry,
    /// Explicitly selected default name.
    default_name: Option<String>,
    /// Enterprise Library sections available to `add_enterprise_library_cache`.
    settings: CacheSettings,
    /// Client binding for NCache providers.
    #[cfg(feature = "ncache")]
    ncache_connector: Option<Arc<dyn NCacheConnector>>,
}

impl CacheBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            registry: CacheRegistry::new(),
            default_name: None,
            settings: CacheSettings::default(),
            #[cfg(feature = "ncache")]
            ncache_connector: None,
        }
    }

    /// Register an already-constructed provider under its own name.
    pub fn add_provider(mut self, provider: Arc<dyn CacheProvider>) -> CacheResult<Self> {
        let name = guard::ensure_not_blank(Some(provider.name()), "provider.name")?.to_string();
        self.register(name, provider);
        Ok(self)
    }

    /// Register an in-process cache with default options.
    ///
    /// The name defaults to `"default"`.
    #[cfg(feature = "memory")]
    pub fn add_memory_cache<'a>(self, name: impl Into<Option<&'a str>>) -> CacheResult<Self> {
        self.add_memory_cache_with(MemoryOptions::default(), name)
    }

    /// Register an in-process cache with explicit options.
    #[cfg(feature = "memory")]
    pub fn add_memory_cache_with<'a>(
        self,
        options: MemoryOptions,
        name: impl Into<Option<&'a str>>,
    ) -> CacheResult<Self> {
        let name = guard::name_or(name.into(), DEFAULT_PROVIDER_NAME);
        let provider = crate::memory::MemoryCacheProvider::new(&name, &options)?;
        self.add_provider(Arc::new(provider))
    }

    /// Register a Redis cache for a connection string.
    ///
    /// Fails with `InvalidArgument` when the connection string is absent or
    /// blank. The name defaults to the connection identity (`host:port/db`).
    #[cfg(feature = "redis-backend")]
    pub fn add_redis_cache<'a, 'b>(
        self,
        connection_string: impl Into<Option<&'a str>>,
        name: impl Into<Option<&'b str>>,
    ) -> CacheResult<Self> {
        let connection_string =
            guard::ensure_not_blank(connection_string.into(), "connection_string")?;
        self.add_redis_cache_with(RedisOptions::new(connection_string), name)
    }

    /// Register a Redis cache with explicit options.
    #[cfg(feature = "redis-backend")]
    pub fn add_redis_cache_with<'a>(
        self,
        options: RedisOptions,
        name: impl Into<Option<&'a str>>,
    ) -> CacheResult<Self> {
        guard::ensure_not_blank(Some(&options.connection_string), "connection_string")?;
        let provider = crate::redis::RedisCacheProvider::new(name.into(), &options)?;
        self.add_provider(Arc::new(provider))
    }

    /// Install the client binding used by NCache registrations.
    #[cfg(feature = "ncache")]
    pub fn with_ncache_connector(mut self, connector: Arc<dyn NCacheConnector>) -> Self {
        self.ncache_connector = Some(connector);
        self
    }

    /// Register an NCache cache configured by a callback.
    ///
    /// Fails with `InvalidArgument` when `configure` is absent; nothing is
    /// invoked in that case. The callback receives fresh options and its
    /// error, if any, is returned as is. The name defaults to the cache id.
    #[cfg(feature = "ncache")]
    pub fn add_ncache<'a>(
        self,
        configure: Option<NCacheConfigure<'_>>,
        name: impl Into<Option<&'a str>>,
    ) -> CacheResult<Self> {
        let configure = guard::ensure_present(configure, "configure")?;
        let mut options = NCacheOptions::default();
        configure(&mut options)?;
        self.add_ncache_with(options, name)
    }

    /// Register an NCache cache with explicit options.
    #[cfg(feature = "ncache")]
    pub fn add_ncache_with<'a>(
        self,
        options: NCacheOptions,
        name: impl Into<Option<&'a str>>,
    ) -> CacheResult<Self> {
        let connector = self.ncache_connector.clone().ok_or_else(|| {
            CacheError::configuration(
                "NCache registration requires a client connector; call with_ncache_connector first",
            )
        })?;
        let provider = crate::ncache::NCacheProvider::new(name.into(), options, connector)?;
        self.add_provider(Arc::new(provider))
    }

    /// Make an Enterprise Library section available to
    /// [`add_enterprise_library_cache`](Self::add_enterprise_library_cache).
    pub fn with_enterprise_section(mut self, options: EnterpriseLibraryOptions) -> Self {
        self.settings
            .enterprise_library
            .insert(options.section_name.clone(), options);
        self
    }

    /// Register an Enterprise Library cache manager.
    ///
    /// Options come from the section of the same name when one is known,
    /// otherwise defaults apply. The name defaults to `"Cache Manager"`.
    #[cfg(feature = "enterprise-library")]
    pub fn add_enterprise_library_cache<'a>(
        self,
        name: impl Into<Option<&'a str>>,
    ) -> CacheResult<Self> {
        let section = guard::name_or(name.into(), DEFAULT_SECTION_NAME);
        let options = self.settings.enterprise_section(&section);
        self.add_enterprise_library_cache_with(options, section.as_str())
    }

    /// Register an Enterprise Library cache manager with explicit options.
    #[cfg(feature = "enterprise-library")]
    pub fn add_enterprise_library_cache_with<'a>(
        self,
        options: EnterpriseLibraryOptions,
        name: impl Into<Option<&'a str>>,
    ) -> CacheResult<Self> {
        let provider =
            crate::enterprise::EnterpriseLibraryCacheProvider::new(name.into(), options)?;
        self.add_provider(Arc::new(provider))
    }

    /// Select the provider resolved when callers do not name one.
    pub fn default_provider(mut self, name: &str) -> CacheResult<Self> {
        let name = guard::ensure_not_blank(Some(name), "name")?;
        self.default_name = Some(name.to_string());
        Ok(self)
    }

    /// Register every provider declared in settings, in order.
    pub fn configure(mut self, settings: &CacheSettings) -> CacheResult<Self> {
        self.settings
            .enterprise_library
            .extend(settings.enterprise_library.clone());

        for declared in &settings.providers {
            self = self.add_declared(declared)?;
        }

        if let Some(name) = &settings.default_provider {
            self = self.default_provider(name)?;
        }

        info!(providers = settings.providers.len(), "Cache settings applied");
        Ok(self)
    }

    #[allow(unreachable_patterns)]
    fn add_declared(self, declared: &ProviderSettings) -> CacheResult<Self> {
        match declared {
            #[cfg(feature = "memory")]
            ProviderSettings::Memory { name, options } => {
                self.add_memory_cache_with(options.clone(), name.as_deref())
            }
            #[cfg(feature = "redis-backend")]
            ProviderSettings::Redis { name, options } => {
                self.add_redis_cache_with(options.clone(), name.as_deref())
            }
            #[cfg(feature = "ncache")]
            ProviderSettings::NCache { name, options } => {
                self.add_ncache_with(options.clone(), name.as_deref())
            }
            #[cfg(feature = "enterprise-library")]
            ProviderSettings::EnterpriseLibrary { name, section } => {
                let section = section
                    .as_deref()
                    .or(name.as_deref())
                    .unwrap_or(DEFAULT_SECTION_NAME);
                let options = self.settings.enterprise_section(section);
                let name = guard::name_or(name.as_deref(), section);
                self.add_enterprise_library_cache_with(options, name.as_str())
            }
            other => Err(CacheError::configuration(format!(
                "Provider kind '{}' is not enabled in this build",
                other.kind()
            ))),
        }
    }

    /// Freeze the registrations into a registry.
    pub fn build(mut self) -> CacheRegistry {
        if let Some(name) = self.default_name.take() {
            self.registry.set_default_name(name);
        }

        if !self.registry.is_empty() && !self.registry.contains(self.registry.default_name()) {
            warn!(
                default = %self.registry.default_name(),
                "Default cache provider is not registered"
            );
        }

        info!(
            providers = self.registry.len(),
            default = %self.registry.default_name(),
            "Cache registry built"
        );
        self.registry
    }

    fn register(&mut self, name: String, provider: Arc<dyn CacheProvider>) {
        let kind = provider.kind();
        if let Some(previous) = self.registry.insert(name.clone(), provider) {
            warn!(
                provider = %name,
                previous_kind = %previous.kind(),
                kind = %kind,
                "Replacing previously registered cache provider"
            );
        } else {
            info!(provider = %name, kind = %kind, "Cache provider registered");
        }
    }
}

impl Default for CacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}
