//! CLI command definitions and dispatch.

pub mod cache;
pub mod config;
pub mod providers;

use clap::{Parser, Subcommand};
use tracing::debug;

use cachehub_cache::{CacheBuilder, CacheManager};
use cachehub_core::config::CacheSettings;
use cachehub_core::result::CacheResult;

use crate::output::OutputFormat;

/// CacheHub: named, pluggable cache providers
#[derive(Debug, Parser)]
#[command(name = "cachehub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Provider to operate on; the configured default when omitted
    #[arg(short, long, global = true)]
    pub provider: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List registered providers with their health
    Providers,
    /// Read a value
    Get(cache::KeyArgs),
    /// Store a value
    Set(cache::SetArgs),
    /// Remove a key
    Remove(cache::KeyArgs),
    /// Check whether a key holds a live value
    Contains(cache::KeyArgs),
    /// Remove every entry from a provider
    Clear(cache::ClearArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, settings: CacheSettings) -> CacheResult<()> {
        if let Commands::Config(args) = &self.command {
            return config::execute(args, &self.config, &settings, self.format);
        }

        let manager = open_manager(&settings)?;
        let provider = self.provider.as_deref();

        let result = match &self.command {
            Commands::Providers => providers::execute(&manager, self.format).await,
            Commands::Get(args) => cache::get(&manager, provider, args, self.format).await,
            Commands::Set(args) => cache::set(&manager, provider, args, self.format).await,
            Commands::Remove(args) => cache::remove(&manager, provider, args, self.format).await,
            Commands::Contains(args) => {
                cache::contains(&manager, provider, args, self.format).await
            }
            Commands::Clear(args) => cache::clear(&manager, provider, args, self.format).await,
            Commands::Config(_) => Ok(()),
        };

        manager.shutdown().await;
        result
    }
}

/// Helper: build the provider registry declared in settings.
///
/// With no providers declared, a single in-process cache named `default` is
/// registered so the commands still have something to operate on.
pub fn open_manager(settings: &CacheSettings) -> CacheResult<CacheManager> {
    let mut builder = CacheBuilder::new().configure(settings)?;
    if settings.providers.is_empty() {
        debug!("No providers configured, registering an in-process default");
        builder = builder.add_memory_cache(None)?;
    }
    Ok(CacheManager::new(builder.build()))
}
