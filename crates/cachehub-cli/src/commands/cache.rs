//! Key-level cache commands.

use std::time::Duration;

use clap::Args;
use serde::Serialize;

use cachehub_cache::CacheManager;
use cachehub_core::entry::{CacheEntry, CachePriority};
use cachehub_core::error::{CacheError, ErrorKind};
use cachehub_core::result::CacheResult;

use crate::output::{self, OutputFormat};

/// Arguments for commands that take a single key
#[derive(Debug, Args)]
pub struct KeyArgs {
    /// Cache key
    pub key: String,
}

/// Arguments for `set`
#[derive(Debug, Args)]
pub struct SetArgs {
    /// Cache key
    pub key: String,
    /// Value, stored as UTF-8 bytes
    pub value: String,
    /// Expire after this many seconds
    #[arg(long, conflicts_with = "sliding")]
    pub ttl: Option<u64>,
    /// Expire after this many seconds without a read
    #[arg(long)]
    pub sliding: Option<u64>,
    /// Eviction priority for backends that scavenge
    #[arg(long, value_enum, default_value = "normal")]
    pub priority: PriorityArg,
    /// Tag to attach; may be repeated
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

/// Arguments for `clear`
#[derive(Debug, Args)]
pub struct ClearArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Priority as accepted on the command line
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum PriorityArg {
    /// Scavenged first
    Low,
    /// Default priority
    Normal,
    /// Scavenged last
    High,
    /// Never scavenged
    NotRemovable,
}

impl From<PriorityArg> for CachePriority {
    fn from(value: PriorityArg) -> Self {
        match value {
            PriorityArg::Low => Self::Low,
            PriorityArg::Normal => Self::Normal,
            PriorityArg::High => Self::High,
            PriorityArg::NotRemovable => Self::NotRemovable,
        }
    }
}

/// JSON result of a key command
#[derive(Debug, Serialize)]
struct KeyResult<'a> {
    provider: &'a str,
    key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    found: bool,
}

/// Read a value
pub async fn get(
    manager: &CacheManager,
    provider: Option<&str>,
    args: &KeyArgs,
    format: OutputFormat,
) -> CacheResult<()> {
    let cache = manager.resolve(provider)?;
    let value = cache
        .get(&args.key)
        .await?
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned());

    match format {
        OutputFormat::Json => output::print_json(&KeyResult {
            provider: cache.name(),
            key: &args.key,
            found: value.is_some(),
            value,
        }),
        OutputFormat::Table => match value {
            Some(value) => println!("{value}"),
            None => output::print_warning(
                &format!("Key '{}' not found in '{}'", args.key, cache.name()),
                format,
            ),
        },
    }
    Ok(())
}

/// Store a value
pub async fn set(
    manager: &CacheManager,
    provider: Option<&str>,
    args: &SetArgs,
    format: OutputFormat,
) -> CacheResult<()> {
    let cache = manager.resolve(provider)?;

    let mut entry = CacheEntry::new(&args.key, args.value.clone().into_bytes())?
        .with_priority(args.priority.into());
    if let Some(seconds) = args.ttl {
        entry = entry.expires_after(Duration::from_secs(seconds));
    }
    if let Some(seconds) = args.sliding {
        if seconds == 0 {
            return Err(CacheError::new(
                ErrorKind::InvalidArgument,
                "'--sliding' must be at least one second",
            ));
        }
        entry = entry.sliding(Duration::from_secs(seconds));
    }
    for tag in &args.tags {
        entry = entry.with_tag(tag);
    }

    cache.set(entry).await?;

    match format {
        OutputFormat::Json => output::print_json(&KeyResult {
            provider: cache.name(),
            key: &args.key,
            value: Some(args.value.clone()),
            found: true,
        }),
        OutputFormat::Table => {
            output::print_success(
                &format!("Stored '{}' in '{}'", args.key, cache.name()),
                format,
            )
        }
    }
    Ok(())
}

/// Remove a key
pub async fn remove(
    manager: &CacheManager,
    provider: Option<&str>,
    args: &KeyArgs,
    format: OutputFormat,
) -> CacheResult<()> {
    let cache = manager.resolve(provider)?;
    let removed = cache.remove(&args.key).await?;

    match format {
        OutputFormat::Json => output::print_json(&KeyResult {
            provider: cache.name(),
            key: &args.key,
            value: None,
            found: removed,
        }),
        OutputFormat::Table if removed => {
            output::print_success(
                &format!("Removed '{}' from '{}'", args.key, cache.name()),
                format,
            )
        }
        OutputFormat::Table => output::print_warning(
            &format!("Key '{}' not found in '{}'", args.key, cache.name()),
            format,
        ),
    }
    Ok(())
}

/// Check whether a key holds a live value
pub async fn contains(
    manager: &CacheManager,
    provider: Option<&str>,
    args: &KeyArgs,
    format: OutputFormat,
) -> CacheResult<()> {
    let cache = manager.resolve(provider)?;
    let found = cache.contains(&args.key).await?;

    match format {
        OutputFormat::Json => output::print_json(&KeyResult {
            provider: cache.name(),
            key: &args.key,
            value: None,
            found,
        }),
        OutputFormat::Table => println!("{found}"),
    }
    Ok(())
}

/// Remove every entry from a provider
pub async fn clear(
    manager: &CacheManager,
    provider: Option<&str>,
    args: &ClearArgs,
    format: OutputFormat,
) -> CacheResult<()> {
    let cache = manager.resolve(provider)?;

    if !args.yes {
        let confirm = dialoguer::Confirm::new()
            .with_prompt(format!("Remove ALL entries from '{}'?", cache.name()))
            .default(false)
            .interact()
            .map_err(|e| CacheError::with_source(ErrorKind::InvalidOperation, "Input error", e))?;

        if !confirm {
            output::print_warning("Cancelled", format);
            return Ok(());
        }
    }

    cache.clear().await?;
    output::print_success(&format!("Cleared '{}'", cache.name()), format);
    Ok(())
}
