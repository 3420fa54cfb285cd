//! Provider listing.

use serde::Serialize;
use tabled::Tabled;

use cachehub_cache::CacheManager;
use cachehub_core::result::CacheResult;

use crate::output::{self, OutputFormat};

/// Provider display row for table output
#[derive(Debug, Serialize, Tabled)]
struct ProviderRow {
    /// Registration name
    name: String,
    /// Backend family
    kind: String,
    /// Lifecycle state
    state: String,
    /// Health check result
    healthy: bool,
    /// Whether this is the default provider
    default: bool,
}

/// List registered providers with their health
pub async fn execute(manager: &CacheManager, format: OutputFormat) -> CacheResult<()> {
    let health = manager.health_check_all().await;
    let default_name = manager.registry().default_name();

    let rows: Vec<ProviderRow> = manager
        .registry()
        .infos()
        .into_iter()
        .map(|info| ProviderRow {
            healthy: health.get(&info.name).copied().unwrap_or(false),
            default: info.name == default_name,
            kind: info.kind.to_string(),
            state: info.state.to_string(),
            name: info.name,
        })
        .collect();

    output::print_list(&rows, format);
    Ok(())
}
