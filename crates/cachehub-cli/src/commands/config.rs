//! Configuration management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use cachehub_cache::CacheBuilder;
use cachehub_core::config::CacheSettings;
use cachehub_core::result::CacheResult;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Validate configuration by constructing every declared provider
    Validate,
}

/// Declared provider row for table output
#[derive(Debug, Serialize, Tabled)]
struct DeclaredRow {
    /// Declared name
    name: String,
    /// Backend kind
    kind: String,
}

/// Execute config commands
pub fn execute(
    args: &ConfigArgs,
    config_path: &str,
    settings: &CacheSettings,
    format: OutputFormat,
) -> CacheResult<()> {
    match &args.command {
        ConfigCommand::Show => match format {
            OutputFormat::Json => output::print_json(settings),
            OutputFormat::Table => {
                output::print_kv("Config file", config_path);
                output::print_kv(
                    "Default provider",
                    settings.default_provider.as_deref().unwrap_or("default"),
                );
                output::print_kv("Log level", &settings.logging.level);
                output::print_kv("Log format", &settings.logging.format);
                output::print_kv(
                    "Enterprise sections",
                    &settings.enterprise_library.len().to_string(),
                );
                println!();

                let rows: Vec<DeclaredRow> = settings
                    .providers
                    .iter()
                    .map(|declared| DeclaredRow {
                        name: declared.name().unwrap_or("(derived)").to_string(),
                        kind: declared.kind().to_string(),
                    })
                    .collect();
                output::print_list(&rows, format);
            }
        },
        ConfigCommand::Validate => match CacheBuilder::new().configure(settings) {
            Ok(builder) => {
                let registry = builder.build();
                match format {
                    OutputFormat::Json => output::print_json(&serde_json::json!({
                        "status": "ok",
                        "config": config_path,
                        "providers": registry.names(),
                        "default": registry.default_name(),
                    })),
                    OutputFormat::Table => {
                        output::print_success(
                            &format!("Configuration '{config_path}' is valid"),
                            format,
                        );
                        output::print_kv("Providers", &registry.names().join(", "));
                        output::print_kv("Default", registry.default_name());
                    }
                }
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {e}"));
                return Err(e);
            }
        },
    }

    Ok(())
}
