// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shopkeep - a conversational product-catalog assistant.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod inspect;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shopkeep_config::ShopConfig;

/// Shopkeep - a conversational product-catalog assistant.
#[derive(Parser, Debug)]
#[command(name = "shopkeep", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server (default).
    Serve,
    /// Print recent conversation turns, newest first.
    History {
        /// Number of turns to show.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print catalog entries, cheapest first.
    Products {
        /// Only entries whose name contains this text.
        #[arg(long)]
        filter: Option<String>,
    },
    /// Print the effective configuration with secrets redacted.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => shopkeep_config::load_and_validate_path(path),
        None => shopkeep_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            shopkeep_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            init_tracing(&config.agent.log_level);
            serve::run_serve(config).await
        }
        Commands::History { limit } => {
            init_tracing("warn");
            let limit = limit.unwrap_or(config.gateway.history_limit);
            inspect::run_history(&config, limit).await
        }
        Commands::Products { filter } => {
            init_tracing("warn");
            inspect::run_products(&config, filter.as_deref()).await
        }
        Commands::Config => print_config(&config),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Log targets that follow `agent.log_level`; everything else logs at warn.
const LOG_TARGETS: &[&str] = &[
    "shopkeep",
    "shopkeep_agent",
    "shopkeep_gateway",
    "shopkeep_openai",
    "shopkeep_skill",
    "shopkeep_storage",
    "tower_http",
];

fn default_filter(log_level: &str) -> String {
    let mut directives: Vec<String> = LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={log_level}"))
        .collect();
    directives.push("warn".to_string());
    directives.join(",")
}

/// Initializes the tracing subscriber. `RUST_LOG` takes precedence over `log_level`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

const REDACTED: &str = "********";

fn redacted(config: &ShopConfig) -> ShopConfig {
    let mut config = config.clone();
    if config.provider.api_key.is_some() {
        config.provider.api_key = Some(REDACTED.to_string());
    }
    config
}

fn print_config(config: &ShopConfig) -> Result<(), shopkeep_core::ShopError> {
    let rendered = toml::to_string_pretty(&redacted(config))
        .map_err(|e| shopkeep_core::ShopError::Internal(format!("failed to render config: {e}")))?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_loads_config_defaults() {
        let config = shopkeep_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.agent.name, "shopkeep");
    }

    #[test]
    fn serve_is_default_command() {
        let cli = Cli::parse_from(["shopkeep"]);
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn parses_inspection_flags() {
        let cli = Cli::parse_from(["shopkeep", "history", "--limit", "5"]);
        assert!(matches!(cli.command, Some(Commands::History { limit: Some(5) })));

        let cli = Cli::parse_from(["shopkeep", "products", "--filter", "lamp"]);
        match cli.command {
            Some(Commands::Products { filter }) => assert_eq!(filter.as_deref(), Some("lamp")),
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::parse_from(["shopkeep", "--config", "/tmp/s.toml", "config"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/s.toml")));
    }

    #[test]
    fn default_filter_covers_workspace_crates() {
        let filter = default_filter("debug");
        assert!(filter.starts_with("shopkeep=debug,shopkeep_agent=debug"));
        assert!(filter.ends_with(",warn"));
    }

    #[test]
    fn api_key_is_redacted() {
        let mut config = ShopConfig::default();
        config.provider.api_key = Some("sk-secret".to_string());

        let rendered = toml::to_string_pretty(&redacted(&config)).unwrap();
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains(REDACTED));
    }

    #[test]
    fn missing_api_key_stays_missing() {
        let config = ShopConfig::default();
        assert!(redacted(&config).provider.api_key.is_none());
    }
}
