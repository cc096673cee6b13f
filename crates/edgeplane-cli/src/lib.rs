pub mod cli;
pub mod commands;
pub mod config;
pub mod observability;
pub mod output;
pub mod state;

use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use edgeplane_reconcile::Provider;
use edgeplane_remote::{AuthHeader, HttpStore};

use crate::cli::{Cli, Commands, DistributionCommands};
use crate::config::AppConfig;

/// Builds a provider backed by the configured HTTP store.
pub fn build_provider(cfg: &AppConfig) -> Result<Provider> {
    let auth = cfg
        .store
        .token
        .clone()
        .map(|token| AuthHeader::Bearer { token });
    let store = HttpStore::new(&cfg.store.endpoint, cfg.timeout(), auth)
        .context("Failed to configure the distribution store")?;
    tracing::debug!(endpoint = %cfg.store.endpoint, region = %cfg.store.region, "store configured");
    Ok(Provider::new(Arc::new(store)))
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut cfg = crate::config::loader::load_config(cli.config.as_deref()).map_err(anyhow::Error::msg)?;
    if let Some(endpoint) = &cli.endpoint {
        cfg.store.endpoint = endpoint.clone();
        cfg.validate().map_err(anyhow::Error::msg)?;
    }
    observability::init_tracing_with_level(&cfg.logging.level);
    let format = cli.format.unwrap_or_default();

    match &cli.command {
        Commands::Config => {
            println!("{}: {}", "Endpoint".cyan(), cfg.store.endpoint);
            println!("{}: {}", "Region".cyan(), cfg.store.region);
            println!("{}: {}ms", "Timeout".cyan(), cfg.store.timeout_ms);
            let token = if cfg.store.token.is_some() { "(set)" } else { "(not set)" };
            println!("{}: {}", "Token".cyan(), token);
            println!("{}: {}", "Log level".cyan(), cfg.logging.level);
        }
        Commands::Origin(args) => {
            let provider = build_provider(&cfg)?;
            commands::resource::run(&provider.origins(), &args.command, format).await?;
        }
        Commands::Behaviour(args) => {
            let provider = build_provider(&cfg)?;
            commands::resource::run(&provider.cache_behaviours(), &args.command, format).await?;
        }
        Commands::Distribution(args) => match &args.command {
            DistributionCommands::Show { id } => {
                let provider = build_provider(&cfg)?;
                commands::distribution::show(&provider, id, format).await?;
            }
        },
    }

    Ok(())
}
