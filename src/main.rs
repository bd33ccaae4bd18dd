use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod command;

use cli::{Cli, Commands};
use storefront_cart::config::{parse_base_url, StorefrontConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = resolve_config(&cli)?;

    match cli.command {
        Commands::Local { action } => command::run_local(&config, &cli.uid, action),
        Commands::Remote { action } => command::run_remote(&config, &cli.uid, action).await,
        Commands::Products { builtin, action } => command::run_products(&config, builtin, action).await,
    }
}

/// Environment-derived config with CLI flags applied on top.
fn resolve_config(cli: &Cli) -> Result<StorefrontConfig> {
    let mut config = StorefrontConfig::from_env()?;
    if let Some(dir) = &cli.cache_dir {
        config.cache_dir = PathBuf::from(dir);
    }
    if let Some(base) = &cli.api_base {
        config.api_base = parse_base_url(base)?;
    }
    if let Some(ms) = cli.debounce_ms {
        config.debounce = Duration::from_millis(ms);
    }
    Ok(config)
}
