mod commands;
mod config;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use catalog_sync::Orchestrator;
use catalog_sync_http::{HttpTransport, HttpTransportConfig};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::sync::SyncTarget;

#[derive(Parser)]
#[command(name = "catalog-sync")]
#[command(about = "Run batched catalog synchronization against a shop endpoint")]
struct Cli {
    /// Config file (defaults to ~/.config/catalog-sync/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Sync endpoint URL, overriding the config file
    #[arg(long, global = true)]
    endpoint: Option<String>,
    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every phase of the sync plan in order
    Full {
        /// Phase to run instead of the configured plan (repeatable)
        #[arg(long = "phase", value_name = "PHASE")]
        phases: Vec<String>,
    },
    /// Sync categories only
    Categories,
    /// Sync customers
    Customers,
    /// Sync orders
    Orders,
    /// List products available for import
    List,
    /// Import individual products
    Import {
        /// Product IDs, imported in the order given
        ids: Vec<String>,
        /// Import every enabled product
        #[arg(long)]
        all_enabled: bool,
    },
    /// Repair category parent/child links
    FixHierarchy,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("warn,catalog_sync=debug,catalog_sync_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

fn build_orchestrator(cli: &Cli) -> Result<Orchestrator> {
    let app_config = config::load_config(cli.config.as_deref())?
        .with_token_override(std::env::var(config::TOKEN_ENV).ok());

    let endpoint = app_config.endpoint(cli.endpoint.as_deref())?;
    let mut orchestrator_config = app_config.orchestrator_config()?;
    if let Command::Full { phases } = &cli.command
        && !phases.is_empty()
    {
        orchestrator_config.plan = config::parse_plan(phases.as_slice())?;
    }

    let transport = HttpTransport::new(HttpTransportConfig {
        auth_token: app_config.auth_token.clone(),
        ..HttpTransportConfig::new(endpoint)
    })
    .context("failed to set up the HTTP transport")?;

    Ok(Orchestrator::new(Arc::new(transport), orchestrator_config))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let orchestrator = build_orchestrator(&cli)?;

    match cli.command {
        Command::Full { .. } => commands::sync::run(&orchestrator, SyncTarget::Full).await,
        Command::Categories => commands::sync::run(&orchestrator, SyncTarget::Categories).await,
        Command::Customers => commands::sync::run(&orchestrator, SyncTarget::Customers).await,
        Command::Orders => commands::sync::run(&orchestrator, SyncTarget::Orders).await,
        Command::List => commands::list::run(&orchestrator).await,
        Command::Import { ids, all_enabled } => {
            commands::import::run(&orchestrator, &ids, all_enabled).await
        }
        Command::FixHierarchy => commands::hierarchy::run(&orchestrator).await,
    }
}
