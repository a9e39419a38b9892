//! listing-relay main entry point
//!
//! This is the command-line interface for the listing relay batch job.

use anyhow::Context;
use clap::Parser;
use listing_relay::config::{load_config, Config};
use listing_relay::pipeline;
use listing_relay::renderer::ChromiumRenderer;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const BANNER: &str = "==================================================";

/// listing-relay: scrape a product listing and deliver it to a webhook
///
/// Renders the configured listing page in headless Chromium, extracts the
/// product cards, and POSTs them as one JSON envelope. Exits 0 only when
/// products were extracted and the webhook answered HTTP 200.
#[derive(Parser, Debug)]
#[command(name = "listing-relay")]
#[command(version)]
#[command(about = "Scrape a product listing and deliver it to a webhook", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Listing page to scrape, overriding config and environment
    #[arg(long, value_name = "URL")]
    target_url: Option<String>,

    /// Webhook endpoint, overriding config and environment
    #[arg(long, value_name = "URL")]
    webhook_url: Option<String>,

    /// Scrape and print the envelope without sending it
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Fatal error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("listing_relay=info,warn"),
            1 => EnvFilter::new("listing_relay=debug,info"),
            2 => EnvFilter::new("listing_relay=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

async fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli)?;
    let renderer = ChromiumRenderer::new();

    tracing::info!("{}", BANNER);
    tracing::info!(
        "LISTING RELAY: {} / {}",
        config.target.source,
        config.target.category
    );
    tracing::info!("{}", BANNER);

    if cli.dry_run {
        return handle_dry_run(&config, &renderer).await;
    }

    let delivered = pipeline::run(&config, &renderer).await?;

    tracing::info!("{}", BANNER);
    tracing::info!("Run completed: {} products delivered", delivered);
    tracing::info!("{}", BANNER);

    Ok(())
}

/// Loads the configuration and layers command-line overrides on top
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    match &cli.config {
        Some(path) => tracing::info!("Loading configuration from: {}", path.display()),
        None => tracing::info!("No configuration file given, using defaults"),
    }

    let mut config = load_config(cli.config.as_deref()).context("failed to load configuration")?;

    let overridden = cli.target_url.is_some() || cli.webhook_url.is_some();
    if let Some(url) = &cli.target_url {
        config.target.url = url.clone();
    }
    if let Some(url) = &cli.webhook_url {
        config.delivery.webhook_url = url.clone();
    }
    if overridden {
        listing_relay::config::validate(&config).context("invalid command-line override")?;
    }

    Ok(config)
}

/// Handles the --dry-run mode: scrapes and prints the envelope as JSON
async fn handle_dry_run(config: &Config, renderer: &ChromiumRenderer) -> anyhow::Result<()> {
    tracing::info!("Dry run: the webhook will not be called");

    let envelope = pipeline::preview(config, renderer).await?;
    let json = serde_json::to_string_pretty(&envelope).context("failed to serialize envelope")?;
    println!("{}", json);

    tracing::info!(
        "Would send {} products to {}",
        envelope.total_products,
        config.delivery.webhook_url
    );

    Ok(())
}
