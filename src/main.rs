//! Whale Shadow prediction market service entry point.

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use whale_shadow::api::{create_router, AppState};
use whale_shadow::config::Config;
use whale_shadow::market::{seed_demo, MarketManager};
use whale_shadow::metrics;
use whale_shadow::utils::shutdown_signal;
use whale_shadow::whales::{StaticWhaleDirectory, WhaleDirectory};

/// Whale Shadow prediction market service.
#[derive(Parser, Debug)]
#[command(name = "whale-shadow")]
#[command(about = "Prediction markets on the next move of tracked whale wallets")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (default).
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("whale_shadow=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Handle subcommands
    match args.command {
        Some(Command::CheckConfig) => cmd_check_config().await,
        Some(Command::Serve { port }) => cmd_serve(port.or(args.port)).await,
        None => cmd_serve(args.port).await,
    }
}

/// Check configuration validity.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("WHALE SHADOW - CONFIGURATION CHECK");
    println!("======================================================================");

    // Load configuration
    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    // Validate configuration
    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    // Show configuration summary
    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Payout Model: {}", config.payout_model);
    println!("  Payout Multiplier: {}x", config.payout_multiplier);
    println!("  Market Duration: {}s", config.market_duration_secs);
    println!("  Default Timeframe: {}", config.default_timeframe);
    println!("  Enforce Expiry: {}", config.enforce_expiry);
    println!("  Seed Demo: {}", config.seed_demo);
    println!("  Port: {}", config.port);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Serve the HTTP API until a shutdown signal arrives.
async fn cmd_serve(port_override: Option<u16>) -> anyhow::Result<()> {
    // Load configuration
    info!("Loading configuration...");
    let mut config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    // Override with CLI args if provided
    if let Some(port) = port_override {
        config.port = port;
    }

    let settings = config.market_settings().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    info!("Configuration loaded successfully");
    info!("Payout model: {:?}", settings.payout);
    info!("Market duration: {}", settings.market_duration);
    info!(
        "Expiry: {}",
        if settings.enforce_expiry { "ENFORCED" } else { "ADVISORY" }
    );

    // Metrics
    let prometheus = match metrics::install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Prometheus recorder not installed: {}", e);
            None
        }
    };
    metrics::init_metrics();

    // Market engine and collaborators
    let markets = MarketManager::new(settings);
    if config.seed_demo {
        seed_demo(&markets)?;
    }

    let whales = StaticWhaleDirectory::seeded();
    info!("Tracking {} whales", whales.len());

    let mut app_state = AppState::new(markets, whales);
    if let Some(handle) = prometheus {
        app_state = app_state.with_prometheus(handle);
    }

    // Start HTTP server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("Whale Shadow Tracker listening on {}", addr);

    axum::serve(listener, create_router(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
