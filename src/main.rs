//! Service B web front entry point.

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use service_b::api::{create_router, AppState};
use service_b::config::Config;
use service_b::metrics;
use service_b::upstream::ServiceAClient;
use service_b::utils::shutdown_signal;
use service_b::view::Templates;

/// Service B web front.
#[derive(Parser, Debug)]
#[command(name = "service-b")]
#[command(about = "Renders a page with data fetched from Service A")]
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
    /// Serve the web app (default).
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Fetch once from Service A and print the payload.
    Fetch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Config is needed before logging to honour RUST_LOG and LOG_JSON.
    let config = Config::load();
    init_tracing(args.verbose, config.as_ref().ok());

    let mut config = config.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(&config),
        Some(Command::Fetch) => cmd_fetch(&config).await,
        Some(Command::Serve { port }) => {
            if let Some(port) = port.or(args.port) {
                config.port = port;
            }
            cmd_serve(config).await
        }
        None => {
            if let Some(port) = args.port {
                config.port = port;
            }
            cmd_serve(config).await
        }
    }
}

fn init_tracing(verbose: bool, config: Option<&Config>) {
    let filter = if verbose {
        EnvFilter::new("service_b=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(config.map_or("info", |c| c.rust_log.as_str())))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let json = config.is_some_and(|c| c.log_json);
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Check configuration validity.
fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("SERVICE B - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    print!("Loading templates... ");
    match Templates::load(config.template_dir.as_deref()) {
        Ok(_) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Template loading failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Service A URL: {}", config.upstream_address());
    println!("  Listen Port: {}", config.port);
    println!(
        "  Templates: {}",
        config.template_dir.as_deref().unwrap_or("built-in")
    );
    println!("  Log Format: {}", if config.log_json { "json" } else { "text" });
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Fetch once from Service A, without the fallback.
async fn cmd_fetch(config: &Config) -> anyhow::Result<()> {
    let address = config.upstream_address();
    let client = ServiceAClient::with_default_timeout()?;

    println!("Fetching {}...", address);

    match client.fetch(&address).await {
        Ok(payload) => {
            println!("{}", serde_json::to_string_pretty(&payload)?);
            Ok(())
        }
        Err(e) => {
            println!("FAILED ({})", e.kind());
            println!("  Error: {}", e);
            Err(e.into())
        }
    }
}

/// Run the web app until a shutdown signal arrives.
async fn cmd_serve(config: Config) -> anyhow::Result<()> {
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    info!("Configuration loaded successfully");
    info!("Service A URL: {}", config.upstream_address());

    let templates = Templates::load(config.template_dir.as_deref())?;
    let client = ServiceAClient::with_default_timeout()?;

    let port = config.port;
    let mut app_state = AppState::new(config, client, templates);

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            metrics::init_metrics();
            let upkeep = handle.clone();
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    upkeep.run_upkeep();
                }
            });
            app_state = app_state.with_prometheus(handle);
        }
        Err(e) => warn!("Metrics disabled, failed to install recorder: {}", e),
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, create_router(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
