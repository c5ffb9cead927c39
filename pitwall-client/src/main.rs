//! pitwall - sim-racing progression tracker client
//!
//! Command-line front end over the fetch client and readiness aggregator.
//!
//! ```text
//! pitwall [--base-url URL] [--api-key KEY] [--config PATH] [--log-level LEVEL] <COMMAND>
//!
//! readiness [--json]   Load driver/profile/tasks and print the readiness score
//! get <PATH>           Resilient GET against the backend, print status and body
//! ```
//!
//! Logs go to stderr so stdout stays machine-readable.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pitwall_client::{compute_readiness, FetchClient, FetchError, ReadinessLoader, RetryObserver};
use pitwall_common::config::{ConfigOverrides, PitwallConfig};
use pitwall_common::SessionContext;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "pitwall")]
#[command(about = "Sim-racing progression tracker client")]
#[command(version)]
struct Args {
    /// Backend base URL (e.g. https://racing.example.com/api)
    #[arg(long)]
    base_url: Option<String>,

    /// API key sent as X-API-Key
    #[arg(long)]
    api_key: Option<String>,

    /// Path to config.toml (default: platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Refresh readiness inputs and print the score
    Readiness {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// GET a backend path with retry on transient failure
    Get {
        /// Path relative to the base URL, or an absolute URL
        path: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(FetchError::Transport(detail)) = err.downcast_ref::<FetchError>() {
                error!(error = %detail, "Backend unreachable");
                eprintln!("Backend unreachable: {}", detail);
            } else {
                error!(error = %err, "Command failed");
                eprintln!("Error: {:#}", err);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let overrides = ConfigOverrides {
        base_url: args.base_url,
        api_key: args.api_key,
        log_level: args.log_level,
        config_path: args.config,
    };
    let config = PitwallConfig::resolve(&overrides).context("Failed to load configuration")?;

    init_tracing(&config.log_level);
    info!("Starting pitwall {}", env!("CARGO_PKG_VERSION"));
    config.log_summary();
    info!(base_url = %config.base_url, "Backend");

    let session = SessionContext::new(config.api_key.clone());
    let client = FetchClient::from_config(&config, session)?;

    match args.command {
        Command::Readiness { json } => readiness(&client, json).await,
        Command::Get { path } => get(&client, &path).await,
    }
}

fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Progress line on stderr for every retry
fn stderr_progress() -> Arc<dyn RetryObserver> {
    Arc::new(|attempt: u32, delay: Duration| {
        eprintln!(
            "Backend busy, retry {} in {:.0}s...",
            attempt,
            delay.as_secs_f64()
        );
    })
}

async fn readiness(client: &FetchClient, json: bool) -> Result<()> {
    let loader = ReadinessLoader::new(client).with_observer(stderr_progress());
    loader.refresh_all().await?;

    let view = compute_readiness(&client.session().snapshot().await);

    if json {
        let body = serde_json::json!({
            "score": view.score,
            "display": view.score_display(),
            "fill_percent": view.fill_percent,
            "note": view.note.message(),
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        println!("Readiness: {} ({}%)", view.score_display(), view.fill_percent);
        println!("{}", view.note);
    }
    Ok(())
}

async fn get(client: &FetchClient, path: &str) -> Result<()> {
    let observer = stderr_progress();
    let request = pitwall_client::ApiRequest::get(client.url(path));
    let response = client
        .resilient_request(request, Some(observer.as_ref()))
        .await?;

    println!("HTTP {}", response.status());
    println!("{}", response.text());

    if !response.status().is_success() {
        anyhow::bail!("Request failed with HTTP {}", response.status());
    }
    Ok(())
}
