//! cla-daemon binary.
//!
//! The forge and signing clients use blocking `reqwest`, which must be built
//! and dropped outside the async runtime. `main` therefore stays
//! synchronous: it builds both clients, then starts the Tokio runtime, and
//! keeps its own handles so the clients are dropped after the runtime has
//! stopped.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use cla_core::cla::ClaBot;
use cla_core::forge::{GitHubForge, PullRequestForge};
use cla_core::signing::{HttpSigningService, SigningService};
use cla_core::webhook::SignatureValidator;
use cla_daemon::{AppState, SharedState, load_config, router, secret_from_env};
use clap::Parser;
use tokio::signal::unix::{SignalKind, signal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// cla-daemon - keeps pull request CLA labels in sync
#[derive(Parser, Debug)]
#[command(name = "cla-daemon")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to bot configuration file
    #[arg(short, long, default_value = "cla.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log to file instead of stdout
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Listen address, overriding `daemon.listen_addr`
    #[arg(long)]
    listen: Option<String>,
}

fn init_tracing(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(log_file) = &args.log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .context("failed to open log file")?;

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(file)
                    .with_ansi(false),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args)?;

    let config = load_config(&args.config, args.listen.as_deref())?;
    let daemon = &config.daemon;

    let token = secret_from_env(&daemon.github_token_env)
        .with_context(|| format!("{} is not set", daemon.github_token_env))?;
    let validator = secret_from_env(&daemon.webhook_secret_env).map(SignatureValidator::new);
    if validator.is_none() {
        warn!(
            env = %daemon.webhook_secret_env,
            "webhook secret not set, webhook endpoint disabled"
        );
    }

    let forge: Arc<dyn PullRequestForge> = Arc::new(
        GitHubForge::new(&daemon.github_api_url, token).context("failed to create GitHub client")?,
    );
    let signing: Arc<dyn SigningService> =
        Arc::new(HttpSigningService::new().context("failed to create signing client")?);

    info!(
        repos = config.config_items.len(),
        api = %daemon.github_api_url,
        "loaded configuration"
    );

    let state = AppState::new(
        ClaBot::new(Arc::clone(&forge), Arc::clone(&signing)),
        config,
        validator,
    );

    let runtime = tokio::runtime::Runtime::new().context("failed to create Tokio runtime")?;
    let result = runtime.block_on(serve(state));
    drop(runtime);

    drop(signing);
    drop(forge);
    result
}

async fn serve(state: SharedState) -> Result<()> {
    let addr = state.config().daemon.listen_addr.clone();
    let webhook_path = state.config().daemon.webhook_path.clone();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(addr = %addr, path = %webhook_path, "webhook server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("webhook server error")?;

    info!("webhook server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
        (Err(e), _) | (_, Err(e)) => {
            warn!(error = %e, "failed to register signal handlers, falling back to ctrl-c");
            let _ = tokio::signal::ctrl_c().await;
            return;
        },
    };

    tokio::select! {
        _ = sigterm.recv() => {
            info!("Received SIGTERM");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT");
        }
    }
}
