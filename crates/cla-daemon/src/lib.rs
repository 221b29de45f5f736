//! cla-daemon - webhook server for the CLA bot.
//!
//! Receives GitHub deliveries, verifies their signature, filters them and
//! runs the reconciliation pass on Tokio's blocking pool.
//!
//! # Routes
//!
//! - `POST <daemon.webhook_path>`: GitHub webhook endpoint
//! - `GET /healthz`: liveness check

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use cla_core::cla::ClaBot;
use cla_core::config::BotConfiguration;
use cla_core::webhook::{
    ClaEvent, DELIVERY_HEADER, EVENT_HEADER, SIGNATURE_HEADER, SignatureValidator, WebhookError,
    filter,
};
use secrecy::SecretString;
use tracing::{debug, error, info};

/// Shared state behind every route.
#[derive(Debug)]
pub struct AppState {
    bot: ClaBot,
    config: Arc<BotConfiguration>,
    validator: Option<SignatureValidator>,
}

/// Reference-counted [`AppState`].
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Creates the state. Without a validator the webhook endpoint answers
    /// 404.
    #[must_use]
    pub fn new(
        bot: ClaBot,
        config: BotConfiguration,
        validator: Option<SignatureValidator>,
    ) -> SharedState {
        Arc::new(Self {
            bot,
            config: Arc::new(config),
            validator,
        })
    }

    /// Returns the loaded configuration.
    #[must_use]
    pub fn config(&self) -> &BotConfiguration {
        &self.config
    }
}

/// Builds the HTTP router.
pub fn router(state: SharedState) -> Router {
    let webhook_path = state.config.daemon.webhook_path.clone();
    Router::new()
        .route(&webhook_path, post(receive))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Liveness check.
pub async fn healthz() -> &'static str {
    "ok"
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Handles one webhook delivery.
///
/// Answers `200 ignored` for deliveries that do not start a pass and
/// `200 reconciled` once a pass completes.
///
/// # Errors
///
/// Returns a [`WebhookError`] when the endpoint is disabled, the signature
/// does not verify, the event header is missing, or the pass fails.
pub async fn receive(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), WebhookError> {
    let validator = state.validator.as_ref().ok_or(WebhookError::Disabled)?;
    let signature = header(&headers, SIGNATURE_HEADER).ok_or(WebhookError::MissingSignature)?;
    validator.verify(&body, signature)?;

    let event_name = header(&headers, EVENT_HEADER).ok_or(WebhookError::MissingEventType)?;
    let delivery = header(&headers, DELIVERY_HEADER).unwrap_or("-").to_string();

    let event = ClaEvent::decode(event_name, &body);
    let Some(request) = filter(&event) else {
        debug!(delivery = %delivery, event = event.name(), "ignored delivery");
        return Ok((StatusCode::OK, "ignored"));
    };

    info!(
        delivery = %delivery,
        event = event.name(),
        org = %request.pr.org,
        repo = %request.pr.repo,
        pr = request.pr.number,
        explicitly_triggered = request.explicitly_triggered,
        "starting reconciliation"
    );

    let bot = state.bot.clone();
    let config = Arc::clone(&state.config);
    let outcome = tokio::task::spawn_blocking(move || bot.handle(&config, &request))
        .await
        .map_err(|e| WebhookError::Internal(format!("reconciliation task failed: {e}")))?;

    match outcome {
        Ok(_) => Ok((StatusCode::OK, "reconciled")),
        Err(e) => {
            error!(delivery = %delivery, error = %e, "reconciliation failed");
            Err(WebhookError::Internal(e.to_string()))
        },
    }
}

/// Loads the configuration file and applies the `--listen` override.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or fails validation.
pub fn load_config(path: &Path, listen: Option<&str>) -> Result<BotConfiguration> {
    let mut config = BotConfiguration::from_file(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    if let Some(listen) = listen {
        config.daemon.listen_addr = listen.to_string();
    }
    Ok(config)
}

/// Reads a secret from the environment. Unset and empty values are `None`.
#[must_use]
pub fn secret_from_env(name: &str) -> Option<SecretString> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(SecretString::from)
}
