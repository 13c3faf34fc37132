#![forbid(unsafe_code)]

//! `hermes-checklist` — checklist skill binary.
//!
//! Bootstraps configuration, connects to the MQTT broker, and runs the
//! subscriber and checklist reactor tasks until a shutdown signal arrives.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, EnvFilter};

use hermes_checklist::bus::mqtt::{run_subscriber, MqttBus};
use hermes_checklist::bus::MessageBus;
use hermes_checklist::config::{ConfigOverrides, GlobalConfig};
use hermes_checklist::orchestrator::reactor::{run_reactor, Reactor, SiteFilter};
use hermes_checklist::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "hermes-checklist", about = "Hermes checklist skill", version, long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// MQTT broker host.
    #[arg(long)]
    host: Option<String>,

    /// MQTT broker port.
    #[arg(long)]
    port: Option<u16>,

    /// MQTT username (falls back to `MQTT_USERNAME`).
    #[arg(long)]
    username: Option<String>,

    /// MQTT password (falls back to `MQTT_PASSWORD`).
    #[arg(long)]
    password: Option<String>,

    /// Hermes site id to answer (repeatable; default is every site).
    #[arg(long = "site-id")]
    site_ids: Vec<String>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format, args.debug)?;
    info!("hermes-checklist bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = match &args.config {
        Some(path) => GlobalConfig::load_from_path(path)?,
        None => GlobalConfig::default(),
    };
    config.apply_overrides(ConfigOverrides {
        host: args.host,
        port: args.port,
        username: args.username,
        password: args.password,
        site_ids: args.site_ids,
    })?;
    config.load_credentials()?;
    debug!(
        host = config.mqtt.host.as_str(),
        port = config.mqtt.port,
        site_ids = ?config.site_ids,
        "configuration loaded"
    );

    // ── Connect to the broker ───────────────────────────
    info!(
        host = config.mqtt.host.as_str(),
        port = config.mqtt.port,
        "connecting to mqtt broker"
    );
    let (bus, eventloop) = MqttBus::connect(&config.mqtt);
    let bus = Arc::new(bus);
    let (event_tx, event_rx) = mpsc::channel(config.channel_capacity);
    let ct = CancellationToken::new();

    // ── Start tasks ─────────────────────────────────────
    let subscriber_ct = ct.clone();
    let subscriber_client = bus.client().clone();
    let reconnect_delay = Duration::from_secs(config.mqtt.reconnect_delay_seconds);
    let subscriber_handle = tokio::spawn(async move {
        if let Err(err) = run_subscriber(
            subscriber_client,
            eventloop,
            event_tx,
            reconnect_delay,
            subscriber_ct,
        )
        .await
        {
            error!(%err, "mqtt subscriber failed");
        }
    });

    let reactor = Reactor::new(SiteFilter::new(config.site_ids.clone()));
    let publisher: Arc<dyn MessageBus> = bus.clone();
    let reactor_handle = tokio::spawn(run_reactor(reactor, event_rx, publisher, ct.clone()));

    info!("checklist skill ready");

    // ── Wait for shutdown signal ────────────────────────
    shutdown_signal().await;
    info!("shutdown signal received");

    if let Err(err) = bus.disconnect().await {
        debug!(%err, "mqtt disconnect request not delivered");
    }
    ct.cancel();

    let _ = tokio::join!(subscriber_handle, reactor_handle);
    info!("hermes-checklist shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat, debug: bool) -> Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
