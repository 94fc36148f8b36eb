//! AirType desktop host entry point.
//!
//! Loads the configuration, wires the key injector, clipboard bridge and
//! mute controller together, then runs one of the two transport modes until
//! Ctrl+C.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config() + CLI overrides
//!  └─ build RequestHandler (KeyInjector, ClipboardBridge, AudioMuteController)
//!       └─ injector and mute controller share one EmissionGate
//!  └─ mode
//!       ├─ lan   → run_server()     (axum, POST /type, /mute, /mute_immediate)
//!       └─ relay → RelayClient::start() + run_dispatch()
//! ```
//!
//! # Configuration precedence (for beginners)
//!
//! Every setting starts from the built-in default, is overwritten by the
//! config file if one exists, and finally by any command-line flag or
//! `AIRTYPE_*` environment variable.  `--save-config` writes the merged
//! result back, so a flag can be made permanent by running once with it.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use airtype_core::SharedPasteConfig;
use airtype_host::application::clipboard_bridge::ClipboardBridge;
use airtype_host::application::handle_request::RequestHandler;
use airtype_host::application::inject_text::KeyInjector;
use airtype_host::application::mute::{AudioMuteController, MuteState};
use airtype_host::infrastructure::audio::platform_mixer;
use airtype_host::infrastructure::clipboard::default_bridge;
use airtype_host::infrastructure::http_server::run_server;
use airtype_host::infrastructure::input_emulation::platform_emitters;
use airtype_host::infrastructure::relay::{run_dispatch, RelayClient, RelayClientConfig};
use airtype_host::infrastructure::storage::config::{
    config_file_path, load_config, save_config, AppConfig, LanConfig, Mode, RelaySettings,
};

/// Which key combo triggers the paste.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PasteCombo {
    /// Shift+Insert; works in terminals and consoles.
    ShiftInsert,
    /// Ctrl+V (Cmd+V on macOS).
    CtrlV,
}

#[derive(Debug, Parser)]
#[command(name = "airtype", version, about = "Use a phone browser as a wireless keyboard")]
struct Cli {
    /// Config file to read (and write with --save-config).
    #[arg(long, env = "AIRTYPE_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, value_enum, env = "AIRTYPE_MODE")]
    mode: Option<Mode>,

    /// LAN mode bind address.
    #[arg(long, env = "AIRTYPE_BIND")]
    bind: Option<String>,

    /// LAN mode port.
    #[arg(long, env = "AIRTYPE_PORT")]
    port: Option<u16>,

    /// Seconds without a LAN request before an app-owned mute is released
    /// (0 disables).
    #[arg(long, env = "AIRTYPE_MUTE_IDLE_TIMEOUT")]
    mute_idle_timeout: Option<u64>,

    /// Relay base URL, e.g. https://relay.example.com
    #[arg(long, env = "AIRTYPE_RELAY_URL")]
    relay_url: Option<String>,

    /// Relay password shared with the phone.
    #[arg(long, env = "AIRTYPE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[arg(long, value_enum, env = "AIRTYPE_PASTE_COMBO")]
    paste_combo: Option<PasteCombo>,

    /// Restore the previous clipboard content after each paste.
    #[arg(long, env = "AIRTYPE_PRESERVE_CLIPBOARD")]
    preserve_clipboard: Option<bool>,

    /// error, warn, info, debug or trace.  RUST_LOG wins when set.
    #[arg(long, env = "AIRTYPE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Write the effective configuration to the config file and continue.
    #[arg(long)]
    save_config: bool,
}

impl Cli {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(mode) = self.mode {
            config.general.mode = mode;
        }
        if let Some(level) = &self.log_level {
            config.general.log_level = level.clone();
        }
        if let Some(bind) = &self.bind {
            config.lan.bind_address = bind.clone();
        }
        if let Some(port) = self.port {
            config.lan.port = port;
        }
        if let Some(secs) = self.mute_idle_timeout {
            config.lan.mute_idle_timeout_secs = secs;
        }
        if let Some(url) = &self.relay_url {
            config.relay.url = url.clone();
        }
        if let Some(password) = &self.password {
            config.relay.password = password.clone();
        }
        if let Some(combo) = self.paste_combo {
            config.paste.use_secondary_combo = combo == PasteCombo::ShiftInsert;
        }
        if let Some(preserve) = self.preserve_clipboard {
            config.paste.preserve_clipboard = preserve;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Configuration ─────────────────────────────────────────────────────────
    let config_path = match &cli.config {
        Some(path) => Some(path.clone()),
        None => config_file_path().ok(),
    };
    let mut config = match &config_path {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::default(),
    };
    cli.apply(&mut config);

    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level)),
        )
        .init();

    info!("AirType host starting");
    match &config_path {
        Some(path) => debug!("config file: {}", path.display()),
        None => warn!("no platform config directory; using built-in defaults"),
    }

    if cli.save_config {
        let path = config_path
            .as_deref()
            .context("--save-config needs --config on this platform")?;
        save_config(path, &config)
            .with_context(|| format!("failed to save config to {}", path.display()))?;
        info!("configuration saved to {}", path.display());
    }

    // ── Injection and mute stack ──────────────────────────────────────────────
    let emitters = platform_emitters();
    let mute_fallback = emitters.first().cloned();
    let clipboard: Arc<ClipboardBridge> = Arc::new(default_bridge());
    info!(clipboard = ?clipboard.backend_names(), "clipboard backends ready");
    let injector = Arc::new(KeyInjector::new(emitters, clipboard));
    let mute_controller = Arc::new(
        AudioMuteController::new(platform_mixer(), mute_fallback)
            .with_gate(injector.emission_gate()),
    );
    let handler = Arc::new(RequestHandler::new(
        Arc::clone(&injector),
        Arc::new(SharedPasteConfig::new(config.paste)),
        Arc::new(MuteState::default()),
        mute_controller,
    ));
    info!(
        emitters = ?injector.emitter_names(),
        secondary_combo = config.paste.use_secondary_combo,
        preserve_clipboard = config.paste.preserve_clipboard,
        "paste settings"
    );

    // ── Transport ─────────────────────────────────────────────────────────────
    match config.general.mode {
        Mode::Lan => run_lan(&config.lan, handler).await,
        Mode::Relay => run_relay(&config.relay, handler).await,
    }
}

async fn run_lan(lan: &LanConfig, handler: Arc<RequestHandler>) -> anyhow::Result<()> {
    let addr = lan
        .socket_addr()
        .with_context(|| format!("invalid LAN bind address {:?}", lan.bind_address))?;

    run_server(addr, handler, lan.mute_idle_timeout(), shutdown_signal()).await
}

async fn run_relay(relay: &RelaySettings, handler: Arc<RequestHandler>) -> anyhow::Result<()> {
    let (tx, rx) = mpsc::channel(64);
    let client = RelayClient::new(
        RelayClientConfig {
            base_url: relay.url.clone(),
            password: relay.password.clone(),
            ..Default::default()
        },
        tx,
    )
    .context("cannot start relay mode")?;

    info!(endpoint = client.endpoint(), "relay mode");
    client.start();

    run_dispatch(rx, handler, shutdown_signal()).await;

    client.stop();
    info!("AirType host stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
