//! Relay-mode WebSocket client.
//!
//! Handles the outbound connection to the hosted relay, decrypts inbound
//! frames and forwards plaintext to the application as [`RelayEvent`]s.
//!
//! Architecture:
//! - `RelayClient` owns the configuration and a handle to one worker task.
//! - The worker runs a reconnect loop: connect, receive until the socket
//!   closes or fails, report the transition, sleep a fixed backoff, retry.
//! - Status transitions and decrypted messages are sent on an `mpsc`
//!   channel; the consumer decides what to do with them.
//!
//! # State machine
//!
//! ```text
//!            start()
//! Idle ──────────────► Connecting ──ok──► Connected ──closed──┐
//!                          ▲   │                               │
//!                          │   └─failed──► Error ──┐           │
//!                          │                       ▼           ▼
//!                          └──── sleep 2 s ◄──── Disconnected ◄┘
//!
//! stop() from any state ends the loop; no further events are sent.
//! ```
//!
//! There is no exponential backoff and no retry limit: a human is waiting
//! for the pairing to come back, and the relay is cheap to reconnect to.
//!
//! [`dispatch`] is the consumer the host binary plugs into the channel.

pub mod dispatch;

pub use dispatch::{dispatch_event, run_dispatch};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use airtype_core::{parse_frame, relay_endpoint, RelayConfigError, RelayCryptoSession, RelayFrame};
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

type RelaySocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Configuration for the relay connection.
#[derive(Debug, Clone)]
pub struct RelayClientConfig {
    /// Relay base URL (`https://…`, `wss://…`, or a bare host).
    pub base_url: String,
    /// Shared password; empty means the default room.
    pub password: String,
    /// How long one receive wait may last before the stop flag is re-checked.
    pub receive_timeout: Duration,
    /// Pause between a disconnect and the next connection attempt.
    pub reconnect_interval: Duration,
}

impl Default for RelayClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            password: String::new(),
            receive_timeout: Duration::from_secs(30),
            reconnect_interval: Duration::from_secs(2),
        }
    }
}

/// Connection state reported to the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayStatus {
    Connecting,
    Connected,
    Error,
    Disconnected,
}

impl RelayStatus {
    /// Lowercase tag, as shown to the user.
    pub fn tag(self) -> &'static str {
        match self {
            RelayStatus::Connecting => "connecting",
            RelayStatus::Connected => "connected",
            RelayStatus::Error => "error",
            RelayStatus::Disconnected => "disconnected",
        }
    }
}

/// Events emitted by the relay worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    /// A state transition with a human-readable message.
    Status { status: RelayStatus, message: String },
    /// Decrypted text from the phone.
    Message(String),
}

struct Worker {
    running: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    handle: JoinHandle<()>,
}

/// Persistent, self-reconnecting relay connection.
pub struct RelayClient {
    config: RelayClientConfig,
    session: Arc<RelayCryptoSession>,
    endpoint: String,
    events: mpsc::Sender<RelayEvent>,
    worker: Mutex<Option<Worker>>,
}

impl RelayClient {
    /// Validates the configuration and derives the channel.
    ///
    /// # Errors
    ///
    /// Returns [`RelayConfigError::MissingUrl`] when no relay URL is set.
    pub fn new(
        config: RelayClientConfig,
        events: mpsc::Sender<RelayEvent>,
    ) -> Result<Self, RelayConfigError> {
        let session = RelayCryptoSession::derive(&config.password);
        let endpoint = relay_endpoint(&config.base_url, session.channel_id())?;
        Ok(Self {
            config,
            session: Arc::new(session),
            endpoint,
            events,
            worker: Mutex::new(None),
        })
    }

    /// Public channel identifier derived from the password.
    pub fn channel_id(&self) -> &str {
        self.session.channel_id()
    }

    /// Full WebSocket URL, including the channel path.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn worker(&self) -> MutexGuard<'_, Option<Worker>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawns the worker task.  Returns `false` if it was already running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) -> bool {
        let mut slot = self.worker();
        if let Some(worker) = slot.as_ref() {
            if worker.running.load(Ordering::SeqCst) && !worker.handle.is_finished() {
                return false;
            }
        }

        let running = Arc::new(AtomicBool::new(true));
        let shutdown = Arc::new(Notify::new());
        let ctx = WorkerContext {
            endpoint: self.endpoint.clone(),
            session: Arc::clone(&self.session),
            receive_timeout: self.config.receive_timeout,
            reconnect_interval: self.config.reconnect_interval,
            events: self.events.clone(),
            running: Arc::clone(&running),
            shutdown: Arc::clone(&shutdown),
        };
        info!(channel = %short_id(self.channel_id()), "starting relay client");
        let handle = tokio::spawn(ctx.run());
        *slot = Some(Worker {
            running,
            shutdown,
            handle,
        });
        true
    }

    /// Asks the worker to stop and close any live connection.
    ///
    /// Does not wait for the worker to finish.
    pub fn stop(&self) {
        if let Some(worker) = self.worker().take() {
            worker.running.store(false, Ordering::SeqCst);
            worker.shutdown.notify_one();
            info!("relay client stopping");
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker()
            .as_ref()
            .is_some_and(|w| w.running.load(Ordering::SeqCst) && !w.handle.is_finished())
    }
}

impl Drop for RelayClient {
    fn drop(&mut self) {
        self.stop();
    }
}

fn short_id(channel_id: &str) -> &str {
    channel_id.get(..8).unwrap_or(channel_id)
}

// ── Worker ────────────────────────────────────────────────────────────────────

struct WorkerContext {
    endpoint: String,
    session: Arc<RelayCryptoSession>,
    receive_timeout: Duration,
    reconnect_interval: Duration,
    events: mpsc::Sender<RelayEvent>,
    running: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
}

impl WorkerContext {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn emit(&self, event: RelayEvent) {
        if self.events.send(event).await.is_err() {
            // Nobody is listening any more.
            self.running.store(false, Ordering::SeqCst);
        }
    }

    async fn status(&self, status: RelayStatus, message: impl Into<String>) {
        self.emit(RelayEvent::Status {
            status,
            message: message.into(),
        })
        .await;
    }

    async fn run(self) {
        while self.is_running() {
            self.status(RelayStatus::Connecting, "Connecting to relay…")
                .await;

            let connected = tokio::select! {
                _ = self.shutdown.notified() => break,
                result = connect_async(self.endpoint.as_str()) => result,
            };

            match connected {
                Ok((socket, _response)) => {
                    info!("relay connected");
                    self.status(RelayStatus::Connected, "Connected to relay").await;
                    if let Err(e) = self.receive_loop(socket).await {
                        warn!("relay connection failed: {e}");
                        self.status(RelayStatus::Error, format!("Connection failed: {e}"))
                            .await;
                    }
                }
                Err(e) => {
                    warn!("relay connect failed: {e}");
                    self.status(RelayStatus::Error, format!("Connection failed: {e}"))
                        .await;
                }
            }

            if !self.is_running() {
                break;
            }
            self.status(RelayStatus::Disconnected, "Disconnected, reconnecting...")
                .await;

            tokio::select! {
                _ = self.shutdown.notified() => break,
                _ = time::sleep(self.reconnect_interval) => {}
            }
        }
        debug!("relay worker exited");
    }

    /// Receives frames until the peer closes, the socket fails, or stop is requested.
    async fn receive_loop(&self, mut socket: RelaySocket) -> Result<(), tungstenite::Error> {
        loop {
            if !self.is_running() {
                let _ = socket.close(None).await;
                return Ok(());
            }

            let next = tokio::select! {
                _ = self.shutdown.notified() => {
                    let _ = socket.close(None).await;
                    return Ok(());
                }
                next = time::timeout(self.receive_timeout, socket.next()) => next,
            };

            match next {
                // Idle; loop around to re-check the stop flag.
                Err(_elapsed) => continue,
                Ok(None) => return Ok(()),
                Ok(Some(Err(e))) => return Err(e),
                Ok(Some(Ok(Message::Text(text)))) => self.handle_frame(&text).await,
                Ok(Some(Ok(Message::Close(frame)))) => {
                    debug!(?frame, "relay closed the connection");
                    return Ok(());
                }
                Ok(Some(Ok(_))) => {}
            }
        }
    }

    async fn handle_frame(&self, raw: &str) {
        let sealed = match parse_frame(raw) {
            Ok(RelayFrame::Text(sealed)) => sealed,
            Ok(RelayFrame::Other(kind)) => {
                debug!(kind = %kind, "ignoring relay frame");
                return;
            }
            Err(e) => {
                debug!("dropping malformed relay frame: {e}");
                return;
            }
        };

        match self.session.decrypt(&sealed.iv, &sealed.data) {
            Ok(text) => self.emit(RelayEvent::Message(text)).await,
            Err(e) => warn!("dropping relay frame that failed to decrypt: {e}"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> RelayClientConfig {
        RelayClientConfig {
            base_url: url.to_string(),
            password: "pw".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config_timings() {
        let cfg = RelayClientConfig::default();
        assert_eq!(cfg.receive_timeout, Duration::from_secs(30));
        assert_eq!(cfg.reconnect_interval, Duration::from_secs(2));
    }

    #[test]
    fn test_status_tags() {
        assert_eq!(RelayStatus::Connecting.tag(), "connecting");
        assert_eq!(RelayStatus::Connected.tag(), "connected");
        assert_eq!(RelayStatus::Error.tag(), "error");
        assert_eq!(RelayStatus::Disconnected.tag(), "disconnected");
    }

    #[test]
    fn test_missing_url_is_rejected_synchronously() {
        let (tx, _rx) = mpsc::channel(4);
        let result = RelayClient::new(config(""), tx);
        assert!(matches!(result, Err(RelayConfigError::MissingUrl)));
    }

    #[test]
    fn test_endpoint_contains_channel_id() {
        let (tx, _rx) = mpsc::channel(4);
        let client = RelayClient::new(config("https://relay.example.com"), tx).unwrap();
        assert_eq!(
            client.endpoint(),
            format!("wss://relay.example.com/ws/{}", client.channel_id())
        );
    }

    #[test]
    fn test_short_id_handles_short_input() {
        assert_eq!(short_id("abc"), "abc");
        assert_eq!(short_id("0123456789"), "01234567");
    }

    #[tokio::test]
    async fn test_start_twice_is_a_noop_and_stop_ends_running() {
        // Arrange
        let (tx, _rx) = mpsc::channel(64);
        let client = RelayClient::new(
            RelayClientConfig {
                reconnect_interval: Duration::from_secs(60),
                ..config("ws://127.0.0.1:1")
            },
            tx,
        )
        .unwrap();

        // Act
        let first = client.start();
        let second = client.start();
        client.stop();

        // Assert
        assert!(first);
        assert!(!second);
        assert!(!client.is_running());
    }

    #[tokio::test]
    async fn test_stop_without_start_is_harmless() {
        let (tx, _rx) = mpsc::channel(4);
        let client = RelayClient::new(config("ws://127.0.0.1:1"), tx).unwrap();
        client.stop();
        assert!(!client.is_running());
    }
}
