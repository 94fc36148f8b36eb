//! Applies relay events to the host.
//!
//! ```text
//! RelayEvent::Message(text)                 → paste on the blocking pool
//! RelayEvent::Status(Error | Disconnected)  → release app-owned mute
//! RelayEvent::Status(other)                 → log
//! ```
//!
//! The phone can only unmute the desktop while it is connected.  When the
//! link drops, the mute it asked for would otherwise outlive it, so every
//! error or disconnect gives the mute back.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::application::handle_request::RequestHandler;

use super::{RelayEvent, RelayStatus};

/// Handles one event from the relay worker.
pub async fn dispatch_event(handler: &Arc<RequestHandler>, event: RelayEvent) {
    match event {
        RelayEvent::Message(text) => {
            let handler = Arc::clone(handler);
            match tokio::task::spawn_blocking(move || handler.handle_relay_text(&text)).await {
                Ok(true) => {}
                Ok(false) => warn!("relay message was not pasted"),
                Err(e) => warn!("relay paste task failed: {e}"),
            }
        }
        RelayEvent::Status { status, message } => {
            info!(status = status.tag(), "{message}");
            if matches!(status, RelayStatus::Error | RelayStatus::Disconnected) {
                release_mute(handler).await;
            }
        }
    }
}

/// Dispatches events until the channel closes or `shutdown` resolves.
///
/// Events are handled one at a time, in arrival order.  An app-owned mute is
/// released before returning.
pub async fn run_dispatch(
    mut events: mpsc::Receiver<RelayEvent>,
    handler: Arc<RequestHandler>,
    shutdown: impl Future<Output = ()>,
) {
    tokio::pin!(shutdown);
    loop {
        let event = tokio::select! {
            _ = &mut shutdown => break,
            event = events.recv() => event,
        };
        let Some(event) = event else { break };
        dispatch_event(&handler, event).await;
    }
    release_mute(&handler).await;
}

async fn release_mute(handler: &Arc<RequestHandler>) {
    let handler = Arc::clone(handler);
    if let Err(e) = tokio::task::spawn_blocking(move || handler.release_mute()).await {
        warn!("mute cleanup did not complete: {e}");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
