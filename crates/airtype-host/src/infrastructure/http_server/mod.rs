//! LAN-mode HTTP server built on `axum`.
//!
//! Routes:
//!
//! ```text
//! GET  /                 control page
//! POST /type             {"text"?, "enter"?, "backspace"?, "undo"?} → {"success"}
//! POST /mute             {"enabled"}                                  → {"success", "enabled"}
//! POST /mute_immediate   {"mute"}                                     → {"success"}
//! ```
//!
//! Every POST answers `200 OK` with a JSON body.  A body that is not valid
//! JSON for its route, or a handler that panics, produces the route's
//! failure body instead of an HTTP error, so the phone page only ever needs
//! to look at `success`.
//!
//! # Why `spawn_blocking`? (for beginners)
//!
//! A paste holds the calling thread through several fixed sleeps while the
//! OS catches up with the clipboard and the synthetic key events.  Running
//! that directly inside an async handler would stall one of Tokio's worker
//! threads, and with it every other task scheduled there.  The blocking pool
//! exists for exactly this kind of work.
//!
//! # Idle mute release
//!
//! When configured, [`run_server`] also runs a small background task that
//! periodically asks the handler to undo an app-owned mute once the phone
//! has been silent for the idle timeout.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use tokio::net::TcpListener;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use airtype_core::domain::{
    MuteImmediateRequest, MuteImmediateResponse, MutePolicyRequest, MutePolicyResponse,
    TypeRequest, TypeResponse,
};

use crate::application::handle_request::RequestHandler;

const INDEX_HTML: &str = include_str!("index.html");

/// Builds the router with all LAN routes bound to `handler`.
pub fn router(handler: Arc<RequestHandler>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/type", post(type_text))
        .route("/mute", post(mute_policy))
        .route("/mute_immediate", post(mute_immediate))
        .with_state(handler)
}

/// Binds `addr` and serves until `shutdown` resolves.
///
/// With `mute_idle` set, an app-owned mute is released after that long
/// without a request.  It is always released once the server has stopped.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn run_server(
    addr: SocketAddr,
    handler: Arc<RequestHandler>,
    mute_idle: Option<Duration>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind LAN server to {addr}"))?;
    let local = listener.local_addr().unwrap_or(addr);
    info!("LAN server listening on http://{local}");

    let watchdog = mute_idle.map(|idle| {
        debug!(idle_secs = idle.as_secs(), "idle mute release enabled");
        tokio::spawn(release_idle_mute(Arc::clone(&handler), idle))
    });

    let result = axum::serve(listener, router(Arc::clone(&handler)))
        .with_graceful_shutdown(shutdown)
        .await
        .context("LAN server failed");

    if let Some(watchdog) = watchdog {
        watchdog.abort();
    }

    let cleanup = Arc::clone(&handler);
    if let Err(e) = tokio::task::spawn_blocking(move || cleanup.release_mute()).await {
        warn!("mute cleanup did not complete: {e}");
    }
    info!("LAN server stopped");
    result
}

/// Checks for an idle phone a few times per timeout, forever.
async fn release_idle_mute(handler: Arc<RequestHandler>, idle: Duration) {
    let mut ticker = tokio::time::interval((idle / 4).max(Duration::from_millis(10)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let handler = Arc::clone(&handler);
        if let Err(e) =
            tokio::task::spawn_blocking(move || handler.release_mute_if_idle(idle)).await
        {
            warn!("idle mute check did not complete: {e}");
        }
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────────

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn type_text(State(handler): State<Arc<RequestHandler>>, body: Bytes) -> Json<TypeResponse> {
    dispatch(handler, &body, "type", TypeResponse::failure(), |h, req: TypeRequest| {
        h.handle_type(&req)
    })
    .await
}

async fn mute_policy(
    State(handler): State<Arc<RequestHandler>>,
    body: Bytes,
) -> Json<MutePolicyResponse> {
    dispatch(
        handler,
        &body,
        "mute",
        MutePolicyResponse::failure(),
        |h, req: MutePolicyRequest| h.handle_mute_policy(req),
    )
    .await
}

async fn mute_immediate(
    State(handler): State<Arc<RequestHandler>>,
    body: Bytes,
) -> Json<MuteImmediateResponse> {
    dispatch(
        handler,
        &body,
        "mute_immediate",
        MuteImmediateResponse::failure(),
        |h, req: MuteImmediateRequest| h.handle_mute_immediate(req),
    )
    .await
}

/// Parses `body`, runs `f` on the blocking pool, and folds every failure
/// into `failure`.
async fn dispatch<Req, Resp, F>(
    handler: Arc<RequestHandler>,
    body: &[u8],
    route: &'static str,
    failure: Resp,
    f: F,
) -> Json<Resp>
where
    Req: DeserializeOwned + Send + 'static,
    Resp: Send + 'static,
    F: FnOnce(&RequestHandler, Req) -> Resp + Send + 'static,
{
    let request: Req = match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(e) => {
            warn!(route, "rejecting malformed request body: {e}");
            return Json(failure);
        }
    };

    match tokio::task::spawn_blocking(move || f(&handler, request)).await {
        Ok(response) => Json(response),
        Err(e) => {
            warn!(route, "request handler did not complete: {e}");
            Json(failure)
        }
    }
}
