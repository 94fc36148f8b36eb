//! RequestHandler: the LAN API semantics, independent of the HTTP framework.
//!
//! Every method is synchronous and may block for the duration of the paste
//! settle intervals (a few hundred milliseconds).  The HTTP layer is
//! responsible for running them off the async executor.
//!
//! No method returns an error: failures are logged and turned into the
//! uniform `{"success": false}` answer so that one bad request can never
//! take down the listener.
//!
//! # Idle release
//!
//! The phone page unmutes when its text field loses focus.  If the phone
//! locks or drops off the network first, that request never arrives.  Every
//! LAN request records the time it was seen, and
//! [`RequestHandler::release_mute_if_idle`] lets the server undo an owned
//! mute once the phone has been quiet for long enough.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use airtype_core::domain::{
    MuteImmediateRequest, MuteImmediateResponse, MutePolicyRequest, MutePolicyResponse,
    TypeRequest, TypeResponse,
};
use airtype_core::{InjectionRequest, SharedPasteConfig};
use tracing::{debug, info, warn};

use super::inject_text::KeyInjector;
use super::mute::{AudioMuteController, MuteState};

/// Shared state behind every LAN request.
pub struct RequestHandler {
    injector: Arc<KeyInjector>,
    paste_config: Arc<SharedPasteConfig>,
    mute_state: Arc<MuteState>,
    mute_controller: Arc<AudioMuteController>,
    last_activity: Mutex<Instant>,
}

impl RequestHandler {
    pub fn new(
        injector: Arc<KeyInjector>,
        paste_config: Arc<SharedPasteConfig>,
        mute_state: Arc<MuteState>,
        mute_controller: Arc<AudioMuteController>,
    ) -> Self {
        Self {
            injector,
            paste_config,
            mute_state,
            mute_controller,
            last_activity: Mutex::new(Instant::now()),
        }
    }

    /// `POST /type`.
    ///
    /// Control flags short-circuit before any clipboard access; a body with
    /// no flag and no text fails.
    pub fn handle_type(&self, request: &TypeRequest) -> TypeResponse {
        self.touch();
        let Some(injection) = request.to_injection() else {
            debug!("type request carried nothing to inject");
            return TypeResponse::failure();
        };

        match &injection {
            InjectionRequest::Text(text) => {
                debug!(chars = text.chars().count(), "type request: text")
            }
            other => debug!(?other, "type request: control key"),
        }

        match self.injector.inject(&injection, self.paste_config.snapshot()) {
            Ok(()) => TypeResponse::new(true),
            Err(e) => {
                warn!("type request failed: {e}");
                TypeResponse::failure()
            }
        }
    }

    /// `POST /mute`: stores the auto-mute policy flag and echoes it.
    pub fn handle_mute_policy(&self, request: MutePolicyRequest) -> MutePolicyResponse {
        self.touch();
        self.mute_state.set_auto_mute_enabled(request.enabled);
        MutePolicyResponse {
            success: true,
            enabled: Some(self.mute_state.auto_mute_enabled()),
        }
    }

    /// `POST /mute_immediate`: mutes or unmutes system output now.
    pub fn handle_mute_immediate(&self, request: MuteImmediateRequest) -> MuteImmediateResponse {
        self.touch();
        if !self.mute_controller.is_supported() {
            return MuteImmediateResponse::unsupported();
        }
        MuteImmediateResponse::new(self.mute_state.request(request.mute, &self.mute_controller))
    }

    /// Relay-mode message: pastes `text` with the current paste settings.
    pub fn handle_relay_text(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        match self.injector.paste(text, self.paste_config.snapshot()) {
            Ok(()) => {
                debug!(preview = %preview(text), "pasted relay message");
                true
            }
            Err(e) => {
                warn!("relay paste failed: {e}");
                false
            }
        }
    }

    /// Undoes an app-owned mute; called when the client goes away.
    pub fn release_mute(&self) -> bool {
        self.mute_state.release(&self.mute_controller)
    }

    /// Releases an app-owned mute if no LAN request arrived for `idle`.
    ///
    /// Returns `true` when a release was attempted.
    pub fn release_mute_if_idle(&self, idle: Duration) -> bool {
        self.release_mute_if_idle_at(Instant::now(), idle)
    }

    fn release_mute_if_idle_at(&self, now: Instant, idle: Duration) -> bool {
        if !self.mute_state.muted_by_app() {
            return false;
        }
        let last = *self
            .last_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let quiet = now.saturating_duration_since(last);
        if quiet < idle {
            return false;
        }
        info!(quiet_secs = quiet.as_secs(), "phone went quiet, releasing app-owned mute");
        self.release_mute();
        true
    }

    fn touch(&self) {
        *self
            .last_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    pub fn mute_state(&self) -> &MuteState {
        &self.mute_state
    }

    pub fn paste_config(&self) -> &SharedPasteConfig {
        &self.paste_config
    }
}

const PREVIEW_CHARS: usize = 30;

/// First few characters of `text`, for debug logs.
fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let mut out: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::clipboard_bridge::ClipboardBridge;
    use crate::application::inject_text::InjectionTimings;
    use crate::application::key_sequence::{ComboTimings, KeyEmitter};
    use crate::infrastructure::clipboard::mock::MockClipboard;
    use crate::infrastructure::input_emulation::mock::MockKeyEmitter;
    use airtype_core::{Key, PasteConfig};

    struct Fixture {
        emitter: Arc<MockKeyEmitter>,
        clipboard: Arc<MockClipboard>,
        handler: RequestHandler,
    }

    fn fixture(controller: AudioMuteController, emitter: Arc<MockKeyEmitter>) -> Fixture {
        let clipboard = Arc::new(MockClipboard::new());
        let bridge = Arc::new(ClipboardBridge::new(vec![Box::new(Arc::clone(&clipboard))]));
        let injector = KeyInjector::new(vec![emitter.clone() as Arc<dyn KeyEmitter>], bridge)
            .with_timings(InjectionTimings::zero());
        let handler = RequestHandler::new(
            Arc::new(injector),
            Arc::new(SharedPasteConfig::new(PasteConfig::default())),
            Arc::new(MuteState::default()),
            Arc::new(controller),
        );
        Fixture {
            emitter,
            clipboard,
            handler,
        }
    }

    fn with_key_mute() -> Fixture {
        let emitter = Arc::new(MockKeyEmitter::new());
        let controller =
            AudioMuteController::new(None, Some(emitter.clone() as Arc<dyn KeyEmitter>))
                .with_timings(ComboTimings::zero());
        fixture(controller, emitter)
    }

    fn type_req(json: &str) -> TypeRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_empty_type_request_fails_without_side_effects() {
        let f = with_key_mute();
        let resp = f.handler.handle_type(&type_req("{}"));
        assert!(!resp.success);
        assert!(f.emitter.events().is_empty());
        assert!(f.clipboard.untouched());
    }

    #[test]
    fn test_enter_flag_short_circuits_text() {
        // Arrange
        let f = with_key_mute();

        // Act
        let resp = f
            .handler
            .handle_type(&type_req(r#"{"text":"ignored","enter":true}"#));

        // Assert
        assert!(resp.success);
        assert_eq!(f.emitter.presses(), vec![Key::Enter]);
        assert!(f.clipboard.untouched());
    }

    #[test]
    fn test_text_uses_current_paste_config() {
        let f = with_key_mute();
        f.handler.paste_config().set_use_secondary_combo(false);

        let resp = f.handler.handle_type(&type_req(r#"{"text":"hi"}"#));

        assert!(resp.success);
        assert_eq!(f.emitter.press_count(Key::V), 1);
        assert_eq!(f.emitter.press_count(Key::Insert), 0);
    }

    #[test]
    fn test_clipboard_failure_reports_failure() {
        let f = with_key_mute();
        f.clipboard.set_fail_writes(true);
        let resp = f.handler.handle_type(&type_req(r#"{"text":"hi"}"#));
        assert!(!resp.success);
    }

    #[test]
    fn test_mute_policy_echoes_flag() {
        let f = with_key_mute();
        let resp = f.handler.handle_mute_policy(MutePolicyRequest { enabled: true });
        assert_eq!(
            resp,
            MutePolicyResponse {
                success: true,
                enabled: Some(true)
            }
        );
        assert!(f.handler.mute_state().auto_mute_enabled());
    }

    #[test]
    fn test_mute_immediate_then_release() {
        // Arrange
        let f = with_key_mute();

        // Act
        let muted = f
            .handler
            .handle_mute_immediate(MuteImmediateRequest { mute: true });
        let released = f.handler.release_mute();

        // Assert
        assert!(muted.success);
        assert!(released);
        assert!(!f.handler.mute_state().muted_by_app());
        assert_eq!(f.emitter.press_count(Key::VolumeMute), 2);
    }

    #[test]
    fn test_mute_immediate_unsupported_host() {
        let f = fixture(
            AudioMuteController::unsupported(),
            Arc::new(MockKeyEmitter::new()),
        );
        let resp = f
            .handler
            .handle_mute_immediate(MuteImmediateRequest { mute: true });
        assert!(!resp.success);
        assert!(resp.message.is_some());
    }

    // ── Idle release ──────────────────────────────────────────────────────────

    const IDLE: Duration = Duration::from_secs(60);

    #[test]
    fn test_idle_phone_loses_its_mute() {
        // Arrange
        let f = with_key_mute();
        f.handler
            .handle_mute_immediate(MuteImmediateRequest { mute: true });

        // Act
        let released = f
            .handler
            .release_mute_if_idle_at(Instant::now() + IDLE * 2, IDLE);

        // Assert
        assert!(released);
        assert!(!f.handler.mute_state().muted_by_app());
        assert_eq!(f.emitter.press_count(Key::VolumeMute), 2);
    }

    #[test]
    fn test_recent_request_keeps_the_mute() {
        // Arrange
        let f = with_key_mute();
        f.handler
            .handle_mute_immediate(MuteImmediateRequest { mute: true });
        let half_way = Instant::now() + IDLE / 2;

        // Act
        f.handler.handle_type(&type_req(r#"{"enter":true}"#));
        let released = f.handler.release_mute_if_idle_at(half_way, IDLE);

        // Assert
        assert!(!released);
        assert!(f.handler.mute_state().muted_by_app());
    }

    #[test]
    fn test_idle_without_owned_mute_does_nothing() {
        let f = with_key_mute();
        let released = f
            .handler
            .release_mute_if_idle_at(Instant::now() + IDLE * 2, IDLE);
        assert!(!released);
        assert!(f.emitter.events().is_empty());
    }

    #[test]
    fn test_relay_text_is_pasted_with_shared_config() {
        // Arrange
        let f = with_key_mute();

        // Act
        let ok = f.handler.handle_relay_text("from the phone");

        // Assert
        assert!(ok);
        assert_eq!(f.clipboard.writes(), vec!["from the phone".to_string()]);
        assert_eq!(f.emitter.press_count(Key::Insert), 1);
    }

    #[test]
    fn test_relay_empty_text_is_ignored() {
        let f = with_key_mute();
        assert!(!f.handler.handle_relay_text(""));
        assert!(f.clipboard.untouched());
    }

    #[test]
    fn test_preview_truncates_long_text_on_char_boundary() {
        let long = "é".repeat(40);
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
        assert!(p.ends_with("..."));
        assert_eq!(preview("short"), "short");
        assert_eq!(preview(&"x".repeat(PREVIEW_CHARS)), "x".repeat(PREVIEW_CHARS));
    }
}
