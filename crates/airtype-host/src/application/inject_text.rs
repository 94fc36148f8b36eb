//! KeyInjector: delivers text and control keys to the focused application.
//!
//! # Why paste instead of typing? (for beginners)
//!
//! Synthesising one key event per character breaks down quickly: non-ASCII
//! text needs layout-specific dead keys, IMEs intercept keystrokes, and long
//! dictations take seconds to "type".  Putting the whole string on the
//! clipboard and sending a single paste shortcut is instant and handles any
//! Unicode text the target application can accept.
//!
//! # Paste sequence
//!
//! ```text
//! [save clipboard] → write text → settle 100 ms → paste combo
//!                  → [fix Insert toggle] → [settle 150 ms → restore clipboard]
//! ```
//!
//! The settle intervals exist because the OS delivers clipboard changes and
//! synthetic keys asynchronously; without them the target application can
//! paste the *old* clipboard content, or the restore can land before the
//! application has read the new one.
//!
//! The whole sequence, clipboard save and restore included, runs under the
//! injector's [`EmissionGate`].  A control key requested mid-paste waits for
//! the paste to finish instead of landing while Shift is held.

use std::sync::Arc;
use std::time::Duration;

use airtype_core::{ControlKey, InjectionRequest, Key, PasteConfig};
use thiserror::Error;
use tracing::{debug, warn};

use super::clipboard_bridge::{ClipboardBridge, ClipboardError};
use super::key_sequence::{
    emit_combo, settle, ComboTimings, EmissionGate, EmulationError, KeyEmitter,
};

/// Error type for injection operations.
#[derive(Debug, Error)]
pub enum InjectionError {
    #[error("clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),
    #[error("could not send {key}: {source}")]
    KeyEmission {
        key: &'static str,
        #[source]
        source: EmulationError,
    },
    #[error("no key emitter available")]
    NoEmitter,
}

/// Sleep intervals used by the injector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectionTimings {
    pub combo: ComboTimings,
    /// After writing the clipboard, before the paste combo.
    pub clipboard_settle: Duration,
    /// After the paste combo, before restoring the saved clipboard.
    pub restore_settle: Duration,
    /// Inside the Insert tap that resets overwrite mode.
    pub toggle_settle: Duration,
}

impl Default for InjectionTimings {
    fn default() -> Self {
        Self {
            combo: ComboTimings::default(),
            clipboard_settle: Duration::from_millis(100),
            restore_settle: Duration::from_millis(150),
            toggle_settle: Duration::from_millis(10),
        }
    }
}

impl InjectionTimings {
    /// No sleeps at all; for tests.
    pub fn zero() -> Self {
        Self {
            combo: ComboTimings::zero(),
            clipboard_settle: Duration::ZERO,
            restore_settle: Duration::ZERO,
            toggle_settle: Duration::ZERO,
        }
    }
}

/// Emits control keys and performs clipboard pastes.
///
/// Emitters are tried in order: the first is the native, fast path; later
/// ones are slower fallbacks used only when an earlier one fails.
pub struct KeyInjector {
    emitters: Vec<Arc<dyn KeyEmitter>>,
    clipboard: Arc<ClipboardBridge>,
    timings: InjectionTimings,
    // Held for every key sequence.  Also keeps two save/restore cycles from
    // clobbering each other's saved clipboard.
    gate: EmissionGate,
}

impl KeyInjector {
    pub fn new(emitters: Vec<Arc<dyn KeyEmitter>>, clipboard: Arc<ClipboardBridge>) -> Self {
        Self {
            emitters,
            clipboard,
            timings: InjectionTimings::default(),
            gate: EmissionGate::new(),
        }
    }

    pub fn with_timings(mut self, timings: InjectionTimings) -> Self {
        self.timings = timings;
        self
    }

    /// Handle to the lock this injector holds while emitting.
    ///
    /// Give it to anything else that synthesises keys through the same
    /// emitters so its sequences never interleave with a paste.
    pub fn emission_gate(&self) -> EmissionGate {
        self.gate.clone()
    }

    /// Names of the configured emitters, in priority order.
    pub fn emitter_names(&self) -> Vec<&'static str> {
        self.emitters.iter().map(|e| e.name()).collect()
    }

    /// Emits the key combo for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`InjectionError::KeyEmission`] when every emitter failed.
    pub fn send_control_key(&self, kind: ControlKey) -> Result<(), InjectionError> {
        let _serial = self.gate.hold();
        self.emit_control_key(kind)
    }

    // Caller holds the gate.
    fn emit_control_key(&self, kind: ControlKey) -> Result<(), InjectionError> {
        let combo = kind.combo();
        let timings = self.timings.combo;
        self.with_fallback(kind.name(), |emitter| emit_combo(emitter, combo, timings))
    }

    /// Pastes `text` into the focused application.
    ///
    /// A failed paste combo is logged and does not fail the call; the saved
    /// clipboard is restored either way.
    ///
    /// # Errors
    ///
    /// Returns [`InjectionError::Clipboard`] if `text` could not be written to
    /// the clipboard.  Nothing is pasted in that case.
    pub fn paste(&self, text: &str, config: PasteConfig) -> Result<(), InjectionError> {
        let _serial = self.gate.hold();

        let saved = if config.preserve_clipboard {
            match self.clipboard.get_text() {
                Ok(original) => Some(original),
                Err(e) => {
                    warn!("could not save clipboard, it will not be restored: {e}");
                    None
                }
            }
        } else {
            None
        };

        self.clipboard.set_text(text)?;
        settle(self.timings.clipboard_settle);

        let combo = if config.use_secondary_combo {
            ControlKey::SecondaryPasteCombo
        } else {
            ControlKey::PrimaryPasteCombo
        };
        match self.emit_control_key(combo) {
            Ok(()) => {
                if config.use_secondary_combo {
                    self.reset_insert_mode();
                }
            }
            Err(e) => warn!("paste combo failed: {e}"),
        }

        if let Some(original) = saved {
            settle(self.timings.restore_settle);
            let restored = if original.is_empty() {
                self.clipboard.clear()
            } else {
                self.clipboard.set_text(&original)
            };
            if let Err(e) = restored {
                warn!("could not restore clipboard: {e}");
            }
        }

        debug!(chars = text.chars().count(), combo = combo.name(), "pasted text");
        Ok(())
    }

    /// Runs one injection request.
    pub fn inject(
        &self,
        request: &InjectionRequest,
        config: PasteConfig,
    ) -> Result<(), InjectionError> {
        match request {
            InjectionRequest::Text(text) => self.paste(text, config),
            InjectionRequest::Enter => self.send_control_key(ControlKey::Enter),
            InjectionRequest::Backspace => self.send_control_key(ControlKey::Backspace),
            InjectionRequest::Undo => self.send_control_key(ControlKey::Undo),
        }
    }

    /// Turns overwrite mode back off if the paste combo switched it on.
    ///
    /// Rich edit controls track Insert as a toggle even when it is pressed
    /// together with Shift, so Shift+Insert leaves them in overwrite mode.
    /// Only called from [`Self::paste`], which already holds the gate.
    fn reset_insert_mode(&self) {
        let overwrite = self
            .emitters
            .iter()
            .find_map(|e| e.toggle_state(Key::Insert));
        if overwrite != Some(true) {
            return;
        }

        debug!("overwrite mode detected after paste, toggling Insert");
        let timings = ComboTimings {
            modifier_settle: self.timings.toggle_settle,
            key_settle: self.timings.toggle_settle,
        };
        if let Err(e) = self.with_fallback("insert", |emitter| {
            emit_combo(emitter, &[Key::Insert], timings)
        }) {
            warn!("could not reset insert mode: {e}");
        }
    }

    fn with_fallback(
        &self,
        key: &'static str,
        mut f: impl FnMut(&dyn KeyEmitter) -> Result<(), EmulationError>,
    ) -> Result<(), InjectionError> {
        let mut last_err = None;
        for emitter in &self.emitters {
            match f(emitter.as_ref()) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(emitter = emitter.name(), "failed to send {key}: {e}");
                    last_err = Some(e);
                }
            }
        }
        match last_err {
            Some(source) => Err(InjectionError::KeyEmission { key, source }),
            None => Err(InjectionError::NoEmitter),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
