//! Request model for text injection and the JSON bodies of the LAN HTTP API.
//!
//! # Message flow
//!
//! ```text
//! Phone → Host:  POST /type {"text": "hi"}      →  TypeRequest  →  InjectionRequest::Text
//! Phone → Host:  POST /type {"undo": true}      →  TypeRequest  →  InjectionRequest::Undo
//! Relay → Host:  decrypted text frame           →  InjectionRequest::Text
//! ```
//!
//! An [`InjectionRequest`] is ephemeral: it is built for one inbound message
//! and consumed immediately by the key injector.

use serde::{Deserialize, Serialize};

// ── Injection requests ────────────────────────────────────────────────────────

/// One unit of work for the key injector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectionRequest {
    /// Paste literal text through the clipboard.
    Text(String),
    /// Press Enter.
    Enter,
    /// Press Backspace.
    Backspace,
    /// Trigger the application's undo shortcut.
    Undo,
}

/// Fixed key sequences the injector knows how to emit.
///
/// The two paste combos exist because terminal and console applications often
/// intercept Ctrl+V, while Shift+Insert is honoured almost everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKey {
    Enter,
    Backspace,
    Undo,
    /// Shift+Insert.
    SecondaryPasteCombo,
    /// Ctrl+V (Cmd+V on macOS).
    PrimaryPasteCombo,
}

impl ControlKey {
    /// Short lowercase name used in log messages.
    pub fn name(self) -> &'static str {
        match self {
            ControlKey::Enter => "enter",
            ControlKey::Backspace => "backspace",
            ControlKey::Undo => "undo",
            ControlKey::SecondaryPasteCombo => "secondary-paste",
            ControlKey::PrimaryPasteCombo => "primary-paste",
        }
    }
}

// ── POST /type ────────────────────────────────────────────────────────────────

/// Body of `POST /type`.
///
/// Every field is optional on the wire; absent flags read as `false`.
///
/// ```json
/// {"text": "hello"}
/// {"enter": true}
/// {"undo": true, "text": "ignored"}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub backspace: bool,
    #[serde(default)]
    pub undo: bool,
}

impl TypeRequest {
    /// Resolves the body into a single injection request.
    ///
    /// Control flags take priority in the order undo, enter, backspace; only
    /// when none is set does the text matter.  Returns `None` when no flag is
    /// set and the text is absent or empty.
    pub fn to_injection(&self) -> Option<InjectionRequest> {
        if self.undo {
            return Some(InjectionRequest::Undo);
        }
        if self.enter {
            return Some(InjectionRequest::Enter);
        }
        if self.backspace {
            return Some(InjectionRequest::Backspace);
        }
        match self.text.as_deref() {
            Some(text) if !text.is_empty() => Some(InjectionRequest::Text(text.to_string())),
            _ => None,
        }
    }
}

/// Response of `POST /type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeResponse {
    pub success: bool,
}

impl TypeResponse {
    pub fn new(success: bool) -> Self {
        Self { success }
    }

    pub fn failure() -> Self {
        Self { success: false }
    }
}

// ── POST /mute ────────────────────────────────────────────────────────────────

/// Body of `POST /mute`: toggles the auto-mute policy flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutePolicyRequest {
    #[serde(default)]
    pub enabled: bool,
}

/// Response of `POST /mute`; echoes the flag as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutePolicyResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl MutePolicyResponse {
    pub fn failure() -> Self {
        Self {
            success: false,
            enabled: None,
        }
    }
}

// ── POST /mute_immediate ──────────────────────────────────────────────────────

/// Body of `POST /mute_immediate`: mute or unmute system output right now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuteImmediateRequest {
    #[serde(default)]
    pub mute: bool,
}

/// Response of `POST /mute_immediate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuteImmediateResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl MuteImmediateResponse {
    pub fn new(success: bool) -> Self {
        Self {
            success,
            message: None,
        }
    }

    pub fn unsupported() -> Self {
        Self {
            success: false,
            message: Some("no mute mechanism available on this host".to_string()),
        }
    }

    pub fn failure() -> Self {
        Self::new(false)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
