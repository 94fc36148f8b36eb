//! Paste settings shared by every injection.
//!
//! [`PasteConfig`] is the plain value stored in the config file and passed
//! to a single paste.  [`SharedPasteConfig`] is the process-wide, mutable
//! copy that the HTTP handlers and the relay dispatcher read concurrently.
//!
//! # Why atomics instead of a Mutex?
//!
//! Each field is an independent boolean, and readers only ever need a
//! consistent *per-field* value.  `AtomicBool` gives lock-free reads from any
//! thread (request threads, blocking paste threads, the relay task) without
//! any risk of holding a lock across a sleep.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

/// How a paste is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasteConfig {
    /// `true` → Shift+Insert, `false` → Ctrl+V (Cmd+V on macOS).
    #[serde(default = "default_true")]
    pub use_secondary_combo: bool,
    /// Save the clipboard before pasting and restore it afterwards.
    #[serde(default)]
    pub preserve_clipboard: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PasteConfig {
    fn default() -> Self {
        Self {
            use_secondary_combo: true,
            preserve_clipboard: false,
        }
    }
}

/// Thread-safe, process-wide paste settings.
#[derive(Debug)]
pub struct SharedPasteConfig {
    use_secondary_combo: AtomicBool,
    preserve_clipboard: AtomicBool,
}

impl SharedPasteConfig {
    pub fn new(initial: PasteConfig) -> Self {
        Self {
            use_secondary_combo: AtomicBool::new(initial.use_secondary_combo),
            preserve_clipboard: AtomicBool::new(initial.preserve_clipboard),
        }
    }

    /// Returns the current settings as a plain value.
    pub fn snapshot(&self) -> PasteConfig {
        PasteConfig {
            use_secondary_combo: self.use_secondary_combo.load(Ordering::Relaxed),
            preserve_clipboard: self.preserve_clipboard.load(Ordering::Relaxed),
        }
    }

    pub fn set_use_secondary_combo(&self, value: bool) {
        self.use_secondary_combo.store(value, Ordering::Relaxed);
    }

    pub fn set_preserve_clipboard(&self, value: bool) {
        self.preserve_clipboard.store(value, Ordering::Relaxed);
    }
}

impl Default for SharedPasteConfig {
    fn default() -> Self {
        Self::new(PasteConfig::default())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
