//! Clipboard backends built on `arboard`.
//!
//! - [`QuietClipboard`] (Windows) sets the "exclude from history" and
//!   "exclude from cloud sync" formats on every write, so pasted dictation
//!   does not pile up in Win+V history or sync to other devices.
//! - [`StandardClipboard`] is a plain `arboard` clipboard on every platform.
//!
//! [`default_bridge`] orders them quiet-first.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::warn;

use crate::application::clipboard_bridge::{ClipboardBackend, ClipboardBridge, ClipboardError};

pub mod mock;

/// Opens the system clipboard.
///
/// The handle is kept for the life of the backend: on X11 and Wayland the
/// clipboard content is served by the process that set it, so dropping the
/// handle right after a write would empty the clipboard.
fn open() -> Result<Mutex<arboard::Clipboard>, ClipboardError> {
    arboard::Clipboard::new()
        .map(Mutex::new)
        .map_err(|e| ClipboardError::Unavailable(e.to_string()))
}

fn lock(m: &Mutex<arboard::Clipboard>) -> MutexGuard<'_, arboard::Clipboard> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read(clipboard: &mut arboard::Clipboard) -> Result<String, ClipboardError> {
    match clipboard.get_text() {
        Ok(text) => Ok(text),
        // Empty clipboard, or content that is not text (an image, files).
        Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
        Err(e) => Err(ClipboardError::Read(e.to_string())),
    }
}

// ── StandardClipboard ─────────────────────────────────────────────────────────

/// Plain `arboard` clipboard.
pub struct StandardClipboard {
    inner: Mutex<arboard::Clipboard>,
}

impl StandardClipboard {
    pub fn new() -> Result<Self, ClipboardError> {
        Ok(Self { inner: open()? })
    }
}

impl ClipboardBackend for StandardClipboard {
    fn name(&self) -> &'static str {
        "standard"
    }

    fn get_text(&self) -> Result<String, ClipboardError> {
        read(&mut lock(&self.inner))
    }

    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        lock(&self.inner)
            .set_text(text)
            .map_err(|e| ClipboardError::Write(e.to_string()))
    }

    fn clear(&self) -> Result<(), ClipboardError> {
        lock(&self.inner)
            .clear()
            .map_err(|e| ClipboardError::Write(e.to_string()))
    }
}

// ── QuietClipboard ────────────────────────────────────────────────────────────

/// `arboard` clipboard whose writes are hidden from clipboard history.
#[cfg(target_os = "windows")]
pub struct QuietClipboard {
    inner: Mutex<arboard::Clipboard>,
}

#[cfg(target_os = "windows")]
impl QuietClipboard {
    pub fn new() -> Result<Self, ClipboardError> {
        Ok(Self { inner: open()? })
    }
}

#[cfg(target_os = "windows")]
impl ClipboardBackend for QuietClipboard {
    fn name(&self) -> &'static str {
        "quiet"
    }

    fn get_text(&self) -> Result<String, ClipboardError> {
        read(&mut lock(&self.inner))
    }

    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        use arboard::SetExtWindows;

        lock(&self.inner)
            .set()
            .exclude_from_history()
            .exclude_from_cloud()
            .text(text)
            .map_err(|e| ClipboardError::Write(e.to_string()))
    }

    fn clear(&self) -> Result<(), ClipboardError> {
        lock(&self.inner)
            .clear()
            .map_err(|e| ClipboardError::Write(e.to_string()))
    }
}

/// Builds the bridge for this platform: quiet backend first where one exists.
///
/// Backends that cannot be opened are skipped; the bridge may end up empty,
/// in which case every paste fails with [`ClipboardError::NoBackend`].
pub fn default_bridge() -> ClipboardBridge {
    let mut backends: Vec<Box<dyn ClipboardBackend>> = Vec::with_capacity(2);

    #[cfg(target_os = "windows")]
    match QuietClipboard::new() {
        Ok(quiet) => backends.push(Box::new(quiet)),
        Err(e) => warn!("quiet clipboard unavailable: {e}"),
    }

    match StandardClipboard::new() {
        Ok(standard) => backends.push(Box::new(standard)),
        Err(e) => warn!("standard clipboard unavailable: {e}"),
    }

    ClipboardBridge::new(backends)
}
