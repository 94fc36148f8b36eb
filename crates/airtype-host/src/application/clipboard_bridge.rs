//! Clipboard access through an ordered list of backends.
//!
//! The preferred backend is a "quiet" one that marks its writes so clipboard
//! history tools (Windows clipboard history, cloud clipboard sync) skip them.
//! Every paste would otherwise leave a history entry behind.  If the quiet
//! backend fails for any reason, the bridge falls back to a plain backend.

use thiserror::Error;
use tracing::debug;

/// Errors reported by clipboard backends.
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("clipboard read failed: {0}")]
    Read(String),
    #[error("clipboard write failed: {0}")]
    Write(String),
    #[error("no clipboard backend configured")]
    NoBackend,
}

/// One way of reaching the system clipboard.
pub trait ClipboardBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns the current text content; an empty clipboard is `Ok("")`.
    fn get_text(&self) -> Result<String, ClipboardError>;

    fn set_text(&self, text: &str) -> Result<(), ClipboardError>;

    fn clear(&self) -> Result<(), ClipboardError> {
        self.set_text("")
    }
}

impl<T: ClipboardBackend + ?Sized> ClipboardBackend for std::sync::Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn get_text(&self) -> Result<String, ClipboardError> {
        (**self).get_text()
    }

    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        (**self).set_text(text)
    }

    fn clear(&self) -> Result<(), ClipboardError> {
        (**self).clear()
    }
}

/// Capability-ranked list of clipboard backends; the first success wins.
pub struct ClipboardBridge {
    backends: Vec<Box<dyn ClipboardBackend>>,
}

impl ClipboardBridge {
    pub fn new(backends: Vec<Box<dyn ClipboardBackend>>) -> Self {
        Self { backends }
    }

    /// Names of the configured backends, in priority order.
    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    pub fn get_text(&self) -> Result<String, ClipboardError> {
        self.first_success("get", |b| b.get_text())
    }

    pub fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.first_success("set", |b| b.set_text(text))
    }

    pub fn clear(&self) -> Result<(), ClipboardError> {
        self.first_success("clear", |b| b.clear())
    }

    fn first_success<T>(
        &self,
        op: &str,
        mut f: impl FnMut(&dyn ClipboardBackend) -> Result<T, ClipboardError>,
    ) -> Result<T, ClipboardError> {
        let mut last_err = ClipboardError::NoBackend;
        for backend in &self.backends {
            match f(backend.as_ref()) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    debug!(backend = backend.name(), "clipboard {op} failed: {e}");
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }
}
