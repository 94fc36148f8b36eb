//! In-memory clipboard backend for tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::application::clipboard_bridge::{ClipboardBackend, ClipboardError};

/// Records every clipboard operation.
///
/// Share it with a bridge through an `Arc` so the test keeps a handle:
///
/// ```ignore
/// let clip = Arc::new(MockClipboard::with_text("before"));
/// let bridge = ClipboardBridge::new(vec![Box::new(Arc::clone(&clip))]);
/// ```
#[derive(Default)]
pub struct MockClipboard {
    text: Mutex<String>,
    writes: Mutex<Vec<String>>,
    reads: AtomicUsize,
    clears: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: &str) -> Self {
        let mock = Self::default();
        *lock(&mock.text) = text.to_string();
        mock
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Current content.
    pub fn text(&self) -> String {
        lock(&self.text).clone()
    }

    /// Every `set_text` call, in order (clears excluded).
    pub fn writes(&self) -> Vec<String> {
        lock(&self.writes).clone()
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    /// `true` if the clipboard was never read, written or cleared.
    pub fn untouched(&self) -> bool {
        self.read_count() == 0 && self.clear_count() == 0 && lock(&self.writes).is_empty()
    }
}

impl ClipboardBackend for MockClipboard {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn get_text(&self) -> Result<String, ClipboardError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ClipboardError::Read("mock failure".into()));
        }
        Ok(self.text())
    }

    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ClipboardError::Write("mock failure".into()));
        }
        lock(&self.writes).push(text.to_string());
        *lock(&self.text) = text.to_string();
        Ok(())
    }

    fn clear(&self) -> Result<(), ClipboardError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ClipboardError::Write("mock failure".into()));
        }
        self.clears.fetch_add(1, Ordering::SeqCst);
        lock(&self.text).clear();
        Ok(())
    }
}
