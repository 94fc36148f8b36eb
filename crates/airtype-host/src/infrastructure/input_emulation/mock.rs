//! Mock key emitter for unit and integration testing.
//!
//! # Why a mock emitter?
//!
//! The real emitters (`WindowsKeyEmitter`, `X11KeyEmitter`,
//! `MacosKeyEmitter`, `EnigoKeyEmitter`) make OS API calls that:
//!
//! - Require a physical desktop session to run.
//! - Actually press keys on the test machine.
//! - Cannot be observed directly from Rust test code.
//!
//! `MockKeyEmitter` replaces all OS calls with in-memory recording.  Every
//! press and release is appended to an event log, and the set of keys
//! currently held down is tracked so tests can assert that nothing was left
//! pressed.
//!
//! # Failure injection
//!
//! - [`failing`](MockKeyEmitter::failing): every call fails.
//! - [`fail_press_of`](MockKeyEmitter::fail_press_of): pressing one key fails.
//! - [`fail_release_once`](MockKeyEmitter::fail_release_once): the next
//!   release of one key fails.
//!
//! # Insert toggle
//!
//! [`with_insert_toggle`](MockKeyEmitter::with_insert_toggle) makes the mock
//! report an Insert toggle state that flips on every Insert press, as
//! Windows does.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use airtype_core::Key;

use crate::application::key_sequence::{EmulationError, KeyEmitter};

/// One recorded key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Press(Key),
    Release(Key),
}

/// A mock emitter that records all calls without performing OS API calls.
#[derive(Default)]
pub struct MockKeyEmitter {
    events: Mutex<Vec<KeyEvent>>,
    held: Mutex<Vec<Key>>,
    insert_toggle: Mutex<Option<bool>>,
    fail_press: Mutex<Option<Key>>,
    fail_release: Mutex<Option<Key>>,
    should_fail: AtomicBool,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockKeyEmitter {
    /// Creates a mock with empty records and no failures.
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock whose every call fails.
    pub fn failing() -> Self {
        let mock = Self::default();
        mock.should_fail.store(true, Ordering::SeqCst);
        mock
    }

    pub fn set_failing(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    pub fn with_insert_toggle(self, initial: bool) -> Self {
        *lock(&self.insert_toggle) = Some(initial);
        self
    }

    pub fn fail_press_of(self, key: Key) -> Self {
        *lock(&self.fail_press) = Some(key);
        self
    }

    pub fn fail_release_once(self, key: Key) -> Self {
        *lock(&self.fail_release) = Some(key);
        self
    }

    /// Every event recorded so far.
    pub fn events(&self) -> Vec<KeyEvent> {
        lock(&self.events).clone()
    }

    /// Keys pressed so far, in order.
    pub fn presses(&self) -> Vec<Key> {
        lock(&self.events)
            .iter()
            .filter_map(|e| match e {
                KeyEvent::Press(k) => Some(*k),
                KeyEvent::Release(_) => None,
            })
            .collect()
    }

    /// Number of times `key` was pressed.
    pub fn press_count(&self, key: Key) -> usize {
        self.presses().into_iter().filter(|k| *k == key).count()
    }

    /// Keys currently held down.
    pub fn held(&self) -> Vec<Key> {
        lock(&self.held).clone()
    }

    /// Current Insert toggle state, if tracked.
    pub fn insert_toggle(&self) -> Option<bool> {
        *lock(&self.insert_toggle)
    }

    pub fn clear(&self) {
        lock(&self.events).clear();
    }
}

impl KeyEmitter for MockKeyEmitter {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn press(&self, key: Key) -> Result<(), EmulationError> {
        if self.should_fail.load(Ordering::SeqCst) || *lock(&self.fail_press) == Some(key) {
            return Err(EmulationError::Platform("mock failure".into()));
        }
        lock(&self.events).push(KeyEvent::Press(key));
        lock(&self.held).push(key);
        if key == Key::Insert {
            if let Some(state) = lock(&self.insert_toggle).as_mut() {
                *state = !*state;
            }
        }
        Ok(())
    }

    fn release(&self, key: Key) -> Result<(), EmulationError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(EmulationError::Platform("mock failure".into()));
        }
        {
            let mut fail = lock(&self.fail_release);
            if *fail == Some(key) {
                *fail = None;
                return Err(EmulationError::Platform("mock release failure".into()));
            }
        }
        lock(&self.events).push(KeyEvent::Release(key));
        lock(&self.held).retain(|k| *k != key);
        Ok(())
    }

    fn toggle_state(&self, key: Key) -> Option<bool> {
        if key == Key::Insert {
            self.insert_toggle()
        } else {
            None
        }
    }
}
