//! Key press/release sequencing with guaranteed release.
//!
//! This use case sits at the application layer and delegates to a
//! [`KeyEmitter`] trait object for OS-level event injection.  The
//! platform-specific implementations are in the infrastructure layer.
//!
//! # Why a guard? (for beginners)
//!
//! A paste combo is a sequence like:
//!
//! ```text
//! Shift down → wait → Insert down → wait → Insert up → wait → Shift up
//! ```
//!
//! If anything fails after "Shift down" (the OS rejects an event, the
//! emitter loses its display connection, a bug panics) and we simply return
//! early, Shift stays logically held on the desktop.  Every key the user
//! then presses on their real keyboard is shifted, and the user has no idea
//! why.
//!
//! [`PressedKeys`] records every key it successfully pressed.  Releasing
//! removes keys from the record one by one.  When the guard is dropped
//! (normal return, `?` early return, or unwinding panic) every key still on
//! the record is released in reverse order.
//!
//! # One sequence at a time
//!
//! HTTP handlers and relay messages run on a blocking thread pool, so two
//! requests can emit keys at the same moment.  Without coordination an Enter
//! could land between "Shift down" and "Insert down" of a paste and arrive
//! as Shift+Enter.  Every emitter of key events holds the same
//! [`EmissionGate`] for the duration of its whole sequence.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use airtype_core::Key;
use thiserror::Error;
use tracing::warn;

/// Error type for key emission.
#[derive(Debug, Error)]
pub enum EmulationError {
    #[error("platform error: {0}")]
    Platform(String),
    #[error("key {0:?} cannot be emitted on this platform")]
    UnsupportedKey(Key),
    #[error("emulator not initialized")]
    NotInitialized,
}

/// Platform-agnostic key emission.
///
/// Each supported OS provides an implementation in the infrastructure layer.
pub trait KeyEmitter: Send + Sync {
    /// Short name used in log messages.
    fn name(&self) -> &'static str;

    /// Emulates a key press (key-down event).
    fn press(&self, key: Key) -> Result<(), EmulationError>;

    /// Emulates a key release (key-up event).
    fn release(&self, key: Key) -> Result<(), EmulationError>;

    /// Reports the toggle state of a lock-style key (Insert, Caps Lock).
    ///
    /// `None` means the emitter cannot observe it.
    fn toggle_state(&self, _key: Key) -> Option<bool> {
        None
    }
}

/// Sleeps between the steps of a combo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboTimings {
    /// After the first key of a multi-key combo goes down.
    pub modifier_settle: Duration,
    /// After every other press, and between releases.
    pub key_settle: Duration,
}

impl Default for ComboTimings {
    fn default() -> Self {
        Self {
            modifier_settle: Duration::from_millis(50),
            key_settle: Duration::from_millis(20),
        }
    }
}

impl ComboTimings {
    /// No sleeps at all; for tests.
    pub fn zero() -> Self {
        Self {
            modifier_settle: Duration::ZERO,
            key_settle: Duration::ZERO,
        }
    }
}

pub(crate) fn settle(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}

// ── EmissionGate ──────────────────────────────────────────────────────────────

/// Shared lock that serialises complete key sequences.
///
/// Clones share the same lock, so the injector and the mute controller can
/// each hold one.
#[derive(Debug, Clone, Default)]
pub struct EmissionGate(Arc<Mutex<()>>);

impl EmissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until no other sequence is running.
    ///
    /// A panic in another sequence does not wedge the gate; its keys were
    /// already released by [`PressedKeys`].
    pub fn hold(&self) -> MutexGuard<'_, ()> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── PressedKeys guard ─────────────────────────────────────────────────────────

/// Stack of keys currently held down through one emitter.
pub struct PressedKeys<'a> {
    emitter: &'a dyn KeyEmitter,
    held: Vec<Key>,
}

impl<'a> PressedKeys<'a> {
    pub fn new(emitter: &'a dyn KeyEmitter) -> Self {
        Self {
            emitter,
            held: Vec::new(),
        }
    }

    /// Presses `key` and records it.  A failed press is not recorded.
    pub fn press(&mut self, key: Key) -> Result<(), EmulationError> {
        self.emitter.press(key)?;
        self.held.push(key);
        Ok(())
    }

    /// Releases every recorded key, most recent first, sleeping `between`
    /// after each release except the last.
    ///
    /// A key leaves the record only once its release succeeded, so on error
    /// the remaining keys are still released when the guard drops.
    pub fn release_all(&mut self, between: Duration) -> Result<(), EmulationError> {
        while let Some(&key) = self.held.last() {
            self.emitter.release(key)?;
            self.held.pop();
            if !self.held.is_empty() {
                settle(between);
            }
        }
        Ok(())
    }
}

impl Drop for PressedKeys<'_> {
    fn drop(&mut self) {
        while let Some(key) = self.held.pop() {
            if let Err(e) = self.emitter.release(key) {
                warn!(
                    emitter = self.emitter.name(),
                    ?key,
                    "failed to release key during cleanup: {e}"
                );
            }
        }
    }
}

// ── Sequences ─────────────────────────────────────────────────────────────────

/// Presses `keys` in order, then releases them in reverse.
///
/// # Errors
///
/// Returns the first [`EmulationError`]; any key already pressed has been
/// released by the time the error reaches the caller.
pub fn emit_combo(
    emitter: &dyn KeyEmitter,
    keys: &[Key],
    timings: ComboTimings,
) -> Result<(), EmulationError> {
    let mut guard = PressedKeys::new(emitter);
    for (index, &key) in keys.iter().enumerate() {
        guard.press(key)?;
        let more_follow = index + 1 < keys.len();
        if key.is_modifier() && more_follow {
            settle(timings.modifier_settle);
        } else {
            settle(timings.key_settle);
        }
    }
    guard.release_all(timings.key_settle)
}

/// Presses and releases a single key.
pub fn tap(emitter: &dyn KeyEmitter, key: Key, timings: ComboTimings) -> Result<(), EmulationError> {
    emit_combo(emitter, &[key], timings)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    // ── Mock emitter ──────────────────────────────────────────────────────────

    /// Records events and tracks which keys are logically down.
    #[derive(Default)]
    struct Recorder {
        log: Mutex<Vec<(Key, bool)>>,
        down: Mutex<Vec<Key>>,
        fail_press: Option<Key>,
        fail_release: Mutex<Option<Key>>,
    }

    impl KeyEmitter for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn press(&self, key: Key) -> Result<(), EmulationError> {
            if self.fail_press == Some(key) {
                return Err(EmulationError::Platform("press rejected".into()));
            }
            self.log.lock().unwrap().push((key, true));
            self.down.lock().unwrap().push(key);
            Ok(())
        }

        fn release(&self, key: Key) -> Result<(), EmulationError> {
            {
                let mut fail = self.fail_release.lock().unwrap();
                if *fail == Some(key) {
                    *fail = None;
                    return Err(EmulationError::Platform("release rejected".into()));
                }
            }
            self.log.lock().unwrap().push((key, false));
            self.down.lock().unwrap().retain(|k| *k != key);
            Ok(())
        }
    }

    // ── Combos ────────────────────────────────────────────────────────────────

    #[test]
    fn test_combo_presses_in_order_and_releases_in_reverse() {
        // Arrange
        let rec = Recorder::default();

        // Act
        emit_combo(&rec, &[Key::Shift, Key::Insert], ComboTimings::zero()).unwrap();

        // Assert
        assert_eq!(
            *rec.log.lock().unwrap(),
            vec![
                (Key::Shift, true),
                (Key::Insert, true),
                (Key::Insert, false),
                (Key::Shift, false),
            ]
        );
        assert!(rec.down.lock().unwrap().is_empty());
    }

    #[test]
    fn test_failed_second_press_releases_the_modifier() {
        // Arrange
        let rec = Recorder {
            fail_press: Some(Key::V),
            ..Default::default()
        };

        // Act
        let result = emit_combo(&rec, &[Key::Control, Key::V], ComboTimings::zero());

        // Assert
        assert!(result.is_err());
        assert!(rec.down.lock().unwrap().is_empty(), "no key may stay held");
        assert_eq!(
            *rec.log.lock().unwrap(),
            vec![(Key::Control, true), (Key::Control, false)]
        );
    }

    #[test]
    fn test_failed_release_is_retried_when_guard_drops() {
        // Arrange
        let rec = Recorder {
            fail_release: Mutex::new(Some(Key::Insert)),
            ..Default::default()
        };

        // Act
        let result = emit_combo(&rec, &[Key::Shift, Key::Insert], ComboTimings::zero());

        // Assert
        assert!(result.is_err());
        assert!(rec.down.lock().unwrap().is_empty());
    }

    #[test]
    fn test_guard_releases_on_panic() {
        let rec = Recorder::default();

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut guard = PressedKeys::new(&rec);
            guard.press(Key::Control).unwrap();
            guard.press(Key::Z).unwrap();
            panic!("interrupted mid-combo");
        }));

        assert!(outcome.is_err());
        assert!(rec.down.lock().unwrap().is_empty());
    }

    #[test]
    fn test_tap_is_press_then_release() {
        let rec = Recorder::default();
        tap(&rec, Key::Enter, ComboTimings::zero()).unwrap();
        assert_eq!(
            *rec.log.lock().unwrap(),
            vec![(Key::Enter, true), (Key::Enter, false)]
        );
    }

    // ── Gate ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_gate_clones_share_one_lock() {
        // Arrange
        let gate = EmissionGate::new();
        let other = gate.clone();
        let entered = Arc::new(AtomicBool::new(false));

        // Act
        let held = gate.hold();
        let worker = {
            let entered = Arc::clone(&entered);
            thread::spawn(move || {
                let _serial = other.hold();
                entered.store(true, Ordering::SeqCst);
            })
        };
        thread::sleep(Duration::from_millis(50));
        let entered_while_held = entered.load(Ordering::SeqCst);
        drop(held);
        worker.join().unwrap();

        // Assert
        assert!(!entered_while_held, "clone must wait for the holder");
        assert!(entered.load(Ordering::SeqCst));
    }

    #[test]
    fn test_gate_survives_a_panicking_holder() {
        let gate = EmissionGate::new();
        let other = gate.clone();

        let outcome = thread::spawn(move || {
            let _serial = other.hold();
            panic!("sequence aborted");
        })
        .join();

        assert!(outcome.is_err());
        drop(gate.hold());
    }

    #[test]
    fn test_default_timings_match_settle_intervals() {
        let t = ComboTimings::default();
        assert_eq!(t.modifier_settle, Duration::from_millis(50));
        assert_eq!(t.key_settle, Duration::from_millis(20));
    }
}
