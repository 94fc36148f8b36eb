//! System output muting with ownership tracking.
//!
//! # Two ways to mute (for beginners)
//!
//! 1. **Mixer API** – ask the OS audio stack to set the mute flag on the
//!    default output device.  This is silent (no on-screen indicator) and
//!    *idempotent*: "set mute = true" twice leaves the device muted.
//! 2. **Hardware mute key** – synthesise the keyboard's multimedia mute key.
//!    This shows the OS volume overlay and, more importantly, *toggles*:
//!    pressing it twice unmutes again.
//!
//! [`AudioMuteController`] prefers the mixer and falls back to the key.  For
//! the key path it tracks what it believes the current state is and only
//! taps the key when that state differs from the request.
//!
//! # Ownership
//!
//! [`MuteState`] remembers whether a mute currently in force was put there by
//! this process (`muted_by_app`).  The host only ever unmutes a mute it owns,
//! so a user who muted their speakers by hand does not find them unmuted when
//! the phone disconnects.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use airtype_core::Key;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::key_sequence::{tap, ComboTimings, EmissionGate, KeyEmitter};

/// Errors reported by mixer backends.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("mixer unavailable: {0}")]
    Unavailable(String),
    #[error("mixer call failed: {0}")]
    Mixer(String),
}

/// Direct control over the default output device's mute flag.
#[cfg_attr(test, mockall::automock)]
pub trait MixerApi: Send + Sync {
    fn name(&self) -> &'static str;

    /// Sets (not toggles) the mute flag.
    fn set_mute(&self, mute: bool) -> Result<(), AudioError>;
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── AudioMuteController ───────────────────────────────────────────────────────

/// Best-effort mute/unmute of system output.
pub struct AudioMuteController {
    mixer: Option<Box<dyn MixerApi>>,
    fallback: Option<Arc<dyn KeyEmitter>>,
    // What the toggle-only fallback believes the device state is.
    fallback_muted: Mutex<bool>,
    timings: ComboTimings,
    gate: EmissionGate,
}

impl AudioMuteController {
    pub fn new(mixer: Option<Box<dyn MixerApi>>, fallback: Option<Arc<dyn KeyEmitter>>) -> Self {
        Self {
            mixer,
            fallback,
            fallback_muted: Mutex::new(false),
            timings: ComboTimings::default(),
            gate: EmissionGate::new(),
        }
    }

    /// A controller with no mechanism at all; every call fails.
    pub fn unsupported() -> Self {
        Self::new(None, None)
    }

    pub fn with_timings(mut self, timings: ComboTimings) -> Self {
        self.timings = timings;
        self
    }

    /// Shares the injector's gate so the mute key never lands inside a paste.
    pub fn with_gate(mut self, gate: EmissionGate) -> Self {
        self.gate = gate;
        self
    }

    /// `true` if at least one mute mechanism is configured.
    pub fn is_supported(&self) -> bool {
        self.mixer.is_some() || self.fallback.is_some()
    }

    /// Mutes or unmutes system output.  Returns `true` on success.
    pub fn set_mute(&self, mute: bool) -> bool {
        if let Some(mixer) = &self.mixer {
            match mixer.set_mute(mute) {
                Ok(()) => {
                    *lock(&self.fallback_muted) = mute;
                    debug!(mixer = mixer.name(), mute, "mute set through mixer");
                    return true;
                }
                Err(e) => warn!(mixer = mixer.name(), "mixer mute failed: {e}"),
            }
        }

        let Some(emitter) = &self.fallback else {
            return false;
        };
        let mut tracked = lock(&self.fallback_muted);
        if *tracked == mute {
            debug!(mute, "mute key skipped, state already matches");
            return true;
        }
        let tapped = {
            let _serial = self.gate.hold();
            tap(emitter.as_ref(), Key::VolumeMute, self.timings)
        };
        match tapped {
            Ok(()) => {
                *tracked = mute;
                debug!(emitter = emitter.name(), mute, "mute toggled with media key");
                true
            }
            Err(e) => {
                warn!(emitter = emitter.name(), "mute key failed: {e}");
                false
            }
        }
    }
}

// ── MuteState ─────────────────────────────────────────────────────────────────

/// Process-wide mute policy and ownership.
///
/// `muted_by_app` is a single slot guarded by one mutex: the check and the
/// controller call happen under the same lock, so two overlapping requests
/// cannot both decide to mute (or both decide to unmute).
#[derive(Debug, Default)]
pub struct MuteState {
    auto_mute_enabled: AtomicBool,
    muted_by_app: Mutex<bool>,
}

impl MuteState {
    pub fn new(auto_mute_enabled: bool) -> Self {
        Self {
            auto_mute_enabled: AtomicBool::new(auto_mute_enabled),
            muted_by_app: Mutex::new(false),
        }
    }

    /// Policy flag read by the phone page: mute while dictating.
    pub fn auto_mute_enabled(&self) -> bool {
        self.auto_mute_enabled.load(Ordering::Relaxed)
    }

    pub fn set_auto_mute_enabled(&self, enabled: bool) {
        self.auto_mute_enabled.store(enabled, Ordering::Relaxed);
        info!(enabled, "auto-mute policy changed");
    }

    pub fn muted_by_app(&self) -> bool {
        *lock(&self.muted_by_app)
    }

    /// Mutes (taking ownership) or unmutes (only an owned mute).
    ///
    /// Muting while already owning the mute and unmuting without owning one
    /// are both successful no-ops.  A failed unmute keeps ownership so the
    /// next request can retry it.
    pub fn request(&self, mute: bool, controller: &AudioMuteController) -> bool {
        let mut owned = lock(&self.muted_by_app);
        if *owned == mute {
            return true;
        }
        let ok = controller.set_mute(mute);
        if ok {
            *owned = mute;
        }
        ok
    }

    /// Releases an owned mute, e.g. when the phone disconnects.
    ///
    /// Ownership is dropped even if the unmute attempt fails; the attempt is
    /// best effort.  Returns `false` only when an unmute was attempted and
    /// failed.
    pub fn release(&self, controller: &AudioMuteController) -> bool {
        let mut owned = lock(&self.muted_by_app);
        if !*owned {
            return true;
        }
        let ok = controller.set_mute(false);
        if !ok {
            warn!("could not unmute while releasing app-owned mute");
        }
        *owned = false;
        ok
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::input_emulation::mock::MockKeyEmitter;
    use mockall::predicate::eq;

    fn key_only(emitter: &Arc<MockKeyEmitter>) -> AudioMuteController {
        AudioMuteController::new(None, Some(emitter.clone() as Arc<dyn KeyEmitter>))
            .with_timings(ComboTimings::zero())
    }

    fn failing_mixer() -> MockMixerApi {
        let mut mixer = MockMixerApi::new();
        mixer.expect_name().return_const("mock");
        mixer
            .expect_set_mute()
            .returning(|_| Err(AudioError::Mixer("boom".into())));
        mixer
    }

    // ── Controller ────────────────────────────────────────────────────────────

    #[test]
    fn test_mixer_is_used_when_available() {
        // Arrange
        let mut mixer = MockMixerApi::new();
        mixer.expect_name().return_const("mock");
        mixer
            .expect_set_mute()
            .with(eq(true))
            .times(1)
            .returning(|_| Ok(()));
        let emitter = Arc::new(MockKeyEmitter::new());
        let controller = AudioMuteController::new(
            Some(Box::new(mixer)),
            Some(emitter.clone() as Arc<dyn KeyEmitter>),
        );

        // Act
        let ok = controller.set_mute(true);

        // Assert
        assert!(ok);
        assert!(emitter.events().is_empty(), "media key must not be used");
    }

    #[test]
    fn test_mixer_failure_falls_back_to_media_key() {
        let emitter = Arc::new(MockKeyEmitter::new());
        let controller = AudioMuteController::new(
            Some(Box::new(failing_mixer())),
            Some(emitter.clone() as Arc<dyn KeyEmitter>),
        )
        .with_timings(ComboTimings::zero());

        assert!(controller.set_mute(true));
        assert_eq!(emitter.press_count(Key::VolumeMute), 1);
    }

    #[test]
    fn test_media_key_fallback_does_not_double_toggle() {
        // Arrange
        let emitter = Arc::new(MockKeyEmitter::new());
        let controller = key_only(&emitter);

        // Act
        let first = controller.set_mute(true);
        let second = controller.set_mute(true);

        // Assert
        assert!(first && second);
        assert_eq!(emitter.press_count(Key::VolumeMute), 1);
    }

    #[test]
    fn test_media_key_unmute_when_not_muted_is_noop() {
        let emitter = Arc::new(MockKeyEmitter::new());
        let controller = key_only(&emitter);
        assert!(controller.set_mute(false));
        assert!(emitter.events().is_empty());
    }

    #[test]
    fn test_failed_media_key_keeps_tracked_state() {
        let emitter = Arc::new(MockKeyEmitter::failing());
        let controller = key_only(&emitter);
        assert!(!controller.set_mute(true));

        emitter.set_failing(false);
        assert!(controller.set_mute(true));
        assert_eq!(emitter.press_count(Key::VolumeMute), 1);
    }

    #[test]
    fn test_unsupported_controller_fails() {
        let controller = AudioMuteController::unsupported();
        assert!(!controller.is_supported());
        assert!(!controller.set_mute(true));
    }

    // ── MuteState ─────────────────────────────────────────────────────────────

    #[test]
    fn test_request_mute_takes_ownership_once() {
        // Arrange
        let emitter = Arc::new(MockKeyEmitter::new());
        let controller = key_only(&emitter);
        let state = MuteState::default();

        // Act
        assert!(state.request(true, &controller));
        assert!(state.request(true, &controller));

        // Assert
        assert!(state.muted_by_app());
        assert_eq!(emitter.press_count(Key::VolumeMute), 1);
    }

    #[test]
    fn test_unmute_without_ownership_is_noop() {
        let mut mixer = MockMixerApi::new();
        mixer.expect_name().return_const("mock");
        mixer.expect_set_mute().times(0);
        let controller = AudioMuteController::new(Some(Box::new(mixer)), None);
        let state = MuteState::default();

        assert!(state.request(false, &controller));
        assert!(!state.muted_by_app());
    }

    #[test]
    fn test_release_unmutes_owned_mute() {
        let emitter = Arc::new(MockKeyEmitter::new());
        let controller = key_only(&emitter);
        let state = MuteState::default();
        state.request(true, &controller);

        assert!(state.release(&controller));

        assert!(!state.muted_by_app());
        assert_eq!(emitter.press_count(Key::VolumeMute), 2);
    }

    #[test]
    fn test_release_clears_ownership_even_when_unmute_fails() {
        // Arrange
        let emitter = Arc::new(MockKeyEmitter::new());
        let controller = key_only(&emitter);
        let state = MuteState::default();
        state.request(true, &controller);
        emitter.set_failing(true);

        // Act
        let ok = state.release(&controller);

        // Assert
        assert!(!ok);
        assert!(!state.muted_by_app());
    }

    #[test]
    fn test_failed_unmute_request_keeps_ownership() {
        let emitter = Arc::new(MockKeyEmitter::new());
        let controller = key_only(&emitter);
        let state = MuteState::default();
        state.request(true, &controller);
        emitter.set_failing(true);

        assert!(!state.request(false, &controller));
        assert!(state.muted_by_app());
    }

    #[test]
    fn test_auto_mute_policy_flag_round_trips() {
        let state = MuteState::new(false);
        state.set_auto_mute_enabled(true);
        assert!(state.auto_mute_enabled());
    }
}
