//! macOS key emission via CoreGraphics.
//!
//! # What is CoreGraphics event injection? (for beginners)
//!
//! `CGEventPost` injects a synthesized event into the HID event stream, the
//! same level as physical keyboard input.  Each key event is built from an
//! event source created with `HIDSystemState`, which makes modifier keys
//! pressed through earlier events apply to later ones (Command stays held
//! while V goes down).
//!
//! # Accessibility permission
//!
//! Posting at the HID tap requires the **Accessibility** permission (System
//! Settings → Privacy & Security → Accessibility).  Without it macOS drops
//! the events silently.

#![cfg(target_os = "macos")]

use airtype_core::keymap::macos_cg;
use airtype_core::Key;
use core_graphics::event::{CGEvent, CGEventTapLocation};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};

use crate::application::key_sequence::{EmulationError, KeyEmitter};

/// macOS CoreGraphics key emitter.
pub struct MacosKeyEmitter;

impl MacosKeyEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MacosKeyEmitter {
    fn default() -> Self {
        Self::new()
    }
}

fn post_key(key: Key, key_down: bool) -> Result<(), EmulationError> {
    let code = macos_cg::key_to_cgkeycode(key).ok_or(EmulationError::UnsupportedKey(key))?;
    let source = CGEventSource::new(CGEventSourceStateID::HIDSystemState)
        .map_err(|_| EmulationError::Platform("CGEventSourceCreate failed".into()))?;
    let event = CGEvent::new_keyboard_event(source, code, key_down)
        .map_err(|_| EmulationError::Platform("CGEventCreateKeyboardEvent failed".into()))?;
    event.post(CGEventTapLocation::HID);
    Ok(())
}

impl KeyEmitter for MacosKeyEmitter {
    fn name(&self) -> &'static str {
        "coregraphics"
    }

    fn press(&self, key: Key) -> Result<(), EmulationError> {
        post_key(key, true)
    }

    fn release(&self, key: Key) -> Result<(), EmulationError> {
        post_key(key, false)
    }
}
