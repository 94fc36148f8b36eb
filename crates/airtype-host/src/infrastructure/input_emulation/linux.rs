//! Linux X11 key emission via the XTest extension.
//!
//! # What is XTest? (for beginners)
//!
//! XTest is an X11 protocol extension that lets a process synthesize keyboard
//! events as if the user had physically pressed keys.  The events are
//! delivered to the focused window exactly like real input.
//!
//! `XTestFakeKeyEvent` takes an X11 *keycode* (a server-specific number), not
//! a KeySym, so every key goes through:
//!
//! ```text
//! Key → X11 KeySym (airtype_core::keymap::linux_x11) → XKeysymToKeycode → keycode
//! ```
//!
//! # Permissions
//!
//! XTest requires access to the X display named by `DISPLAY`.  Under a pure
//! Wayland session without XWayland the constructor fails and the host falls
//! back to the portable emitter.

#![cfg(target_os = "linux")]

use std::ptr;
use std::sync::{Mutex, PoisonError};

use airtype_core::keymap::linux_x11;
use airtype_core::Key;
use x11::{xlib, xtest};

use crate::application::key_sequence::{EmulationError, KeyEmitter};

/// Passing `CurrentTime` (0) means "deliver immediately".
const CURRENT_TIME: xlib::Time = 0;

struct DisplayHandle(*mut xlib::Display);

// SAFETY: the pointer is only dereferenced by Xlib while the surrounding
// Mutex is held, so no two threads use the connection at once.
unsafe impl Send for DisplayHandle {}

/// Linux X11/XTest key emitter.
pub struct X11KeyEmitter {
    display: Mutex<DisplayHandle>,
}

impl X11KeyEmitter {
    /// Connects to the X display.
    ///
    /// # Errors
    ///
    /// Returns `EmulationError::Platform` if the X display cannot be opened.
    pub fn new() -> Result<Self, EmulationError> {
        // SAFETY: a null name means "use $DISPLAY".
        let display = unsafe { xlib::XOpenDisplay(ptr::null()) };
        if display.is_null() {
            return Err(EmulationError::Platform(
                "cannot open X display (is DISPLAY set?)".into(),
            ));
        }
        Ok(Self {
            display: Mutex::new(DisplayHandle(display)),
        })
    }

    fn fake_key(&self, key: Key, is_press: bool) -> Result<(), EmulationError> {
        let keysym = linux_x11::key_to_keysym(key);
        let handle = self.display.lock().unwrap_or_else(PoisonError::into_inner);

        // SAFETY: handle.0 is a live display opened in `new` and closed only on drop.
        let keycode = unsafe { xlib::XKeysymToKeycode(handle.0, xlib::KeySym::from(keysym)) };
        if keycode == 0 {
            return Err(EmulationError::UnsupportedKey(key));
        }

        // SAFETY: as above.
        let sent = unsafe {
            let sent = xtest::XTestFakeKeyEvent(
                handle.0,
                u32::from(keycode),
                i32::from(is_press),
                CURRENT_TIME,
            );
            xlib::XFlush(handle.0);
            sent
        };
        if sent == 0 {
            return Err(EmulationError::Platform(format!(
                "XTestFakeKeyEvent failed for {key:?}"
            )));
        }
        Ok(())
    }
}

impl KeyEmitter for X11KeyEmitter {
    fn name(&self) -> &'static str {
        "xtest"
    }

    fn press(&self, key: Key) -> Result<(), EmulationError> {
        self.fake_key(key, true)
    }

    fn release(&self, key: Key) -> Result<(), EmulationError> {
        self.fake_key(key, false)
    }
}

impl Drop for X11KeyEmitter {
    fn drop(&mut self) {
        let handle = self
            .display
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        // SAFETY: the display was opened in `new` and is closed exactly once.
        unsafe {
            xlib::XCloseDisplay(handle.0);
        }
    }
}
