//! [`Key`] to X11 KeySym translation.
//!
//! KeySym values come from `<X11/keysymdef.h>` and `<X11/XF86keysym.h>`.
//! The emulator converts a KeySym into a server keycode with
//! `XKeysymToKeycode` before calling `XTestFakeKeyEvent`.

use super::Key;

/// Translates a [`Key`] to its X11 KeySym.
pub fn key_to_keysym(key: Key) -> u32 {
    match key {
        Key::Control => 0xffe3,         // XK_Control_L
        Key::Shift => 0xffe1,           // XK_Shift_L
        Key::Meta => 0xffeb,            // XK_Super_L
        Key::Insert => 0xff63,          // XK_Insert
        Key::V => 0x0076,               // XK_v
        Key::Z => 0x007a,               // XK_z
        Key::Enter => 0xff0d,           // XK_Return
        Key::Backspace => 0xff08,       // XK_BackSpace
        Key::VolumeMute => 0x1008ff12,  // XF86XK_AudioMute
    }
}
