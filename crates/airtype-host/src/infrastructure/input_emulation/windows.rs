//! Windows key emission via the SendInput API.
//!
//! Keys are sent by hardware *scan code* (`KEYEVENTF_SCANCODE`) rather than
//! by virtual key.  Console hosts and some games read scan codes only and
//! silently drop VK-only events, which is exactly where the Shift+Insert
//! paste combo matters most.

#![cfg(target_os = "windows")]

use airtype_core::keymap::windows_vk;
use airtype_core::Key;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    GetKeyState, MapVirtualKeyW, SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT,
    KEYBD_EVENT_FLAGS, KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP, KEYEVENTF_SCANCODE,
    MAPVK_VK_TO_VSC, VIRTUAL_KEY,
};

use crate::application::key_sequence::{EmulationError, KeyEmitter};

/// Windows implementation of [`KeyEmitter`] using SendInput.
pub struct WindowsKeyEmitter;

impl WindowsKeyEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsKeyEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyEmitter for WindowsKeyEmitter {
    fn name(&self) -> &'static str {
        "sendinput"
    }

    fn press(&self, key: Key) -> Result<(), EmulationError> {
        send_key(key, false)
    }

    fn release(&self, key: Key) -> Result<(), EmulationError> {
        send_key(key, true)
    }

    fn toggle_state(&self, key: Key) -> Option<bool> {
        let vk = windows_vk::key_to_vk(key);
        // SAFETY: GetKeyState has no preconditions; the low bit is the toggle state.
        let state = unsafe { GetKeyState(i32::from(vk)) };
        Some(state & 1 != 0)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn send_key(key: Key, key_up: bool) -> Result<(), EmulationError> {
    let vk = windows_vk::key_to_vk(key);

    let (w_vk, w_scan, mut flags) = if windows_vk::requires_virtual_key(key) {
        (VIRTUAL_KEY(u16::from(vk)), 0u16, KEYBD_EVENT_FLAGS(0))
    } else {
        // SAFETY: MapVirtualKeyW is a pure table lookup.
        let scan = unsafe { MapVirtualKeyW(u32::from(vk), MAPVK_VK_TO_VSC) };
        if scan == 0 {
            return Err(EmulationError::UnsupportedKey(key));
        }
        let mut flags = KEYEVENTF_SCANCODE;
        if windows_vk::is_extended(key) {
            flags |= KEYEVENTF_EXTENDEDKEY;
        }
        (VIRTUAL_KEY(0), scan as u16, flags)
    };
    if key_up {
        flags |= KEYEVENTF_KEYUP;
    }

    let input = INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: w_vk,
                wScan: w_scan,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    };
    // SAFETY: input is a valid KEYBDINPUT structure on the stack
    let sent = unsafe { SendInput(&[input], std::mem::size_of::<INPUT>() as i32) };
    if sent == 0 {
        return Err(EmulationError::Platform(format!(
            "SendInput rejected {key:?} (blocked by UIPI or another desktop)"
        )));
    }
    Ok(())
}
