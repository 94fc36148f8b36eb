//! [`Key`] to Windows Virtual Key (VK) code translation.
//!
//! Reference: https://learn.microsoft.com/windows/win32/inputdev/virtual-key-codes
//!
//! # Extended keys (for beginners)
//!
//! On the original IBM AT keyboard some keys (Insert, Delete, the arrow
//! cluster, the right-hand Ctrl/Alt) were added later and share scan codes
//! with numpad keys.  Windows tells them apart with an "extended" bit.  When
//! input is injected by *scan code* rather than by VK, the injector must set
//! `KEYEVENTF_EXTENDEDKEY` for these keys or Windows will see the numpad
//! variant instead (numpad 0 rather than Insert).

use super::Key;

/// Translates a [`Key`] to its Windows VK code.
pub fn key_to_vk(key: Key) -> u8 {
    match key {
        Key::Control => 0x11,    // VK_CONTROL
        Key::Shift => 0x10,      // VK_SHIFT
        Key::Meta => 0x5B,       // VK_LWIN
        Key::Insert => 0x2D,     // VK_INSERT
        Key::V => 0x56,          // 'V'
        Key::Z => 0x5A,          // 'Z'
        Key::Enter => 0x0D,      // VK_RETURN
        Key::Backspace => 0x08,  // VK_BACK
        Key::VolumeMute => 0xAD, // VK_VOLUME_MUTE
    }
}

/// Returns `true` if the key must carry `KEYEVENTF_EXTENDEDKEY` when sent by scan code.
pub fn is_extended(key: Key) -> bool {
    matches!(key, Key::Insert | Key::Meta)
}

/// Returns `true` if the key has no scan code and must be injected by VK.
///
/// Multimedia keys are delivered through the HID consumer page on real
/// keyboards; `MapVirtualKey` returns 0 for them.
pub fn requires_virtual_key(key: Key) -> bool {
    matches!(key, Key::VolumeMute)
}
