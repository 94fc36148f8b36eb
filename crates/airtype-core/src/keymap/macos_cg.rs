//! [`Key`] to macOS `CGKeyCode` translation.
//!
//! CGKeyCode values are defined in `HIToolbox/Events.h` (`kVK_*`).  They name
//! physical key positions on an ANSI keyboard, not characters.

use super::Key;

/// Translates a [`Key`] to a macOS `CGKeyCode`.
///
/// Returns `None` for the volume-mute key: macOS delivers media keys as
/// `NSSystemDefined` events, which cannot be synthesised as keyboard events.
pub fn key_to_cgkeycode(key: Key) -> Option<u16> {
    match key {
        Key::Control => Some(0x3B),   // kVK_Control
        Key::Shift => Some(0x38),     // kVK_Shift
        Key::Meta => Some(0x37),      // kVK_Command
        Key::Insert => Some(0x72),    // kVK_Help (Insert on PC keyboards)
        Key::V => Some(0x09),         // kVK_ANSI_V
        Key::Z => Some(0x06),         // kVK_ANSI_Z
        Key::Enter => Some(0x24),     // kVK_Return
        Key::Backspace => Some(0x33), // kVK_Delete
        Key::VolumeMute => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_and_v_map_to_ansi_positions() {
        assert_eq!(key_to_cgkeycode(Key::Meta), Some(0x37));
        assert_eq!(key_to_cgkeycode(Key::V), Some(0x09));
    }

    #[test]
    fn test_volume_mute_has_no_keycode() {
        assert_eq!(key_to_cgkeycode(Key::VolumeMute), None);
    }
}
