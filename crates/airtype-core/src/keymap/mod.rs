//! The small set of physical keys AirType ever presses, and their platform codes.
//!
//! AirType never types text key by key.  Text always goes through the
//! clipboard, so the only keys that are synthesised are the ones that make
//! up a [`ControlKey`] combo plus the hardware volume-mute key.
//!
//! # Why a closed enum? (for beginners)
//!
//! Each platform identifies keys with its own numbering scheme:
//!
//! | Platform | Identifier     | Example (Insert)  |
//! |----------|----------------|-------------------|
//! | Windows  | Virtual Key    | `0x2D`            |
//! | Linux    | X11 KeySym     | `0xff63`          |
//! | macOS    | CGKeyCode      | `0x72`            |
//!
//! Keeping the logical [`Key`] separate from those numbers lets the
//! application layer (and its tests) talk about "press Shift, then Insert"
//! without knowing which operating system it is running on.  The platform
//! emulators translate at the very last moment via the tables in the
//! submodules.

pub mod linux_x11;
pub mod macos_cg;
pub mod windows_vk;

use crate::domain::request::ControlKey;

/// A physical key that AirType may press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Control,
    Shift,
    /// The Windows / Super / Command key.
    Meta,
    Insert,
    V,
    Z,
    Enter,
    Backspace,
    /// The multimedia "mute" key found on most keyboards.
    VolumeMute,
}

impl Key {
    /// Returns `true` for keys that modify other keys rather than act alone.
    pub fn is_modifier(self) -> bool {
        matches!(self, Key::Control | Key::Shift | Key::Meta)
    }
}

/// Modifier used for the "primary" shortcuts (paste, undo).
///
/// macOS applications use Command where everything else uses Control.
#[cfg(target_os = "macos")]
pub const SHORTCUT_MODIFIER: Key = Key::Meta;
#[cfg(not(target_os = "macos"))]
pub const SHORTCUT_MODIFIER: Key = Key::Control;

const ENTER: [Key; 1] = [Key::Enter];
const BACKSPACE: [Key; 1] = [Key::Backspace];
const UNDO: [Key; 2] = [SHORTCUT_MODIFIER, Key::Z];
const SECONDARY_PASTE: [Key; 2] = [Key::Shift, Key::Insert];
const PRIMARY_PASTE: [Key; 2] = [SHORTCUT_MODIFIER, Key::V];

impl ControlKey {
    /// Keys making up this combo, in press order.
    ///
    /// Releases happen in the reverse order, so modifiers are held for the
    /// whole duration of the final key's press.
    pub fn combo(self) -> &'static [Key] {
        match self {
            ControlKey::Enter => &ENTER,
            ControlKey::Backspace => &BACKSPACE,
            ControlKey::Undo => &UNDO,
            ControlKey::SecondaryPasteCombo => &SECONDARY_PASTE,
            ControlKey::PrimaryPasteCombo => &PRIMARY_PASTE,
        }
    }
}

/// Every [`Key`] variant, for table completeness checks.
pub const ALL_KEYS: [Key; 9] = [
    Key::Control,
    Key::Shift,
    Key::Meta,
    Key::Insert,
    Key::V,
    Key::Z,
    Key::Enter,
    Key::Backspace,
    Key::VolumeMute,
];
