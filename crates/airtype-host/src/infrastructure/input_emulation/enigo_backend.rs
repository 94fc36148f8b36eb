//! Portable key emission through the `enigo` crate.
//!
//! Used only after the native emitter failed.  A fresh `Enigo` connection is
//! opened for every event: the native handle types behind it are not
//! guaranteed to be `Send`, and this path is rare enough that the extra
//! setup cost does not matter.

use airtype_core::Key;
use enigo::{Direction, Enigo, Keyboard, Settings};

use crate::application::key_sequence::{EmulationError, KeyEmitter};

/// Fallback [`KeyEmitter`] backed by `enigo`.
#[derive(Debug, Default)]
pub struct EnigoKeyEmitter;

impl EnigoKeyEmitter {
    pub fn new() -> Self {
        Self
    }

    fn send(&self, key: Key, direction: Direction) -> Result<(), EmulationError> {
        let mut enigo = Enigo::new(&Settings::default())
            .map_err(|e| EmulationError::Platform(format!("enigo init: {e}")))?;
        enigo
            .key(to_enigo(key), direction)
            .map_err(|e| EmulationError::Platform(format!("enigo {key:?}: {e}")))
    }
}

fn to_enigo(key: Key) -> enigo::Key {
    match key {
        Key::Control => enigo::Key::Control,
        Key::Shift => enigo::Key::Shift,
        Key::Meta => enigo::Key::Meta,
        #[cfg(not(target_os = "macos"))]
        Key::Insert => enigo::Key::Insert,
        // macOS keyboards label this key "Help"; kVK_Help.
        #[cfg(target_os = "macos")]
        Key::Insert => enigo::Key::Other(0x72),
        Key::V => enigo::Key::Unicode('v'),
        Key::Z => enigo::Key::Unicode('z'),
        Key::Enter => enigo::Key::Return,
        Key::Backspace => enigo::Key::Backspace,
        Key::VolumeMute => enigo::Key::VolumeMute,
    }
}

impl KeyEmitter for EnigoKeyEmitter {
    fn name(&self) -> &'static str {
        "enigo"
    }

    fn press(&self, key: Key) -> Result<(), EmulationError> {
        self.send(key, Direction::Press)
    }

    fn release(&self, key: Key) -> Result<(), EmulationError> {
        self.send(key, Direction::Release)
    }
}
