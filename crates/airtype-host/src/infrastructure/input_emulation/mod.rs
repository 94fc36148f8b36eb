//! Platform-specific key emitters.
//!
//! The native implementation is selected at compile time via
//! `#[cfg(target_os = ...)]`.  The portable `enigo` emitter is always built
//! and sits behind the native one as a fallback.

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::key_sequence::{EmulationError, KeyEmitter};

pub mod enigo_backend;
pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "macos")]
pub mod macos;

/// Creates the native emitter for the compile target.
pub fn native_emitter() -> Result<Arc<dyn KeyEmitter>, EmulationError> {
    #[cfg(target_os = "windows")]
    {
        Ok(Arc::new(windows::WindowsKeyEmitter::new()))
    }
    #[cfg(target_os = "linux")]
    {
        Ok(Arc::new(linux::X11KeyEmitter::new()?))
    }
    #[cfg(target_os = "macos")]
    {
        Ok(Arc::new(macos::MacosKeyEmitter::new()))
    }
    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        Err(EmulationError::NotInitialized)
    }
}

/// Emitters in priority order: native first, then the portable fallback.
///
/// An emitter that cannot be created is skipped with a warning; the result
/// may be empty on a headless machine.
pub fn platform_emitters() -> Vec<Arc<dyn KeyEmitter>> {
    let mut emitters: Vec<Arc<dyn KeyEmitter>> = Vec::with_capacity(2);
    match native_emitter() {
        Ok(emitter) => emitters.push(emitter),
        Err(e) => warn!("native key emitter unavailable: {e}"),
    }
    emitters.push(Arc::new(enigo_backend::EnigoKeyEmitter::new()));
    info!(
        emitters = ?emitters.iter().map(|e| e.name()).collect::<Vec<_>>(),
        "key emitters ready"
    );
    emitters
}
