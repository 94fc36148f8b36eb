//! `MixerApi` implementations.
//!
//! | Platform | Mechanism                                        |
//! |----------|--------------------------------------------------|
//! | Windows  | `IAudioEndpointVolume::SetMute` through COM      |
//! | Linux    | `pactl set-sink-mute @DEFAULT_SINK@ 1/0`         |
//! | macOS    | `osascript -e "set volume output muted …"`       |
//!
//! All three *set* the mute flag rather than toggle it, and none shows an
//! on-screen volume indicator.

use crate::application::mute::MixerApi;

#[cfg(any(target_os = "linux", target_os = "macos"))]
pub mod command;

#[cfg(target_os = "windows")]
pub mod windows;

/// The silent mixer for this platform, if there is one.
pub fn platform_mixer() -> Option<Box<dyn MixerApi>> {
    #[cfg(target_os = "windows")]
    {
        Some(Box::new(windows::EndpointVolumeMixer::new()))
    }
    #[cfg(target_os = "linux")]
    {
        Some(Box::new(command::CommandMixer::pactl()))
    }
    #[cfg(target_os = "macos")]
    {
        Some(Box::new(command::CommandMixer::osascript()))
    }
    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}
