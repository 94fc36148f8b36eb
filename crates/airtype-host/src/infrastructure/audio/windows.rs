//! Windows endpoint-volume mixer.
//!
//! # COM in one paragraph (for beginners)
//!
//! The Windows audio stack is exposed through COM interfaces.  A thread must
//! call `CoInitializeEx` before touching COM, then asks the
//! `MMDeviceEnumerator` for the default render (playback) device, activates
//! that device's `IAudioEndpointVolume` interface, and finally calls
//! `SetMute`.  COM interface pointers are tied to the thread that created
//! them, so everything is created fresh inside each call; the calls happen
//! on blocking worker threads, never on the async executor.

#![cfg(target_os = "windows")]

use windows::Win32::Foundation::BOOL;
use windows::Win32::Media::Audio::Endpoints::IAudioEndpointVolume;
use windows::Win32::Media::Audio::{eConsole, eRender, IMMDeviceEnumerator, MMDeviceEnumerator};
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CLSCTX_ALL, COINIT_MULTITHREADED,
};

use crate::application::mute::{AudioError, MixerApi};

/// `IAudioEndpointVolume` on the default playback device.
#[derive(Debug, Default)]
pub struct EndpointVolumeMixer;

impl EndpointVolumeMixer {
    pub fn new() -> Self {
        Self
    }
}

impl MixerApi for EndpointVolumeMixer {
    fn name(&self) -> &'static str {
        "endpoint-volume"
    }

    fn set_mute(&self, mute: bool) -> Result<(), AudioError> {
        // SAFETY: COM initialisation is per thread and idempotent; S_FALSE
        // and RPC_E_CHANGED_MODE both leave COM usable on this thread.
        let _ = unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) };

        // SAFETY: standard COM activation sequence; every returned interface
        // is reference counted and released when dropped.
        unsafe {
            let enumerator: IMMDeviceEnumerator =
                CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL)
                    .map_err(|e| AudioError::Unavailable(format!("device enumerator: {e}")))?;
            let device = enumerator
                .GetDefaultAudioEndpoint(eRender, eConsole)
                .map_err(|e| AudioError::Unavailable(format!("default endpoint: {e}")))?;
            let volume: IAudioEndpointVolume = device
                .Activate(CLSCTX_ALL, None)
                .map_err(|e| AudioError::Unavailable(format!("endpoint volume: {e}")))?;
            volume
                .SetMute(BOOL::from(mute), std::ptr::null())
                .map_err(|e| AudioError::Mixer(format!("SetMute: {e}")))
        }
    }
}
