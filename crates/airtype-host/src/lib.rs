//! airtype-host library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does the host do? (for beginners)
//!
//! The host runs on the desktop computer that should receive the typing.
//! A phone (usually a browser page using the phone's own speech-to-text or
//! keyboard) sends it short pieces of text, and the host makes that text
//! appear in whichever desktop application currently has focus.
//!
//! Text reaches the host in one of two ways:
//!
//! 1. **LAN mode** – the phone sends `POST /type` to a small HTTP server the
//!    host runs on the local network.
//! 2. **Relay mode** – both devices connect outbound to a hosted WebSocket
//!    relay and exchange AES-GCM encrypted frames through it.
//!
//! Either way the host pastes the text: it puts the text on the clipboard,
//! synthesises the paste shortcut, and optionally puts the user's previous
//! clipboard content back afterwards.  It can also mute system audio while
//! the phone is dictating, so the desktop's speakers do not feed back into
//! the phone's microphone.

/// Application layer: use cases, independent of any OS API.
pub mod application;

/// Infrastructure layer: OS adapters, the HTTP server and the relay client.
pub mod infrastructure;
