//! # airtype-core
//!
//! Shared library for AirType containing the request model, the key tables
//! used for control-key emulation, and the relay encryption/framing code.
//!
//! This crate is used by the desktop host application.  It has zero
//! dependencies on OS APIs, UI frameworks, or network sockets.
//!
//! # Architecture overview (for beginners)
//!
//! AirType turns a phone browser into a wireless keyboard for a desktop
//! computer.  Text typed on the phone reaches the desktop either as a plain
//! HTTP request on the local network, or as an encrypted message pushed
//! through a hosted relay.  The desktop then pastes the text into whatever
//! application currently has focus.
//!
//! This crate (`airtype-core`) is the shared foundation.  It defines:
//!
//! - **`domain`** – What a request looks like.  A request is either literal
//!   text or one of a few control keys (Enter, Backspace, Undo).  The paste
//!   settings shared by every request also live here.
//!
//! - **`keymap`** – Which physical keys make up each control-key combo
//!   (e.g. Shift+Insert for the terminal-friendly paste) and how those keys
//!   translate to Windows VK codes, X11 KeySyms and macOS CGKeyCodes.
//!
//! - **`relay`** – How the relay channel is secured.  A shared password is
//!   hashed into both the AES-256-GCM key and the public channel identifier,
//!   and inbound JSON frames are parsed and decrypted here.

pub mod domain;
pub mod keymap;
pub mod relay;

// Re-export the most-used types at the crate root so callers can write
// `airtype_core::InjectionRequest` instead of the full module path.
pub use domain::request::{ControlKey, InjectionRequest, TypeRequest};
pub use domain::settings::{PasteConfig, SharedPasteConfig};
pub use keymap::Key;
pub use relay::crypto::{RelayCryptoError, RelayCryptoSession, DEFAULT_PASSWORD};
pub use relay::endpoint::{relay_endpoint, RelayConfigError};
pub use relay::frame::{parse_frame, EncryptedText, FrameError, RelayFrame};
