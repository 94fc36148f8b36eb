//! Relay channel security and framing.
//!
//! When the phone cannot reach the desktop directly (different networks,
//! client isolation on a guest Wi-Fi), both sides connect outbound to a
//! hosted WebSocket relay instead.  The relay only forwards opaque frames;
//! it never sees plaintext.
//!
//! # How the channel is secured (for beginners)
//!
//! ```text
//! password ──SHA-256──► 32-byte digest ─┬─► AES-256-GCM key  (kept secret)
//!                                       └─► hex string       (public channel id)
//! ```
//!
//! Both ends derive the same digest from the shared password, so they land
//! in the same relay room and can decrypt each other's frames.  Anyone who
//! knows the channel id can join the room, but without the password they
//! cannot recover the key, so the frames stay unreadable.
//!
//! - [`crypto`]   – key derivation, AES-GCM encrypt/decrypt.
//! - [`frame`]    – the JSON envelope carried in each WebSocket text message.
//! - [`endpoint`] – turning a configured relay URL into a WebSocket URL.

pub mod crypto;
pub mod endpoint;
pub mod frame;

pub use crypto::{RelayCryptoError, RelayCryptoSession, DEFAULT_PASSWORD};
pub use endpoint::{relay_endpoint, RelayConfigError};
pub use frame::{parse_frame, EncryptedText, FrameError, RelayFrame};
