//! Infrastructure layer for the host application.
//!
//! Contains OS-facing adapters and the two network front ends.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `airtype_core`, but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`input_emulation`** – OS-specific implementations of `KeyEmitter`.
//!   The native implementation is selected at compile time using
//!   `#[cfg(target_os)]`; a portable `enigo` emitter serves as fallback.  A
//!   `MockKeyEmitter` is also provided for tests.
//!
//! - **`clipboard`** – `ClipboardBackend` implementations on top of `arboard`,
//!   plus an in-memory mock.
//!
//! - **`audio`** – `MixerApi` implementations: the Windows endpoint-volume
//!   COM interface, and command-line mixers on Linux and macOS.
//!
//! - **`http_server`** – The LAN-mode axum server.
//!
//! - **`relay`** – The relay-mode WebSocket client with automatic reconnect.
//!
//! - **`storage`** – TOML configuration file.

pub mod audio;
pub mod clipboard;
pub mod http_server;
pub mod input_emulation;
pub mod relay;
pub mod storage;
