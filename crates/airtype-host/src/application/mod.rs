//! Application layer use cases for the host.
//!
//! # What use cases does the host have?
//!
//! - **`key_sequence`** – Presses and releases keys through a `KeyEmitter`
//!   and guarantees nothing is left held down, even when emission fails
//!   half-way through a combo.
//!
//! - **`clipboard_bridge`** – Reads and writes clipboard text through an
//!   ordered list of clipboard backends; the first one that works wins.
//!
//! - **`inject_text`** – The `KeyInjector`: pastes text through the clipboard
//!   and sends the fixed control keys (Enter, Backspace, Undo).
//!
//! - **`mute`** – Mutes and unmutes system output, and remembers whether a
//!   mute currently in force was put there by this process.
//!
//! - **`handle_request`** – Turns the LAN API's JSON bodies into calls on the
//!   use cases above and builds the JSON answers.
//!
//! Every OS-specific piece (the real key emitter, the real clipboard, the
//! real mixer) is injected as a trait object, so each use case can be tested
//! with in-memory mocks.

pub mod clipboard_bridge;
pub mod handle_request;
pub mod inject_text;
pub mod key_sequence;
pub mod mute;
