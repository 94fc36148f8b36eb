//! JSON envelope carried in relay WebSocket text messages.
//!
//! ```json
//! {"type": "text", "iv": "<base64 12-byte nonce>", "data": "<base64 ciphertext+tag>"}
//! ```
//!
//! `type` is optional and defaults to `"text"`; it is compared
//! case-insensitively.  Frames of any other type are surfaced as
//! [`RelayFrame::Other`] so callers can ignore them without treating them as
//! errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while parsing an inbound relay message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame is not a JSON object: {0}")]
    Malformed(String),

    #[error("frame is missing non-empty field `{0}`")]
    MissingField(&'static str),
}

/// A parsed relay frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayFrame {
    /// Encrypted text to inject.
    Text(EncryptedText),
    /// Any other frame type, lowercased.
    Other(String),
}

/// A nonce/ciphertext pair, both base64 encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedText {
    pub iv: String,
    pub data: String,
}

impl EncryptedText {
    /// Serialises as a complete `"type": "text"` frame.
    pub fn to_json(&self) -> String {
        serde_json::json!({
            "type": "text",
            "iv": self.iv,
            "data": self.data,
        })
        .to_string()
    }
}

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    iv: Option<String>,
    #[serde(default)]
    data: Option<String>,
}

/// Parses one inbound relay text message.
pub fn parse_frame(raw: &str) -> Result<RelayFrame, FrameError> {
    let envelope: RawEnvelope =
        serde_json::from_str(raw).map_err(|e| FrameError::Malformed(e.to_string()))?;

    let kind = envelope
        .kind
        .map(|k| k.to_ascii_lowercase())
        .unwrap_or_else(|| "text".to_string());
    if kind != "text" {
        tracing::trace!(kind = %kind, "non-text relay frame");
        return Ok(RelayFrame::Other(kind));
    }

    let iv = envelope
        .iv
        .filter(|v| !v.is_empty())
        .ok_or(FrameError::MissingField("iv"))?;
    let data = envelope
        .data
        .filter(|v| !v.is_empty())
        .ok_or(FrameError::MissingField("data"))?;

    Ok(RelayFrame::Text(EncryptedText { iv, data }))
}
