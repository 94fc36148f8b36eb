//! Password-derived AES-256-GCM session for relay frames.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use data_encoding::HEXLOWER;
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::frame::EncryptedText;

/// Password used when the configured one is empty or whitespace.
///
/// The phone page applies the same substitution, so an unconfigured phone and
/// an unconfigured desktop still meet in the same relay room.
pub const DEFAULT_PASSWORD: &str = "noset";

/// AES-GCM nonce size (96 bits).
pub const NONCE_LEN: usize = 12;

/// Errors that can occur while decrypting a relay frame.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelayCryptoError {
    #[error("field `{field}` is not valid base64")]
    InvalidBase64 { field: &'static str },

    #[error("nonce must be {NONCE_LEN} bytes, got {0}")]
    InvalidNonceLength(usize),

    /// Wrong key, tampered ciphertext, or truncated tag.  AES-GCM does not
    /// distinguish between these.
    #[error("authentication failed while decrypting frame")]
    Decryption,

    #[error("decrypted payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("encryption failed")]
    Encryption,
}

/// Key material and channel id derived from one password.
///
/// Immutable after [`derive`](Self::derive); the channel id is a pure
/// function of the key, and the key is a pure function of the password.
#[derive(Clone)]
pub struct RelayCryptoSession {
    key: [u8; 32],
    channel_id: String,
}

impl RelayCryptoSession {
    /// Derives the session from a password.
    ///
    /// Leading/trailing whitespace is ignored and an empty password is
    /// replaced by [`DEFAULT_PASSWORD`].
    pub fn derive(password: &str) -> Self {
        let trimmed = password.trim();
        let effective = if trimmed.is_empty() {
            DEFAULT_PASSWORD
        } else {
            trimmed
        };

        let key: [u8; 32] = Sha256::digest(effective.as_bytes()).into();
        let channel_id = HEXLOWER.encode(&key);
        Self { key, channel_id }
    }

    /// 64 lowercase hex characters identifying the relay room.
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(aes_gcm::Key::<Aes256Gcm>::from_slice(&self.key))
    }

    /// Decrypts a base64 nonce + base64 ciphertext-with-tag into UTF-8 text.
    pub fn decrypt(&self, iv_b64: &str, data_b64: &str) -> Result<String, RelayCryptoError> {
        let nonce_bytes = BASE64
            .decode(iv_b64)
            .map_err(|_| RelayCryptoError::InvalidBase64 { field: "iv" })?;
        if nonce_bytes.len() != NONCE_LEN {
            return Err(RelayCryptoError::InvalidNonceLength(nonce_bytes.len()));
        }
        let ciphertext = BASE64
            .decode(data_b64)
            .map_err(|_| RelayCryptoError::InvalidBase64 { field: "data" })?;

        let plaintext = self
            .cipher()
            .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
            .map_err(|_| RelayCryptoError::Decryption)?;

        String::from_utf8(plaintext).map_err(|_| RelayCryptoError::InvalidUtf8)
    }

    /// Encrypts text with a fresh random nonce.
    ///
    /// The desktop only ever receives, but the phone side and the tests need
    /// the forward direction.
    pub fn encrypt(&self, plaintext: &str) -> Result<EncryptedText, RelayCryptoError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce_bytes);

        let ciphertext = self
            .cipher()
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|_| RelayCryptoError::Encryption)?;

        Ok(EncryptedText {
            iv: BASE64.encode(nonce_bytes),
            data: BASE64.encode(ciphertext),
        })
    }
}

impl std::fmt::Debug for RelayCryptoSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayCryptoSession")
            .field("key", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .finish()
    }
}
