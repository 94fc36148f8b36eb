//! Integration tests for the relay channel as seen from the phone and the desktop.
//!
//! Each test plays both roles through the public API: the "phone" derives a
//! session, encrypts text and serialises a frame; the "desktop" derives its
//! own session from the same password, parses the frame and decrypts it.

use airtype_core::{
    parse_frame, relay_endpoint, RelayCryptoError, RelayCryptoSession, RelayFrame,
    DEFAULT_PASSWORD,
};

/// Simulates the phone side producing one wire message.
fn phone_sends(password: &str, text: &str) -> String {
    RelayCryptoSession::derive(password)
        .encrypt(text)
        .expect("encryption must succeed")
        .to_json()
}

/// Simulates the desktop side consuming one wire message.
fn desktop_receives(password: &str, wire: &str) -> Result<String, RelayCryptoError> {
    let session = RelayCryptoSession::derive(password);
    match parse_frame(wire).expect("frame must parse") {
        RelayFrame::Text(sealed) => session.decrypt(&sealed.iv, &sealed.data),
        RelayFrame::Other(kind) => panic!("unexpected frame type {kind}"),
    }
}

#[test]
fn test_same_password_delivers_text() {
    let wire = phone_sends("correct horse", "hello desktop");
    assert_eq!(
        desktop_receives("correct horse", &wire).unwrap(),
        "hello desktop"
    );
}

#[test]
fn test_different_password_cannot_read_frame() {
    let wire = phone_sends("alpha", "secret");
    assert_eq!(
        desktop_receives("beta", &wire),
        Err(RelayCryptoError::Decryption)
    );
}

#[test]
fn test_different_passwords_land_in_different_rooms() {
    let a = RelayCryptoSession::derive("alpha");
    let b = RelayCryptoSession::derive("beta");
    assert_ne!(a.channel_id(), b.channel_id());
    assert_eq!(a.channel_id().len(), 64);
    assert!(a
        .channel_id()
        .chars()
        .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn test_unconfigured_phone_and_desktop_share_default_room() {
    let wire = phone_sends(DEFAULT_PASSWORD, "hi");
    assert_eq!(desktop_receives("", &wire).unwrap(), "hi");
}

#[test]
fn test_endpoint_embeds_channel_id() {
    let session = RelayCryptoSession::derive("pw");
    let url = relay_endpoint("https://relay.example.com/", session.channel_id()).unwrap();
    assert_eq!(
        url,
        format!("wss://relay.example.com/ws/{}", session.channel_id())
    );
}

#[test]
fn test_each_encryption_uses_fresh_nonce() {
    let session = RelayCryptoSession::derive("pw");
    let first = session.encrypt("same").unwrap();
    let second = session.encrypt("same").unwrap();
    assert_ne!(first.iv, second.iv);
    assert_ne!(first.data, second.data);
}
