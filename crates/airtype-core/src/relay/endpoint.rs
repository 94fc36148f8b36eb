//! Relay URL normalisation.

use thiserror::Error;

/// Errors in the relay connection settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelayConfigError {
    #[error("relay URL is empty")]
    MissingUrl,
}

/// Builds the WebSocket URL for a channel on the given relay.
///
/// | Configured base        | Result                        |
/// |------------------------|-------------------------------|
/// | `https://relay.dev`    | `wss://relay.dev/ws/<id>`     |
/// | `http://10.0.0.2:8080` | `ws://10.0.0.2:8080/ws/<id>`  |
/// | `ws://` or `wss://…`   | kept as is                    |
/// | `relay.dev`            | `wss://relay.dev/ws/<id>`     |
///
/// Trailing slashes on the base are dropped.
pub fn relay_endpoint(base_url: &str, channel_id: &str) -> Result<String, RelayConfigError> {
    let base = base_url.trim().trim_end_matches('/');
    if base.is_empty() {
        return Err(RelayConfigError::MissingUrl);
    }

    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if base.starts_with("ws://") || base.starts_with("wss://") {
        base.to_string()
    } else {
        format!("wss://{base}")
    };

    Ok(format!("{ws_base}/ws/{channel_id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_https_becomes_wss() {
        assert_eq!(
            relay_endpoint("https://relay.example.com", "abc").unwrap(),
            "wss://relay.example.com/ws/abc"
        );
    }

    #[test]
    fn test_http_becomes_ws() {
        assert_eq!(
            relay_endpoint("http://127.0.0.1:9000/", "abc").unwrap(),
            "ws://127.0.0.1:9000/ws/abc"
        );
    }

    #[test]
    fn test_ws_schemes_are_kept() {
        assert_eq!(
            relay_endpoint("ws://localhost:1", "c").unwrap(),
            "ws://localhost:1/ws/c"
        );
        assert_eq!(
            relay_endpoint("wss://r.io", "c").unwrap(),
            "wss://r.io/ws/c"
        );
    }

    #[test]
    fn test_bare_host_gets_wss() {
        assert_eq!(relay_endpoint("r.io", "c").unwrap(), "wss://r.io/ws/c");
    }

    #[test]
    fn test_empty_url_is_an_error() {
        assert_eq!(relay_endpoint("  ", "c"), Err(RelayConfigError::MissingUrl));
    }
}
