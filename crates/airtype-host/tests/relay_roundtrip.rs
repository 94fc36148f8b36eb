//! End-to-end relay test against a local WebSocket server.
//!
//! The test plays the relay: it accepts the host's connection, checks the
//! channel path, then pushes frames the way the phone's messages arrive.
//! Only the well-formed, correctly encrypted text frame may surface as a
//! `RelayEvent::Message`.

use std::time::Duration;

use futures_util::SinkExt;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
use tokio_tungstenite::tungstenite::Message;

use airtype_core::RelayCryptoSession;
use airtype_host::infrastructure::relay::{RelayClient, RelayClientConfig, RelayEvent, RelayStatus};

async fn next_event(rx: &mut mpsc::Receiver<RelayEvent>) -> RelayEvent {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("relay event within 5s")
        .expect("channel open")
}

#[tokio::test]
async fn test_encrypted_text_frame_reaches_host_and_junk_is_dropped() {
    // Arrange: a one-shot relay server.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (path_tx, path_rx) = oneshot::channel::<String>();
    let (done_tx, done_rx) = oneshot::channel::<()>();

    let phone = RelayCryptoSession::derive("hunter2");
    let wrong_room = RelayCryptoSession::derive("something else");
    let good = phone.encrypt("typed on the phone").unwrap().to_json();
    let foreign = wrong_room.encrypt("not for us").unwrap().to_json();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_hdr_async(stream, |req: &Request, resp: Response| {
            let _ = path_tx.send(req.uri().path().to_string());
            Ok(resp)
        })
        .await
        .unwrap();

        for frame in [
            "{not json".to_string(),
            r#"{"type":"presence","peer":"phone"}"#.to_string(),
            r#"{"type":"text","iv":"","data":""}"#.to_string(),
            foreign,
            good,
        ] {
            ws.send(Message::Text(frame)).await.unwrap();
        }
        // Hold the connection open until the test has seen the message.
        let _ = done_rx.await;
        let _ = ws.close(None).await;
    });

    let (tx, mut rx) = mpsc::channel(32);
    let client = RelayClient::new(
        RelayClientConfig {
            base_url: format!("http://{addr}/"),
            password: "  hunter2  ".into(),
            reconnect_interval: Duration::from_secs(60),
            ..Default::default()
        },
        tx,
    )
    .unwrap();

    // Act
    client.start();
    let connecting = next_event(&mut rx).await;
    let connected = next_event(&mut rx).await;
    let message = next_event(&mut rx).await;
    let _ = done_tx.send(());

    // Assert
    assert!(matches!(
        connecting,
        RelayEvent::Status { status: RelayStatus::Connecting, .. }
    ));
    assert_eq!(
        connected,
        RelayEvent::Status {
            status: RelayStatus::Connected,
            message: "Connected to relay".to_string()
        }
    );
    assert_eq!(message, RelayEvent::Message("typed on the phone".to_string()));
    assert_eq!(path_rx.await.unwrap(), format!("/ws/{}", phone.channel_id()));

    // Peer close → disconnected, then the client would retry after the backoff.
    let after_close = next_event(&mut rx).await;
    assert!(matches!(
        after_close,
        RelayEvent::Status { status: RelayStatus::Disconnected, .. }
    ));

    client.stop();
    server.await.unwrap();
}
