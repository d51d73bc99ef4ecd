use chillroom_client::ClientError;

use crate::utils::{RecordingSink, next_event};
use crate::{init_tracing, start_session};

#[tokio::test]
async fn test_send_rejected_while_connecting() {
    init_tracing();

    // Accepts TCP but never answers the WebSocket handshake.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local addr");
    let _silent = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    let mut config = chillroom_client::ClientConfig::default();
    config.transport.endpoint = format!("ws://{}/chat/ws", addr);

    let (handle, mut events, task) = start_session("u1", &config, RecordingSink::new());

    let err = handle.send("too early").await.expect_err("Send must fail");
    assert!(matches!(err, ClientError::NotOpen(_)), "got {:?}", err);

    let err = handle.send("   ").await.expect_err("Blank send must fail");
    assert!(matches!(err, ClientError::EmptyMessage), "got {:?}", err);

    handle.close().await;
    let event = next_event(&mut events).await.expect("No disconnect");
    assert!(matches!(event, chillroom_client::SessionEvent::Disconnected(_)));
    task.await.expect("Session task panicked");
}

#[tokio::test]
async fn test_send_after_session_end_fails() {
    init_tracing();

    let mut config = chillroom_client::ClientConfig::default();
    // Nothing listens on port 9 of localhost.
    config.transport.endpoint = "ws://127.0.0.1:9/chat/ws".to_owned();

    let (handle, mut events, task) = start_session("u1", &config, RecordingSink::new());

    let event = next_event(&mut events).await.expect("No disconnect");
    let chillroom_client::SessionEvent::Disconnected(notice) = event else {
        panic!("Expected a disconnect, got {:?}", event);
    };
    assert!(!notice.clean);
    task.await.expect("Session task panicked");

    let err = handle.send("hello").await.expect_err("Send must fail");
    assert!(matches!(err, ClientError::SessionClosed), "got {:?}", err);
}
