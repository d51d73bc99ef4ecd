use bytes::Bytes;
use chillroom_client::media::AdmissionPolicy;

use crate::utils::{MockChatServer, OfferReply, RecordingSink, wait_for_connected, wait_for_message};
use crate::{init_tracing, start_session};

const MARKER: &str = r#"{"senderIdentity":"server","content":"marker"}"#;

#[tokio::test]
async fn test_queue_policy_holds_chunks() {
    init_tracing();

    let server = MockChatServer::start(OfferReply::Status(404))
        .await
        .expect("Failed to start mock server");
    let mut config = server.client_config();
    config.media.policy = AdmissionPolicy::Queue { capacity: 2 };

    let sink = RecordingSink::new();
    let (handle, mut events, task) = start_session("u1", &config, sink.clone());
    wait_for_connected(&mut events).await.expect("Not connected");
    assert!(server.wait_for_connections(1, 5000).await);

    for chunk in [&b"c1"[..], b"c2", b"c3", b"c4"] {
        server.push_binary(Bytes::copy_from_slice(chunk));
    }
    server.push_text(MARKER);
    wait_for_message(&mut events).await.expect("No marker");

    // c1 in flight, c2 evicted when c4 arrived at a full queue.
    assert_eq!(sink.appended(), vec![Bytes::from_static(b"c1")]);

    sink.complete_append();
    server.push_text(MARKER);
    wait_for_message(&mut events).await.expect("No marker");
    assert_eq!(
        sink.appended(),
        vec![Bytes::from_static(b"c1"), Bytes::from_static(b"c3")]
    );

    sink.complete_append();
    server.push_text(MARKER);
    wait_for_message(&mut events).await.expect("No marker");
    assert_eq!(
        sink.appended(),
        vec![
            Bytes::from_static(b"c1"),
            Bytes::from_static(b"c3"),
            Bytes::from_static(b"c4"),
        ]
    );

    handle.close().await;
    let stats = task.await.expect("Session task panicked");
    assert_eq!(stats.appended, 3);
    assert_eq!(stats.dropped, 1);
}
