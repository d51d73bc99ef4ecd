use chillroom_client::ClientError;
use chillroom_client::signaling::MediaControl;
use chillroom_core::MediaTrigger;

use crate::init_tracing;
use crate::utils::{MockChatServer, OfferReply};

#[tokio::test]
async fn test_media_trigger() {
    init_tracing();

    let server = MockChatServer::start(OfferReply::Status(404))
        .await
        .expect("Failed to start mock server");
    let control = MediaControl::new(&server.client_config().signaling).expect("Failed to build client");

    let request = MediaTrigger {
        bucket: "movies".into(),
        key: "trailer.mp4".into(),
    };
    let reply = control.trigger(&request).await.expect("Trigger failed");

    assert_eq!(reply, "Trigger media successfully");
    assert_eq!(server.triggers().await, vec![request]);
}

#[tokio::test]
async fn test_media_trigger_reports_http_errors() {
    init_tracing();

    let server = MockChatServer::start(OfferReply::Status(404))
        .await
        .expect("Failed to start mock server");
    let mut config = server.client_config();
    config.signaling.media_trigger_url = config.signaling.media_trigger_url.replace("/chat/media", "/missing");

    let control = MediaControl::new(&config.signaling).expect("Failed to build client");
    let err = control
        .trigger(&MediaTrigger {
            bucket: "b".into(),
            key: "k".into(),
        })
        .await
        .expect_err("Trigger should fail");
    assert!(matches!(err, ClientError::HttpStatus(404)), "got {:?}", err);
}
