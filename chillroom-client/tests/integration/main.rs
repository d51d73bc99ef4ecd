mod chat_tests;
mod signaling_tests;

use chillroom_client::media::{BufferStats, MediaSink};
use chillroom_client::transport::WsConnector;
use chillroom_client::{ChatSession, ClientConfig, SessionEvent, SessionHandle};
use chillroom_core::Credential;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Level;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Spawn a session for `token` and return its handle, event stream and
/// run task.
pub fn start_session<S: MediaSink + 'static>(
    token: &str,
    config: &ClientConfig,
    sink: S,
) -> (
    SessionHandle,
    mpsc::UnboundedReceiver<SessionEvent>,
    JoinHandle<BufferStats>,
) {
    let (session, handle, events) =
        ChatSession::new(Credential::from(token), config, WsConnector, sink);
    let task = tokio::spawn(session.run());
    (handle, events, task)
}
