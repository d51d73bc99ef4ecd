use chillroom_core::utils::DEFAULT_WS_URL;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Full-duplex endpoint carrying chat and media frames.
    pub endpoint: String,
    /// Upper bound on the WebSocket handshake. `None` leaves it to the OS.
    pub connect_timeout_ms: Option<u64>,
    /// How long to wait for the server to answer our close frame before
    /// dropping the socket.
    pub close_timeout_ms: u64,
    /// Inbound events buffered between the socket task and the session loop.
    pub event_buffer: usize,
}

impl TransportConfig {
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    pub fn close_timeout(&self) -> Duration {
        Duration::from_millis(self.close_timeout_ms)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_WS_URL.to_owned(),
            connect_timeout_ms: None,
            close_timeout_ms: 5000,
            event_buffer: 256,
        }
    }
}
