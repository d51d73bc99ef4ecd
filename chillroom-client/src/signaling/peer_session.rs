use crate::error::Result;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
}

/// The peer-connection operations the negotiator needs.
#[async_trait]
pub trait PeerSession: Send + Sync {
    /// Add a transceiver that only ever receives `kind`.
    async fn add_receive_only(&self, kind: MediaKind) -> Result<()>;

    /// Generate an offer, install it as the local description and return
    /// the SDP to send.
    async fn create_local_offer(&self) -> Result<String>;

    async fn apply_remote_answer(&self, sdp: &str) -> Result<()>;

    async fn close(&self) -> Result<()>;
}
