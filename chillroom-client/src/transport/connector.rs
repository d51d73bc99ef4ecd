use crate::error::{ClientError, Result};
use crate::transport::{TransportConfig, TransportEvent};
use chillroom_core::Frame;
use tokio::sync::mpsc;

/// Establishes the underlying socket for a [`TransportChannel`].
///
/// Implementations start connecting in the background and report progress
/// only through `events`; `connect` itself must not block.
///
/// [`TransportChannel`]: crate::transport::TransportChannel
pub trait Connector: Send {
    fn connect(
        &mut self,
        config: &TransportConfig,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Link>;
}

/// Outbound half of a live socket.
///
/// Dropping the link asks the socket task to perform a graceful close.
#[derive(Debug)]
pub struct Link {
    outbound: mpsc::UnboundedSender<Frame>,
}

impl Link {
    pub fn new(outbound: mpsc::UnboundedSender<Frame>) -> Self {
        Self { outbound }
    }

    pub fn send(&self, frame: Frame) -> Result<()> {
        self.outbound
            .send(frame)
            .map_err(|_| ClientError::NotOpen("socket task stopped"))
    }
}
