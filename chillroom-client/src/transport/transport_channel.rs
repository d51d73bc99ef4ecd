use crate::error::{ClientError, Result};
use crate::transport::{
    CloseNotice, ConnectionState, Connector, Link, TransportConfig, TransportEvent, WsConnector,
};
use chillroom_core::{Frame, OutgoingMessage};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Owns the one connection to the server.
///
/// All socket activity arrives as [`TransportEvent`]s that the owner feeds
/// back through [`TransportChannel::handle_event`], so the state machine
/// can be driven synchronously in tests.
pub struct TransportChannel<C: Connector = WsConnector> {
    config: TransportConfig,
    connector: C,
    state: ConnectionState,
    link: Option<Link>,
    close_notice: Option<CloseNotice>,
}

impl TransportChannel<WsConnector> {
    pub fn websocket(config: TransportConfig) -> Self {
        Self::new(config, WsConnector)
    }
}

impl<C: Connector> TransportChannel<C> {
    pub fn new(config: TransportConfig, connector: C) -> Self {
        Self {
            config,
            connector,
            state: ConnectionState::Idle,
            link: None,
            close_notice: None,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    /// How the connection ended, once it has.
    pub fn close_notice(&self) -> Option<&CloseNotice> {
        self.close_notice.as_ref()
    }

    /// Start connecting. Completion or failure shows up later as
    /// [`TransportEvent::Opened`] or [`TransportEvent::Closed`].
    pub fn open(&mut self, events: mpsc::Sender<TransportEvent>) -> Result<()> {
        if self.state != ConnectionState::Idle {
            return Err(ClientError::AlreadyStarted(self.state.as_str()));
        }

        info!("Connecting to {}", self.config.endpoint);
        let link = self.connector.connect(&self.config, events)?;
        self.link = Some(link);
        self.state = ConnectionState::Connecting;
        Ok(())
    }

    /// Queue a frame for the server. Rejected unless the channel is open.
    pub fn send(&self, frame: Frame) -> Result<()> {
        if self.state != ConnectionState::Open {
            warn!(
                "Rejecting {:?} frame: transport is {}",
                frame.kind(),
                self.state
            );
            return Err(ClientError::NotOpen(self.state.as_str()));
        }

        let Some(link) = &self.link else {
            return Err(ClientError::NotOpen(self.state.as_str()));
        };
        link.send(frame)
    }

    pub fn send_chat(&self, message: &OutgoingMessage) -> Result<()> {
        let text = message.encode()?;
        self.send(Frame::Text(text))
    }

    /// Single entry point for socket events. Returns the event when the
    /// owner should act on it, `None` when it is stale or duplicated.
    pub fn handle_event(&mut self, event: TransportEvent) -> Option<TransportEvent> {
        match event {
            TransportEvent::Opened => self.on_open().then_some(TransportEvent::Opened),
            TransportEvent::Frame(frame) => self.on_frame(frame).map(TransportEvent::Frame),
            TransportEvent::Closed(notice) => self.on_close(notice).map(TransportEvent::Closed),
        }
    }

    pub fn on_open(&mut self) -> bool {
        match self.state {
            ConnectionState::Connecting => {
                info!("Transport open: {}", self.config.endpoint);
                self.state = ConnectionState::Open;
                true
            }
            other => {
                debug!("Ignoring open signal while {}", other);
                false
            }
        }
    }

    pub fn on_frame(&mut self, frame: Frame) -> Option<Frame> {
        match self.state {
            ConnectionState::Open | ConnectionState::Closing => Some(frame),
            other => {
                debug!("Discarding {:?} frame while {}", frame.kind(), other);
                None
            }
        }
    }

    /// Reports the close at most once; later notices are swallowed.
    pub fn on_close(&mut self, notice: CloseNotice) -> Option<CloseNotice> {
        if self.state == ConnectionState::Closed {
            return None;
        }

        self.state = ConnectionState::Closed;
        self.link = None;
        self.close_notice = Some(notice.clone());
        Some(notice)
    }

    /// Request a graceful shutdown. Safe to call any number of times.
    pub fn close(&mut self) {
        match self.state {
            ConnectionState::Idle => {
                self.state = ConnectionState::Closed;
            }
            ConnectionState::Connecting | ConnectionState::Open => {
                info!("Closing transport: {}", self.config.endpoint);
                self.state = ConnectionState::Closing;
                self.link = None;
            }
            ConnectionState::Closing | ConnectionState::Closed => {}
        }
    }
}
