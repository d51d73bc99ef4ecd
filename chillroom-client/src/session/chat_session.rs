use crate::config::ClientConfig;
use crate::demux::{FrameDemux, Routed};
use crate::error::{ClientError, Result};
use crate::media::{BufferStats, MediaBuffer, MediaSink, SinkSignals};
use crate::session::{SessionCommand, SessionEvent};
use crate::store::{MessageLog, MessageStore};
use crate::transport::{
    CloseNotice, Connector, TransportChannel, TransportEvent, WsConnector,
};
use chillroom_core::{ChatEvent, Credential, OutgoingMessage};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

/// One connected chat client: transport, demux, message store and media
/// buffer driven by a single event loop.
///
/// Every state change happens inside [`ChatSession::run`], one event at a
/// time. Callers interact through the [`SessionHandle`] and the
/// [`SessionEvent`] stream returned by [`ChatSession::new`].
pub struct ChatSession<S: MediaSink, C: Connector = WsConnector> {
    credential: Credential,
    transport: TransportChannel<C>,
    demux: FrameDemux,
    media: MediaBuffer<S>,
    event_buffer: usize,
    command_rx: mpsc::Receiver<SessionCommand>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl<S: MediaSink> ChatSession<S, WsConnector> {
    pub fn connect(
        credential: Credential,
        config: &ClientConfig,
        sink: S,
    ) -> (Self, SessionHandle, mpsc::UnboundedReceiver<SessionEvent>) {
        Self::new(credential, config, WsConnector, sink)
    }
}

impl<S: MediaSink, C: Connector> ChatSession<S, C> {
    pub fn new(
        credential: Credential,
        config: &ClientConfig,
        connector: C,
        sink: S,
    ) -> (Self, SessionHandle, mpsc::UnboundedReceiver<SessionEvent>) {
        let (command_tx, command_rx) = mpsc::channel(64);
        let (events, events_rx) = mpsc::unbounded_channel();
        let store = MessageStore::new();

        let handle = SessionHandle {
            commands: command_tx,
            store: store.clone(),
            credential: credential.clone(),
        };

        let session = Self {
            credential,
            transport: TransportChannel::new(config.transport.clone(), connector),
            demux: FrameDemux::new(store),
            media: MediaBuffer::new(
                sink,
                config.media.params.clone(),
                config.media.policy,
            ),
            event_buffer: config.transport.event_buffer.max(1),
            command_rx,
            events,
        };

        (session, handle, events_rx)
    }

    /// Runs until the connection is gone, then releases the media sink.
    ///
    /// Returns the media counters for the whole session. Dropping every
    /// [`SessionHandle`] closes the connection the same way
    /// [`SessionHandle::close`] does.
    pub async fn run(mut self) -> BufferStats {
        info!("Chat session started");

        let (signals, mut sink_rx) = SinkSignals::channel();
        if let Err(e) = self.media.open(signals) {
            warn!("Continuing without media: {}", e);
        }

        let (transport_tx, mut transport_rx) = mpsc::channel(self.event_buffer);
        if let Err(e) = self.transport.open(transport_tx) {
            error!("Failed to start transport: {}", e);
            self.emit(SessionEvent::Disconnected(CloseNotice::unclean(e.to_string())));
            self.media.close();
            return self.media.stats();
        }

        let mut handles_alive = true;
        loop {
            tokio::select! {
                biased;

                Some(signal) = sink_rx.recv() => {
                    self.media.handle_signal(signal);
                }

                cmd = self.command_rx.recv(), if handles_alive => {
                    match cmd {
                        Some(c) => self.handle_command(c),
                        None => {
                            info!("All session handles dropped. Closing transport.");
                            handles_alive = false;
                            self.transport.close();
                        }
                    }
                }

                evt = transport_rx.recv() => {
                    let finished = match evt {
                        Some(e) => self.handle_transport_event(e),
                        None => {
                            warn!("Transport task stopped without a close notice");
                            self.handle_transport_event(TransportEvent::Closed(
                                CloseNotice::unclean("transport task stopped"),
                            ));
                            true
                        }
                    };
                    if finished {
                        break;
                    }
                }
            }
        }

        self.media.close();
        info!("Chat session finished");
        self.media.stats()
    }

    fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::Send { content, reply } => {
                let result = self.send_chat(content);
                if let Err(e) = &result {
                    debug!("Send rejected: {}", e);
                }
                let _ = reply.send(result);
            }
            SessionCommand::Close => self.transport.close(),
        }
    }

    fn send_chat(&self, content: String) -> Result<()> {
        let message = OutgoingMessage::new(&self.credential, content)?;
        self.transport.send_chat(&message)
    }

    /// Returns `true` once the connection has been reported closed.
    fn handle_transport_event(&mut self, event: TransportEvent) -> bool {
        match self.transport.handle_event(event) {
            Some(TransportEvent::Opened) => {
                self.emit(SessionEvent::Connected);
                false
            }
            Some(TransportEvent::Frame(frame)) => {
                if let Routed::Chat(event) = self.demux.dispatch(frame, &mut self.media) {
                    let is_self = event.is_from(&self.credential);
                    self.emit(SessionEvent::Message { event, is_self });
                }
                false
            }
            Some(TransportEvent::Closed(notice)) => {
                if notice.clean {
                    info!("Connection closed: {:?} {}", notice.code, notice.reason);
                } else {
                    warn!("Connection lost: {}", notice.reason);
                }
                self.emit(SessionEvent::Disconnected(notice));
                true
            }
            None => false,
        }
    }

    fn emit(&self, event: SessionEvent) {
        // The owner may have stopped listening; the session keeps running.
        let _ = self.events.send(event);
    }
}

/// Cloneable front door to a running [`ChatSession`].
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    store: MessageStore,
    credential: Credential,
}

impl SessionHandle {
    /// Publish one message under the session credential.
    ///
    /// Fails with [`ClientError::EmptyMessage`] for blank input and with
    /// [`ClientError::NotOpen`] unless the connection is open. Nothing is
    /// queued for later in either case.
    pub async fn send(&self, content: impl Into<String>) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(SessionCommand::Send {
                content: content.into(),
                reply,
            })
            .await
            .map_err(|_| ClientError::SessionClosed)?;
        rx.await.map_err(|_| ClientError::SessionClosed)?
    }

    pub async fn close(&self) {
        let _ = self.commands.send(SessionCommand::Close).await;
    }

    pub fn messages(&self) -> MessageLog {
        self.store.all()
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn is_self(&self, event: &ChatEvent) -> bool {
        event.is_from(&self.credential)
    }
}
