use crate::error::Result;
use bytes::Bytes;
use chillroom_core::MediaParams;
use tokio::sync::mpsc;

/// Signals a sink raises on its own schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    /// The sink finished opening and accepts appends.
    Opened,
    /// The last submitted append has been processed; busy is false again.
    AppendComplete,
    /// The sink cannot continue.
    Failed(String),
}

/// Where a sink posts its [`SinkEvent`]s.
#[derive(Debug, Clone)]
pub struct SinkSignals {
    tx: mpsc::UnboundedSender<SinkEvent>,
}

impl SinkSignals {
    pub fn new(tx: mpsc::UnboundedSender<SinkEvent>) -> Self {
        Self { tx }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SinkEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn opened(&self) {
        let _ = self.tx.send(SinkEvent::Opened);
    }

    pub fn append_complete(&self) {
        let _ = self.tx.send(SinkEvent::AppendComplete);
    }

    pub fn failed(&self, reason: impl Into<String>) {
        let _ = self.tx.send(SinkEvent::Failed(reason.into()));
    }
}

/// Sequenced-append target for the media stream (a decoder, a file, a
/// pipe). Processes one append at a time.
///
/// The sink value itself is the handle; `close` releases whatever it holds.
pub trait MediaSink: Send {
    /// Begin opening with fixed codec parameters. Readiness is reported
    /// later through [`SinkSignals::opened`].
    fn open(&mut self, params: &MediaParams, signals: SinkSignals) -> Result<()>;

    /// `true` while a submitted append is still being processed.
    fn is_busy(&self) -> bool;

    /// Submit one chunk. Never called while [`MediaSink::is_busy`] is true.
    fn append(&mut self, chunk: Bytes) -> Result<()>;

    fn close(&mut self);
}
