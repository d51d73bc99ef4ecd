use crate::error::{ClientError, Result};
use crate::media::{MediaSink, SinkSignals};
use bytes::Bytes;
use chillroom_core::MediaParams;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkTarget {
    File(PathBuf),
    Stdout,
    /// Accept and throw away, for chat-only clients.
    Discard,
}

/// Media sink that writes the raw stream to a file or stdout, e.g. to pipe
/// it into a player. Writes happen on a background task; the busy flag is
/// set on submit and cleared when the write is flushed.
pub struct WriterSink {
    target: SinkTarget,
    busy: Arc<AtomicBool>,
    chunks: Option<mpsc::UnboundedSender<Bytes>>,
}

impl WriterSink {
    pub fn new(target: SinkTarget) -> Self {
        Self {
            target,
            busy: Arc::new(AtomicBool::new(false)),
            chunks: None,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(SinkTarget::File(path.into()))
    }

    pub fn stdout() -> Self {
        Self::new(SinkTarget::Stdout)
    }

    pub fn discard() -> Self {
        Self::new(SinkTarget::Discard)
    }
}

impl MediaSink for WriterSink {
    fn open(&mut self, params: &MediaParams, signals: SinkSignals) -> Result<()> {
        if self.chunks.is_some() {
            return Err(ClientError::Sink("already open".into()));
        }
        if params.mime.trim().is_empty() {
            return Err(ClientError::Sink("missing MIME type".into()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.chunks = Some(tx);
        info!("Writing {} stream to {:?}", params.mime, self.target);
        tokio::spawn(write_loop(
            self.target.clone(),
            rx,
            self.busy.clone(),
            signals,
        ));
        Ok(())
    }

    fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn append(&mut self, chunk: Bytes) -> Result<()> {
        let Some(chunks) = &self.chunks else {
            return Err(ClientError::Sink("not open".into()));
        };

        self.busy.store(true, Ordering::Release);
        chunks.send(chunk).map_err(|_| {
            self.busy.store(false, Ordering::Release);
            ClientError::Sink("writer task stopped".into())
        })
    }

    fn close(&mut self) {
        if self.chunks.take().is_some() {
            debug!("Closing media sink {:?}", self.target);
        }
    }
}

async fn write_loop(
    target: SinkTarget,
    mut chunks: mpsc::UnboundedReceiver<Bytes>,
    busy: Arc<AtomicBool>,
    signals: SinkSignals,
) {
    let mut writer: Box<dyn AsyncWrite + Unpin + Send> = match &target {
        SinkTarget::File(path) => match tokio::fs::File::create(path).await {
            Ok(file) => Box::new(file),
            Err(e) => {
                signals.failed(format!("cannot create {}: {}", path.display(), e));
                return;
            }
        },
        SinkTarget::Stdout => Box::new(tokio::io::stdout()),
        SinkTarget::Discard => Box::new(tokio::io::sink()),
    };
    signals.opened();

    while let Some(chunk) = chunks.recv().await {
        let written = async {
            writer.write_all(&chunk).await?;
            writer.flush().await
        }
        .await;
        busy.store(false, Ordering::Release);

        if let Err(e) = written {
            warn!("Media write to {:?} failed: {}", target, e);
            signals.failed(e.to_string());
            return;
        }
        signals.append_complete();
    }

    let _ = writer.shutdown().await;
    debug!("Media writer for {:?} finished", target);
}
