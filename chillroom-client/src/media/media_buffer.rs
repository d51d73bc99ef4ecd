use crate::demux::MediaIngress;
use crate::error::{ClientError, Result};
use crate::media::{MediaSink, SinkEvent, SinkSignals};
use bytes::Bytes;
use chillroom_core::MediaParams;
use serde::Deserialize;
use std::collections::VecDeque;
use tracing::{debug, error, info, warn};

/// What to do with a chunk that arrives while the sink cannot take it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum AdmissionPolicy {
    /// Discard it. Playback skips ahead instead of falling behind live.
    #[default]
    Drop,
    /// Hold up to `capacity` chunks; when full the oldest one is evicted.
    Queue { capacity: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    Unopened,
    Opening,
    Ready,
    Appending,
    Closed,
}

/// Result of offering one chunk to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Appended,
    Queued,
    Dropped,
    /// The buffer is closed.
    Ignored,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferStats {
    pub appended: u64,
    pub dropped: u64,
    pub bytes_appended: u64,
}

/// Gatekeeper between the inbound chunk stream and a [`MediaSink`]: at most
/// one append is ever outstanding.
pub struct MediaBuffer<S: MediaSink> {
    sink: Option<S>,
    params: MediaParams,
    policy: AdmissionPolicy,
    state: BufferState,
    queue: VecDeque<Bytes>,
    stats: BufferStats,
}

impl<S: MediaSink> MediaBuffer<S> {
    pub fn new(sink: S, params: MediaParams, policy: AdmissionPolicy) -> Self {
        Self {
            sink: Some(sink),
            params,
            policy,
            state: BufferState::Unopened,
            queue: VecDeque::new(),
            stats: BufferStats::default(),
        }
    }

    pub fn state(&self) -> BufferState {
        self.state
    }

    pub fn stats(&self) -> BufferStats {
        self.stats
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Ask the sink to open. Chunks are only appended after
    /// [`MediaBuffer::on_sink_opened`].
    pub fn open(&mut self, signals: SinkSignals) -> Result<()> {
        if self.state != BufferState::Unopened {
            return Err(ClientError::Sink(format!(
                "open called while {:?}",
                self.state
            )));
        }
        let Some(sink) = self.sink.as_mut() else {
            return Err(ClientError::Sink("sink already released".into()));
        };

        info!("Opening media sink ({})", self.params.mime);
        self.state = BufferState::Opening;
        if let Err(e) = sink.open(&self.params, signals) {
            error!("Media sink failed to open: {}", e);
            self.close();
            return Err(e);
        }
        Ok(())
    }

    /// Offer one chunk. Appends it if the sink is idle and nothing older is
    /// waiting, otherwise applies the admission policy. Never raises an error.
    pub fn accept(&mut self, chunk: Bytes) -> Admission {
        match self.state {
            BufferState::Closed => Admission::Ignored,
            BufferState::Unopened => self.drop_chunk(chunk.len(), "sink not opened"),
            BufferState::Opening | BufferState::Appending => self.defer(chunk),
            BufferState::Ready => {
                // Queued chunks go first. They can be left over when the sink
                // was busy without an append of ours in flight.
                self.pump();
                if self.state == BufferState::Ready && !self.sink_busy() {
                    self.submit(chunk)
                } else {
                    self.defer(chunk)
                }
            }
        }
    }

    /// Single entry point for sink signals.
    pub fn handle_signal(&mut self, event: SinkEvent) {
        match event {
            SinkEvent::Opened => self.on_sink_opened(),
            SinkEvent::AppendComplete => self.on_append_complete(),
            SinkEvent::Failed(reason) => self.on_sink_failed(&reason),
        }
    }

    pub fn on_sink_opened(&mut self) {
        if self.state != BufferState::Opening {
            debug!("Ignoring sink open signal while {:?}", self.state);
            return;
        }
        info!("Media sink ready");
        self.state = BufferState::Ready;
        self.pump();
    }

    pub fn on_append_complete(&mut self) {
        if self.state != BufferState::Appending {
            debug!("Ignoring append-complete signal while {:?}", self.state);
            return;
        }
        self.state = BufferState::Ready;
        self.pump();
    }

    pub fn on_sink_failed(&mut self, reason: &str) {
        if self.state == BufferState::Closed {
            return;
        }
        error!("Media sink failed: {}", reason);
        self.close();
    }

    /// Release the sink. Terminal and idempotent.
    pub fn close(&mut self) {
        if self.state == BufferState::Closed {
            return;
        }

        self.state = BufferState::Closed;
        self.queue.clear();
        if let Some(mut sink) = self.sink.take() {
            sink.close();
        }
        info!(
            "Media buffer closed: {} appended, {} dropped",
            self.stats.appended, self.stats.dropped
        );
    }

    fn sink_busy(&self) -> bool {
        self.sink.as_ref().is_none_or(|sink| sink.is_busy())
    }

    fn submit(&mut self, chunk: Bytes) -> Admission {
        let Some(sink) = self.sink.as_mut() else {
            return self.drop_chunk(chunk.len(), "sink released");
        };

        let len = chunk.len();
        match sink.append(chunk) {
            Ok(()) => {
                self.state = BufferState::Appending;
                self.stats.appended += 1;
                self.stats.bytes_appended += len as u64;
                Admission::Appended
            }
            Err(e) => {
                warn!("Media append failed: {}", e);
                self.drop_chunk(len, "append rejected")
            }
        }
    }

    fn defer(&mut self, chunk: Bytes) -> Admission {
        match self.policy {
            AdmissionPolicy::Drop => self.drop_chunk(chunk.len(), "sink busy"),
            AdmissionPolicy::Queue { capacity } => {
                if capacity == 0 {
                    return self.drop_chunk(chunk.len(), "queue disabled");
                }
                if self.queue.len() >= capacity {
                    if let Some(oldest) = self.queue.pop_front() {
                        self.drop_chunk(oldest.len(), "queue full, evicting oldest");
                    }
                }
                self.queue.push_back(chunk);
                Admission::Queued
            }
        }
    }

    /// Submit queued chunks in order until one is accepted by the sink or
    /// the queue runs dry.
    fn pump(&mut self) {
        while self.state == BufferState::Ready && !self.sink_busy() {
            let Some(chunk) = self.queue.pop_front() else {
                return;
            };
            self.submit(chunk);
        }
    }

    fn drop_chunk(&mut self, len: usize, why: &str) -> Admission {
        self.stats.dropped += 1;
        debug!("Dropping media chunk ({} bytes): {}", len, why);
        Admission::Dropped
    }
}

impl<S: MediaSink> MediaIngress for MediaBuffer<S> {
    fn accept(&mut self, chunk: Bytes) -> Admission {
        MediaBuffer::accept(self, chunk)
    }
}
