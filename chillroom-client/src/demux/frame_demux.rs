use crate::media::Admission;
use crate::store::MessageStore;
use bytes::Bytes;
use chillroom_core::{ChatEvent, Frame};
use tracing::{debug, warn};

/// Where binary frames go. Implemented by the media buffer.
pub trait MediaIngress {
    fn accept(&mut self, chunk: Bytes) -> Admission;
}

/// Outcome of routing one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
    Chat(ChatEvent),
    Media(Admission),
    Discarded,
}

/// Splits the inbound stream by frame kind: text to the message store,
/// binary to media.
pub struct FrameDemux {
    store: MessageStore,
    discarded: u64,
}

impl FrameDemux {
    pub fn new(store: MessageStore) -> Self {
        Self {
            store,
            discarded: 0,
        }
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    /// Text frames that failed to decode so far.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    pub fn dispatch(&mut self, frame: Frame, media: &mut impl MediaIngress) -> Routed {
        match frame {
            Frame::Text(text) => match ChatEvent::decode(&text) {
                Ok(event) => {
                    debug!("Chat message from {}", event.display_name());
                    self.store.append(event.clone());
                    Routed::Chat(event)
                }
                Err(e) => {
                    self.discarded += 1;
                    warn!("Discarding text frame ({} bytes): {}", text.len(), e);
                    Routed::Discarded
                }
            },
            Frame::Binary(chunk) => Routed::Media(media.accept(chunk)),
        }
    }
}
