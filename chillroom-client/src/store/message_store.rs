use chillroom_core::{ChatEvent, Credential};
use std::sync::{Arc, PoisonError, RwLock};

/// Append-only log of chat events in arrival order.
///
/// Cheap to clone; clones share the same log. One writer (the demux) and any
/// number of readers.
#[derive(Clone, Default)]
pub struct MessageStore {
    events: Arc<RwLock<Vec<ChatEvent>>>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, event: ChatEvent) {
        self.events
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    /// Snapshot of the whole log. Iterating it has no side effects and can be
    /// repeated.
    pub fn all(&self) -> MessageLog {
        let events = self.events.read().unwrap_or_else(PoisonError::into_inner);
        MessageLog {
            events: Arc::from(events.as_slice()),
        }
    }

    pub fn len(&self) -> usize {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Point-in-time view of a [`MessageStore`].
#[derive(Debug, Clone)]
pub struct MessageLog {
    events: Arc<[ChatEvent]>,
}

impl MessageLog {
    pub fn iter(&self) -> std::slice::Iter<'_, ChatEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ChatEvent> {
        self.events.get(index)
    }
}

impl<'a> IntoIterator for &'a MessageLog {
    type Item = &'a ChatEvent;
    type IntoIter = std::slice::Iter<'a, ChatEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Whether `event` was sent by the holder of `identity`.
pub fn is_self(event: &ChatEvent, identity: &Credential) -> bool {
    event.is_from(identity)
}
