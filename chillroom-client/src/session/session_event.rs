use crate::transport::CloseNotice;
use chillroom_core::ChatEvent;

/// What the session reports to its owner (a UI, the CLI, a test).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Connected,

    /// A chat message was appended to the store.
    Message { event: ChatEvent, is_self: bool },

    /// The connection ended. Always the last event of a session.
    Disconnected(CloseNotice),
}
