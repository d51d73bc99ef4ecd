use chillroom_core::Frame;

/// Events the socket task feeds into the session loop, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Handshake finished; sends are accepted from now on.
    Opened,

    /// One inbound frame, untouched.
    Frame(Frame),

    /// The connection is gone. Sent exactly once per socket task, also when
    /// the handshake itself failed.
    Closed(CloseNotice),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseNotice {
    /// `true` only when a close handshake completed.
    pub clean: bool,
    pub code: Option<u16>,
    pub reason: String,
}

impl CloseNotice {
    pub fn clean(code: Option<u16>, reason: impl Into<String>) -> Self {
        Self {
            clean: true,
            code,
            reason: reason.into(),
        }
    }

    pub fn unclean(reason: impl Into<String>) -> Self {
        Self {
            clean: false,
            code: None,
            reason: reason.into(),
        }
    }
}
