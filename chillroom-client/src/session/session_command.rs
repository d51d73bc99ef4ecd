use crate::error::Result;
use tokio::sync::oneshot;

/// Requests from a [`SessionHandle`](crate::session::SessionHandle) to the
/// running session loop.
#[derive(Debug)]
pub enum SessionCommand {
    /// Publish one chat message. The outcome goes back through `reply`.
    Send {
        content: String,
        reply: oneshot::Sender<Result<()>>,
    },

    /// Close the connection gracefully.
    Close,
}
