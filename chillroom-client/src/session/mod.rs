mod chat_session;
mod session_command;
mod session_event;

pub use chat_session::*;
pub use session_command::*;
pub use session_event::*;
