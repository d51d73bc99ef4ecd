pub mod config;
pub mod demux;
pub mod error;
pub mod media;
pub mod session;
pub mod signaling;
pub mod store;
pub mod transport;

pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use session::{ChatSession, SessionEvent, SessionHandle};

pub use chillroom_core::{ChatEvent, Credential, Frame, MediaTrigger};
