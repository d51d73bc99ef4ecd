mod media_control;
mod negotiator;
mod offer_exchange;
mod peer_session;
mod signaling_config;
mod webrtc_peer;

pub use media_control::*;
pub use negotiator::*;
pub use offer_exchange::*;
pub use peer_session::*;
pub use signaling_config::*;
pub use webrtc_peer::*;
