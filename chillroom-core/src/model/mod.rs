mod chat;
mod credential;
mod frame;
mod media;
mod signaling;

pub use chat::{ChatEvent, ModelError, OutgoingMessage};
pub use credential::Credential;
pub use frame::{Frame, FrameKind};
pub use media::{MediaParams, MediaTrigger};
pub use signaling::{IceServerConfig, SdpAnswer, SdpOffer, SdpType};
