mod connection_state;
mod connector;
mod transport_channel;
mod transport_config;
mod transport_event;
mod ws_connector;

pub use connection_state::*;
pub use connector::*;
pub use transport_channel::*;
pub use transport_config::*;
pub use transport_event::*;
pub use ws_connector::*;
