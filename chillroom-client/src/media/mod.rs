mod media_buffer;
mod media_config;
mod media_sink;
mod writer_sink;

pub use media_buffer::*;
pub use media_config::*;
pub use media_sink::*;
pub use writer_sink::*;
