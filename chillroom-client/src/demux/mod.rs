mod frame_demux;

pub use frame_demux::*;
