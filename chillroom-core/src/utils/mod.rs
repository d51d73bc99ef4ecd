pub const DEFAULT_WS_URL: &str = "ws://localhost:8000/chat/ws";
pub const DEFAULT_OFFER_URL: &str = "http://localhost:8000/chat/webrtc/offer";
pub const DEFAULT_MEDIA_TRIGGER_URL: &str = "http://localhost:8000/chat/media";

pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";

/// Container and codec the server's fragmented MP4 stream is encoded with.
pub const DEFAULT_MEDIA_MIME: &str = r#"video/mp4; codecs="avc1.64001f, mp4a.40.2""#;
