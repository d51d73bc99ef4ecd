use crate::utils::DEFAULT_MEDIA_MIME;
use serde::{Deserialize, Serialize};

/// Parameters fixed when the media sink is opened. The MIME string names
/// the container and codecs; nothing is sniffed from the stream itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaParams {
    pub mime: String,
}

impl Default for MediaParams {
    fn default() -> Self {
        Self {
            mime: DEFAULT_MEDIA_MIME.to_owned(),
        }
    }
}

/// Body of the server's "start broadcasting this object" call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaTrigger {
    pub bucket: String,
    pub key: String,
}
