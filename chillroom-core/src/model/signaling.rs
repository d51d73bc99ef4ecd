use crate::model::chat::ModelError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpType {
    Offer,
    Answer,
}

/// Request body of the offer exchange: `{ "sdp": ..., "type": "offer" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdpOffer {
    pub sdp: String,
    #[serde(rename = "type")]
    pub sdp_type: SdpType,
}

impl SdpOffer {
    pub fn new(sdp: impl Into<String>) -> Self {
        Self {
            sdp: sdp.into(),
            sdp_type: SdpType::Offer,
        }
    }
}

/// Response body of the offer exchange. `type` may be omitted, in which case
/// it is taken to be `answer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdpAnswer {
    pub sdp: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub sdp_type: Option<SdpType>,
}

impl SdpAnswer {
    pub fn new(sdp: impl Into<String>) -> Self {
        Self {
            sdp: sdp.into(),
            sdp_type: None,
        }
    }

    /// Structural check only: a session description starts with its
    /// `v=` line, and an explicit type must be `answer`.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.sdp_type == Some(SdpType::Offer) {
            return Err(ModelError::InvalidSdp("expected an answer, got an offer"));
        }
        if !self.sdp.trim_start().starts_with("v=") {
            return Err(ModelError::InvalidSdp("missing version line"));
        }
        Ok(())
    }
}
