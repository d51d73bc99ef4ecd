use crate::media::AdmissionPolicy;
use chillroom_core::MediaParams;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub params: MediaParams,
    pub policy: AdmissionPolicy,
}
