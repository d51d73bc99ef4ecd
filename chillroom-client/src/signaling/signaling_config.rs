use chillroom_core::IceServerConfig;
use chillroom_core::utils::{DEFAULT_MEDIA_TRIGGER_URL, DEFAULT_OFFER_URL, DEFAULT_STUN_ADDR};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SignalingConfig {
    pub offer_url: String,
    pub media_trigger_url: String,
    pub ice_servers: Vec<IceServerConfig>,
    /// Upper bound on the offer request. `None` waits for the server.
    pub request_timeout_ms: Option<u64>,
    /// How long to wait for ICE gathering before sending a partial offer.
    pub gather_timeout_ms: u64,
}

impl SignalingConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    pub fn gather_timeout(&self) -> Duration {
        Duration::from_millis(self.gather_timeout_ms)
    }
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            offer_url: DEFAULT_OFFER_URL.to_owned(),
            media_trigger_url: DEFAULT_MEDIA_TRIGGER_URL.to_owned(),
            ice_servers: vec![IceServerConfig {
                urls: vec![DEFAULT_STUN_ADDR.to_owned()],
                username: None,
                credential: None,
            }],
            request_timeout_ms: None,
            gather_timeout_ms: 3000,
        }
    }
}
