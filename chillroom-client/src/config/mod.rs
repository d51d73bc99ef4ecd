//! Client configuration.
//!
//! Resolution order: `CHILLROOM_*` environment variables, then defaults
//! matching a locally running server.

use crate::error::{ClientError, Result};
use crate::media::{AdmissionPolicy, MediaConfig};
use crate::signaling::SignalingConfig;
use crate::transport::TransportConfig;
use chillroom_core::IceServerConfig;
use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub transport: TransportConfig,
    pub media: MediaConfig,
    pub signaling: SignalingConfig,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("CHILLROOM_WS_URL") {
            config.transport.endpoint = url;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "CHILLROOM_CONNECT_TIMEOUT_MS")? {
            config.transport.connect_timeout_ms = Some(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "CHILLROOM_CLOSE_TIMEOUT_MS")? {
            config.transport.close_timeout_ms = ms;
        }

        if let Some(mime) = lookup("CHILLROOM_MEDIA_MIME") {
            config.media.params.mime = mime;
        }
        match parse_var::<usize>(&lookup, "CHILLROOM_QUEUE_CAPACITY")? {
            Some(0) => config.media.policy = AdmissionPolicy::Drop,
            Some(capacity) => config.media.policy = AdmissionPolicy::Queue { capacity },
            None => {}
        }

        if let Some(url) = lookup("CHILLROOM_OFFER_URL") {
            config.signaling.offer_url = url;
        }
        if let Some(url) = lookup("CHILLROOM_MEDIA_URL") {
            config.signaling.media_trigger_url = url;
        }
        if let Some(list) = lookup("CHILLROOM_ICE_SERVERS") {
            config.signaling.ice_servers = parse_ice_servers(&list);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "CHILLROOM_SIGNALING_TIMEOUT_MS")? {
            config.signaling.request_timeout_ms = Some(ms);
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| ClientError::Config(format!("{key}={raw:?} is not a valid number")))
}

/// Comma separated URLs, one STUN/TURN server each. Empty means host
/// candidates only.
fn parse_ice_servers(list: &str) -> Vec<IceServerConfig> {
    list.split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(|url| IceServerConfig {
            urls: vec![url.to_owned()],
            username: None,
            credential: None,
        })
        .collect()
}
