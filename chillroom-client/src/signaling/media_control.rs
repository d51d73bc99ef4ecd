use crate::error::{ClientError, Result};
use crate::signaling::SignalingConfig;
use chillroom_core::MediaTrigger;
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Deserialize)]
struct TriggerReply {
    message: String,
}

/// Asks the server to start broadcasting a stored object to the room.
#[derive(Clone)]
pub struct MediaControl {
    client: reqwest::Client,
    url: String,
}

impl MediaControl {
    pub fn new(config: &SignalingConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            url: config.media_trigger_url.clone(),
        })
    }

    /// Returns the server's acknowledgement text.
    pub async fn trigger(&self, request: &MediaTrigger) -> Result<String> {
        info!("Triggering media {}/{}", request.bucket, request.key);
        let response = self.client.post(&self.url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Media trigger rejected by {}: {}", self.url, status);
            return Err(ClientError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str::<TriggerReply>(&body)
            .map(|reply| reply.message)
            .unwrap_or(body))
    }
}
