use crate::error::{ClientError, Result};
use crate::signaling::SignalingConfig;
use async_trait::async_trait;
use chillroom_core::{SdpAnswer, SdpOffer};
use tracing::{debug, warn};

/// One-shot request/response carrying the local offer to the server and
/// its answer back. Independent of the chat transport.
#[async_trait]
pub trait OfferExchange: Send + Sync {
    async fn exchange(&self, offer: &SdpOffer) -> Result<SdpAnswer>;
}

/// `POST`s the offer as JSON and expects `{ "sdp": ... }` back.
#[derive(Clone)]
pub struct HttpOfferExchange {
    client: reqwest::Client,
    url: String,
}

impl HttpOfferExchange {
    pub fn new(config: &SignalingConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            url: config.offer_url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl OfferExchange for HttpOfferExchange {
    async fn exchange(&self, offer: &SdpOffer) -> Result<SdpAnswer> {
        debug!("Posting offer ({} bytes) to {}", offer.sdp.len(), self.url);
        let response = self.client.post(&self.url).json(offer).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Offer rejected by {}: {}", self.url, status);
            return Err(ClientError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ClientError::MalformedAnswer(e.to_string()))
    }
}
