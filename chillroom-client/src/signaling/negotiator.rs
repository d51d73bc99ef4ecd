use crate::error::{ClientError, Result};
use crate::signaling::{MediaKind, OfferExchange, PeerSession};
use chillroom_core::{SdpAnswer, SdpOffer};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiationState {
    /// Peer connection allocated with its receive-only transceiver.
    Created,
    LocalOfferSet,
    AwaitingAnswer,
    Negotiated,
    /// The attempt is over; the peer connection has been released. Start
    /// again with a new negotiator.
    Failed(String),
    Closed,
}

impl NegotiationState {
    pub fn name(&self) -> &'static str {
        match self {
            NegotiationState::Created => "created",
            NegotiationState::LocalOfferSet => "local-offer-set",
            NegotiationState::AwaitingAnswer => "awaiting-answer",
            NegotiationState::Negotiated => "negotiated",
            NegotiationState::Failed(_) => "failed",
            NegotiationState::Closed => "closed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            NegotiationState::Negotiated | NegotiationState::Failed(_) | NegotiationState::Closed
        )
    }
}

/// Both halves of the one offer/answer exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalingSession {
    pub local_offer: Option<String>,
    pub remote_answer: Option<String>,
}

/// Drives a single offer/answer exchange for a receive-only peer.
///
/// Each step is its own method so callers and tests can stop between them;
/// [`SignalingNegotiator::negotiate`] runs them all. Any failure releases the
/// peer connection and parks the negotiator in `Failed`. There is no retry
/// and no renegotiation.
pub struct SignalingNegotiator<P: PeerSession, X: OfferExchange> {
    peer: P,
    exchange: X,
    state: NegotiationState,
    session: SignalingSession,
    released: bool,
}

impl<P: PeerSession, X: OfferExchange> SignalingNegotiator<P, X> {
    pub async fn new(peer: P, exchange: X) -> Result<Self> {
        if let Err(e) = peer.add_receive_only(MediaKind::Video).await {
            let _ = peer.close().await;
            return Err(e);
        }

        Ok(Self {
            peer,
            exchange,
            state: NegotiationState::Created,
            session: SignalingSession::default(),
            released: false,
        })
    }

    pub fn state(&self) -> &NegotiationState {
        &self.state
    }

    pub fn session(&self) -> &SignalingSession {
        &self.session
    }

    pub fn peer(&self) -> &P {
        &self.peer
    }

    pub async fn negotiate(&mut self) -> Result<()> {
        self.create_offer().await?;
        self.send_offer().await
    }

    /// `Created -> LocalOfferSet`.
    pub async fn create_offer(&mut self) -> Result<&str> {
        self.require(NegotiationState::Created, "create offer")?;

        match self.peer.create_local_offer().await {
            Ok(sdp) => {
                info!("Local offer installed ({} bytes)", sdp.len());
                self.state = NegotiationState::LocalOfferSet;
                Ok(self.session.local_offer.insert(sdp).as_str())
            }
            Err(e) => Err(self.fail(e).await),
        }
    }

    /// `LocalOfferSet -> AwaitingAnswer -> Negotiated`. Waits on the
    /// request/response call without a deadline unless the exchange has one.
    pub async fn send_offer(&mut self) -> Result<()> {
        self.require(NegotiationState::LocalOfferSet, "send offer")?;
        let Some(local) = self.session.local_offer.clone() else {
            return Err(self.fail(ClientError::NoLocalDescription).await);
        };

        self.state = NegotiationState::AwaitingAnswer;
        match self.exchange.exchange(&SdpOffer::new(local)).await {
            Ok(answer) => self.apply_answer(answer).await,
            Err(e) => Err(self.fail(e).await),
        }
    }

    /// `AwaitingAnswer -> Negotiated`, if the answer is well formed and the
    /// peer accepts it.
    pub async fn apply_answer(&mut self, answer: SdpAnswer) -> Result<()> {
        self.require(NegotiationState::AwaitingAnswer, "apply answer")?;

        if let Err(e) = answer.validate() {
            return Err(self.fail(ClientError::MalformedAnswer(e.to_string())).await);
        }
        if let Err(e) = self.peer.apply_remote_answer(&answer.sdp).await {
            return Err(self.fail(e).await);
        }

        info!("Remote answer applied, peer session negotiated");
        self.session.remote_answer = Some(answer.sdp);
        self.state = NegotiationState::Negotiated;
        Ok(())
    }

    /// Tear down. Idempotent; the peer connection is released at most once.
    pub async fn close(&mut self) {
        if self.state == NegotiationState::Closed {
            return;
        }
        self.release().await;
        self.state = NegotiationState::Closed;
    }

    fn require(&self, wanted: NegotiationState, step: &'static str) -> Result<()> {
        if self.state == wanted {
            return Ok(());
        }
        Err(ClientError::InvalidTransition {
            step,
            state: self.state.name(),
        })
    }

    async fn fail(&mut self, err: ClientError) -> ClientError {
        warn!("Negotiation failed while {}: {}", self.state.name(), err);
        self.release().await;
        self.state = NegotiationState::Failed(err.to_string());
        err
    }

    async fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.peer.close().await {
            warn!("Error closing peer connection: {}", e);
        }
    }
}
