use crate::error::{ClientError, Result};
use crate::signaling::{MediaKind, PeerSession, SignalingConfig};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiverInit;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;
use webrtc::track::track_remote::TrackRemote;

/// What the peer connection reports once negotiation is underway.
pub enum PeerEvent {
    /// A remote track started; read it with `read_rtp`.
    TrackAdded(Arc<TrackRemote>),
    ConnectionState(RTCPeerConnectionState),
}

/// Receive-only [`PeerSession`] on top of `webrtc-rs`.
pub struct WebRtcPeer {
    peer_connection: Arc<RTCPeerConnection>,
    gather_timeout: Duration,
}

impl WebRtcPeer {
    pub async fn new(config: &SignalingConfig) -> Result<(Self, mpsc::Receiver<PeerEvent>)> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let ice_servers = config
            .ice_servers
            .iter()
            .map(|server| RTCIceServer {
                urls: server.urls.clone(),
                username: server.username.clone().unwrap_or_default(),
                credential: server.credential.clone().unwrap_or_default(),
                ..Default::default()
            })
            .collect();

        let rtc_config = RTCConfiguration {
            ice_servers,
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);
        let (event_tx, event_rx) = mpsc::channel(32);

        let state_tx = event_tx.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |state: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                Box::pin(async move {
                    info!("Peer connection state: {}", state);
                    let _ = tx.send(PeerEvent::ConnectionState(state)).await;
                })
            },
        ));

        let track_tx = event_tx;
        peer_connection.on_track(Box::new(move |track, _receiver, _transceiver| {
            let tx = track_tx.clone();
            Box::pin(async move {
                info!(
                    "Remote {} track started ({})",
                    track.kind(),
                    track.codec().capability.mime_type
                );
                let _ = tx.send(PeerEvent::TrackAdded(track)).await;
            })
        }));

        Ok((
            Self {
                peer_connection,
                gather_timeout: config.gather_timeout(),
            },
            event_rx,
        ))
    }
}

#[async_trait]
impl PeerSession for WebRtcPeer {
    async fn add_receive_only(&self, kind: MediaKind) -> Result<()> {
        let codec_type = match kind {
            MediaKind::Audio => RTPCodecType::Audio,
            MediaKind::Video => RTPCodecType::Video,
        };

        self.peer_connection
            .add_transceiver_from_kind(
                codec_type,
                Some(RTCRtpTransceiverInit {
                    direction: RTCRtpTransceiverDirection::Recvonly,
                    send_encodings: vec![],
                }),
            )
            .await?;
        debug!("Added receive-only {:?} transceiver", kind);
        Ok(())
    }

    async fn create_local_offer(&self) -> Result<String> {
        let offer = self.peer_connection.create_offer(None).await?;

        // Candidates travel inside the offer; there is no trickle path.
        let mut gathered = self.peer_connection.gathering_complete_promise().await;
        self.peer_connection.set_local_description(offer).await?;
        if tokio::time::timeout(self.gather_timeout, gathered.recv())
            .await
            .is_err()
        {
            warn!(
                "ICE gathering incomplete after {:?}, sending partial offer",
                self.gather_timeout
            );
        }

        let local = self
            .peer_connection
            .local_description()
            .await
            .ok_or(ClientError::NoLocalDescription)?;
        Ok(local.sdp)
    }

    async fn apply_remote_answer(&self, sdp: &str) -> Result<()> {
        let answer = RTCSessionDescription::answer(sdp.to_owned())?;
        self.peer_connection.set_remote_description(answer).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}
