use anyhow::{Context, Result};
use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use bytes::Bytes;
use chillroom_client::ClientConfig;
use chillroom_core::{MediaTrigger, SdpAnswer, SdpOffer, SdpType};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::{MIME_TYPE_VP8, MediaEngine};
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// How the mock answers `POST /chat/webrtc/offer`.
#[derive(Clone, Debug)]
pub enum OfferReply {
    /// Respond with this HTTP status and no answer.
    Status(u16),
    /// Respond with a fixed `{ "sdp": ..., "type": "answer" }` body.
    Canned(String),
    /// Answer from a real server-side peer that sends one VP8 track.
    Peer,
}

/// Something the test pushes to every connected socket.
#[derive(Clone, Debug)]
enum Push {
    Text(String),
    Binary(Bytes),
    Close,
    Abort,
}

#[derive(Clone)]
struct Hub {
    pushes: broadcast::Sender<Push>,
    connections: Arc<AtomicUsize>,
    inbound: Arc<Mutex<Vec<String>>>,
    offers: Arc<Mutex<Vec<SdpOffer>>>,
    triggers: Arc<Mutex<Vec<MediaTrigger>>>,
    peers: Arc<Mutex<Vec<Arc<RTCPeerConnection>>>>,
    offer_reply: OfferReply,
}

/// In-process stand-in for the chat server: a broadcasting WebSocket hub
/// plus the two HTTP endpoints.
pub struct MockChatServer {
    addr: SocketAddr,
    hub: Hub,
    task: JoinHandle<()>,
}

impl MockChatServer {
    pub async fn start(offer_reply: OfferReply) -> Result<Self> {
        let (pushes, _) = broadcast::channel(256);
        let hub = Hub {
            pushes,
            connections: Arc::default(),
            inbound: Arc::default(),
            offers: Arc::default(),
            triggers: Arc::default(),
            peers: Arc::default(),
            offer_reply,
        };

        let app = Router::new()
            .route("/chat/ws", get(ws_route))
            .route("/chat/webrtc/offer", post(offer_route))
            .route("/chat/media", post(media_route))
            .with_state(hub.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind mock server")?;
        let addr = listener.local_addr()?;

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("[MockChatServer] serve failed: {}", e);
            }
        });

        Ok(Self { addr, hub, task })
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/chat/ws", self.addr)
    }

    /// Client configuration pointing every endpoint at this server, with
    /// host candidates only.
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::default();
        config.transport.endpoint = self.ws_url();
        config.transport.connect_timeout_ms = Some(5000);
        config.signaling.offer_url = format!("http://{}/chat/webrtc/offer", self.addr);
        config.signaling.media_trigger_url = format!("http://{}/chat/media", self.addr);
        config.signaling.ice_servers = vec![];
        config.signaling.request_timeout_ms = Some(10_000);
        config.signaling.gather_timeout_ms = 2000;
        config
    }

    pub fn push_text(&self, text: impl Into<String>) {
        let _ = self.hub.pushes.send(Push::Text(text.into()));
    }

    pub fn push_binary(&self, data: impl Into<Bytes>) {
        let _ = self.hub.pushes.send(Push::Binary(data.into()));
    }

    /// Start a close handshake with every client.
    pub fn close_all(&self) {
        let _ = self.hub.pushes.send(Push::Close);
    }

    /// Drop every socket without a close frame.
    pub fn abort_all(&self) {
        let _ = self.hub.pushes.send(Push::Abort);
    }

    pub fn connections(&self) -> usize {
        self.hub.connections.load(Ordering::SeqCst)
    }

    /// Wait until at least `count` sockets are subscribed to pushes.
    pub async fn wait_for_connections(&self, count: usize, timeout_ms: u64) -> bool {
        let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
        while tokio::time::Instant::now() < deadline {
            if self.connections() >= count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    /// Text frames received from clients, in arrival order.
    pub async fn inbound(&self) -> Vec<String> {
        self.hub.inbound.lock().await.clone()
    }

    pub async fn offers(&self) -> Vec<SdpOffer> {
        self.hub.offers.lock().await.clone()
    }

    pub async fn triggers(&self) -> Vec<MediaTrigger> {
        self.hub.triggers.lock().await.clone()
    }
}

impl Drop for MockChatServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn ws_route(ws: WebSocketUpgrade, State(hub): State<Hub>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

async fn handle_socket(socket: WebSocket, hub: Hub) {
    let (mut sender, mut receiver) = socket.split();
    let mut pushes = hub.pushes.subscribe();
    hub.connections.fetch_add(1, Ordering::SeqCst);
    tracing::debug!("[MockChatServer] client connected");

    loop {
        tokio::select! {
            push = pushes.recv() => {
                let message = match push {
                    Ok(Push::Text(text)) => Message::Text(text.into()),
                    Ok(Push::Binary(data)) => Message::Binary(data),
                    Ok(Push::Close) => Message::Close(Some(CloseFrame {
                        code: close_code::NORMAL,
                        reason: "server closing".into(),
                    })),
                    Ok(Push::Abort) => return,
                    Err(_) => break,
                };
                if sender.send(message).await.is_err() {
                    break;
                }
            }

            // Keep reading after a close so the handshake can complete.
            msg = receiver.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let text = text.to_string();
                    hub.inbound.lock().await.push(text.clone());
                    let _ = hub.pushes.send(Push::Text(text));
                }
                Some(Ok(_)) => {}
                _ => break,
            }
        }
    }

    tracing::debug!("[MockChatServer] client disconnected");
}

async fn offer_route(State(hub): State<Hub>, Json(offer): Json<SdpOffer>) -> Response {
    hub.offers.lock().await.push(offer.clone());

    match hub.offer_reply.clone() {
        OfferReply::Status(code) => {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, "offer rejected").into_response()
        }
        OfferReply::Canned(sdp) => Json(SdpAnswer {
            sdp,
            sdp_type: Some(SdpType::Answer),
        })
        .into_response(),
        OfferReply::Peer => match answer_with_peer(&offer).await {
            Ok((peer, sdp)) => {
                hub.peers.lock().await.push(peer);
                Json(SdpAnswer {
                    sdp,
                    sdp_type: Some(SdpType::Answer),
                })
                .into_response()
            }
            Err(e) => {
                tracing::error!("[MockChatServer] answer failed: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
            }
        },
    }
}

/// Waits for ICE gathering so the answer carries every candidate.
async fn answer_with_peer(offer: &SdpOffer) -> Result<(Arc<RTCPeerConnection>, String)> {
    let mut media_engine = MediaEngine::default();
    media_engine.register_default_codecs()?;
    let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

    let api = APIBuilder::new()
        .with_media_engine(media_engine)
        .with_interceptor_registry(registry)
        .build();

    let peer = Arc::new(api.new_peer_connection(RTCConfiguration::default()).await?);

    let track = Arc::new(TrackLocalStaticSample::new(
        RTCRtpCodecCapability {
            mime_type: MIME_TYPE_VP8.to_owned(),
            ..Default::default()
        },
        "video".to_owned(),
        "chillroom".to_owned(),
    ));
    peer.add_track(track as Arc<dyn TrackLocal + Send + Sync>)
        .await?;

    peer.set_remote_description(RTCSessionDescription::offer(offer.sdp.clone())?)
        .await?;
    let answer = peer.create_answer(None).await?;

    let mut gathered = peer.gathering_complete_promise().await;
    peer.set_local_description(answer).await?;
    let _ = tokio::time::timeout(Duration::from_secs(5), gathered.recv()).await;

    let local = peer
        .local_description()
        .await
        .context("Server peer has no local description")?;
    Ok((peer, local.sdp))
}

async fn media_route(State(hub): State<Hub>, Json(trigger): Json<MediaTrigger>) -> impl IntoResponse {
    hub.triggers.lock().await.push(trigger);
    Json(serde_json::json!({ "message": "Trigger media successfully" }))
}
