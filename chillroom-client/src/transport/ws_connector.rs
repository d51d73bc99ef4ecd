use crate::error::Result;
use crate::transport::{CloseNotice, Connector, Link, TransportConfig, TransportEvent};
use chillroom_core::Frame;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connects over WebSocket with `tokio-tungstenite`, one task per socket.
#[derive(Debug, Default, Clone)]
pub struct WsConnector;

impl Connector for WsConnector {
    fn connect(
        &mut self,
        config: &TransportConfig,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Link> {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_socket(config.clone(), rx, events));
        Ok(Link::new(tx))
    }
}

async fn run_socket(
    config: TransportConfig,
    mut outbound: mpsc::UnboundedReceiver<Frame>,
    events: mpsc::Sender<TransportEvent>,
) {
    let handshake = establish(&config);
    tokio::pin!(handshake);

    // Dropping the link while the handshake is pending abandons it.
    let connected = loop {
        tokio::select! {
            result = &mut handshake => break result,
            out = outbound.recv() => {
                if out.is_none() {
                    info!("Close requested before {} opened", config.endpoint);
                    let _ = events
                        .send(TransportEvent::Closed(CloseNotice::unclean(
                            "closed before the connection opened",
                        )))
                        .await;
                    return;
                }
            }
        }
    };

    let socket = match connected {
        Ok(socket) => socket,
        Err(reason) => {
            warn!("Failed to connect to {}: {}", config.endpoint, reason);
            let _ = events
                .send(TransportEvent::Closed(CloseNotice::unclean(reason)))
                .await;
            return;
        }
    };

    info!("WebSocket open: {}", config.endpoint);
    if events.send(TransportEvent::Opened).await.is_err() {
        return;
    }

    let (mut sender, mut receiver) = socket.split();
    let mut close_requested = false;
    let close_timer = tokio::time::sleep(config.close_timeout());
    tokio::pin!(close_timer);

    let notice = loop {
        tokio::select! {
            out = outbound.recv(), if !close_requested => match out {
                Some(frame) => {
                    if let Err(e) = sender.send(into_message(frame)).await {
                        break CloseNotice::unclean(e.to_string());
                    }
                }
                None => {
                    debug!("Close requested for {}", config.endpoint);
                    close_requested = true;
                    close_timer
                        .as_mut()
                        .reset(tokio::time::Instant::now() + config.close_timeout());
                    if let Err(e) = sender.send(Message::Close(None)).await {
                        break CloseNotice::unclean(e.to_string());
                    }
                }
            },

            _ = &mut close_timer, if close_requested => {
                break CloseNotice::unclean(format!(
                    "no close reply within {:?}",
                    config.close_timeout()
                ));
            }

            inbound = receiver.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    let frame = Frame::Text(text.as_str().to_owned());
                    if events.send(TransportEvent::Frame(frame)).await.is_err() {
                        break CloseNotice::unclean("session dropped");
                    }
                }
                Some(Ok(Message::Binary(data))) => {
                    if events.send(TransportEvent::Frame(Frame::Binary(data))).await.is_err() {
                        break CloseNotice::unclean("session dropped");
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    // Flushes the close reply tungstenite queued for us.
                    let _ = sender.close().await;
                    break match frame {
                        Some(frame) => CloseNotice::clean(
                            Some(u16::from(frame.code)),
                            frame.reason.as_str(),
                        ),
                        None => CloseNotice::clean(None, ""),
                    };
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => break CloseNotice::unclean(e.to_string()),
                None => {
                    break CloseNotice::unclean("connection dropped without close handshake");
                }
            },
        }
    };

    if notice.clean {
        info!("WebSocket closed cleanly: {}", config.endpoint);
    } else {
        warn!("WebSocket lost: {} ({})", config.endpoint, notice.reason);
    }
    let _ = events.send(TransportEvent::Closed(notice)).await;
}

async fn establish(config: &TransportConfig) -> std::result::Result<Socket, String> {
    let handshake = connect_async(config.endpoint.as_str());
    let result = match config.connect_timeout() {
        Some(limit) => tokio::time::timeout(limit, handshake)
            .await
            .map_err(|_| format!("handshake timed out after {:?}", limit))?,
        None => handshake.await,
    };
    result.map(|(socket, _response)| socket).map_err(|e| e.to_string())
}

fn into_message(frame: Frame) -> Message {
    match frame {
        Frame::Text(text) => Message::Text(text.into()),
        Frame::Binary(data) => Message::Binary(data),
    }
}
