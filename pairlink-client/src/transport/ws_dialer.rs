use crate::error::TransportError;
use crate::transport::{LinkFrame, RelayDialer, RelayLink};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tracing::{debug, warn};
use url::Url;

/// WebSocket подключение к relay через tokio-tungstenite.
#[derive(Debug, Clone)]
pub struct WsDialer {
    ping_interval: Duration,
}

impl WsDialer {
    pub fn new(ping_interval: Duration) -> Self {
        Self { ping_interval }
    }
}

#[async_trait]
impl RelayDialer for WsDialer {
    async fn dial(&self, url: &Url) -> Result<RelayLink, TransportError> {
        let (ws_stream, _) = connect_async(url.as_str())
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
        let (mut write, mut read) = ws_stream.split();

        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<LinkFrame>();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<LinkFrame>();

        let mut ping_ticker = tokio::time::interval(self.ping_interval);
        ping_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    frame = outbound_rx.recv() => match frame {
                        Some(LinkFrame::Text(text)) => {
                            if write.send(Message::Text(text.into())).await.is_err() {
                                break;
                            }
                        }
                        Some(LinkFrame::Close { code, reason }) => {
                            let frame = CloseFrame {
                                code: CloseCode::from(code),
                                reason: reason.into(),
                            };
                            if let Err(e) = write.send(Message::Close(Some(frame))).await {
                                debug!("Failed to send close frame: {}", e);
                            }
                            break;
                        }
                        Some(LinkFrame::Alive) => {}
                        None => {
                            let _ = write.close().await;
                            break;
                        }
                    },
                    _ = ping_ticker.tick() => {
                        if write.send(Message::Ping(Default::default())).await.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        tokio::spawn(async move {
            while let Some(msg) = read.next().await {
                let msg = match msg {
                    Ok(msg) => msg,
                    Err(e) => {
                        debug!("Relay socket error: {}", e);
                        break;
                    }
                };

                let frame = inbound_frame(msg);
                let closing = matches!(frame, LinkFrame::Close { .. });
                if inbound_tx.send(frame).is_err() || closing {
                    break;
                }
            }
        });

        Ok(RelayLink {
            outbound: outbound_tx,
            inbound: inbound_rx,
        })
    }
}

/// Binary frames carry the same JSON as text frames.
fn inbound_frame(msg: Message) -> LinkFrame {
    match msg {
        Message::Text(text) => LinkFrame::Text(text.as_str().to_owned()),
        Message::Binary(data) => match String::from_utf8(data.to_vec()) {
            Ok(text) => LinkFrame::Text(text),
            Err(e) => {
                warn!("Dropping binary frame that is not UTF-8: {}", e);
                LinkFrame::Alive
            }
        },
        Message::Close(frame) => {
            let (code, reason) = frame
                .map(|f| (u16::from(f.code), f.reason.as_str().to_owned()))
                .unwrap_or((u16::from(CloseCode::Status), String::new()));
            LinkFrame::Close { code, reason }
        }
        _ => LinkFrame::Alive,
    }
}
