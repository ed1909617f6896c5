use anyhow::{Context, Result, bail};
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// Raw WebSocket client speaking to the relay, used to observe forwarding.
pub struct TestClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[derive(Debug, PartialEq)]
pub enum Received {
    Text(String),
    Binary(Vec<u8>),
    Closed { code: Option<u16>, reason: String },
    Nothing,
}

impl TestClient {
    pub async fn connect(base_url: &str, query: &str) -> Result<Self> {
        let url = if query.is_empty() {
            base_url.to_owned()
        } else {
            format!("{}?{}", base_url, query)
        };
        let (ws, _) = connect_async(url.as_str())
            .await
            .with_context(|| format!("Failed to connect to {}", url))?;
        Ok(Self { ws })
    }

    pub async fn join(base_url: &str, room: &str, role: &str) -> Result<Self> {
        Self::connect(base_url, &format!("room={}&type={}", room, role)).await
    }

    pub async fn send_text(&mut self, text: &str) -> Result<()> {
        self.ws.send(Message::Text(text.to_owned().into())).await?;
        Ok(())
    }

    pub async fn send_binary(&mut self, data: &[u8]) -> Result<()> {
        self.ws.send(Message::Binary(data.to_vec().into())).await?;
        Ok(())
    }

    /// Next data or close frame, or `Received::Nothing` after `timeout_ms`.
    pub async fn recv(&mut self, timeout_ms: u64) -> Result<Received> {
        let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);

        loop {
            let next = tokio::time::timeout_at(deadline, self.ws.next()).await;
            let msg = match next {
                Err(_) => return Ok(Received::Nothing),
                Ok(None) => {
                    return Ok(Received::Closed {
                        code: None,
                        reason: String::new(),
                    });
                }
                Ok(Some(msg)) => msg?,
            };

            match msg {
                Message::Text(text) => return Ok(Received::Text(text.as_str().to_owned())),
                Message::Binary(data) => return Ok(Received::Binary(data.to_vec())),
                Message::Close(frame) => {
                    return Ok(match frame {
                        Some(CloseFrame { code, reason }) => Received::Closed {
                            code: Some(u16::from(code)),
                            reason: reason.as_str().to_owned(),
                        },
                        None => Received::Closed {
                            code: None,
                            reason: String::new(),
                        },
                    });
                }
                _ => continue,
            }
        }
    }

    pub async fn expect_text(&mut self, timeout_ms: u64) -> Result<String> {
        match self.recv(timeout_ms).await? {
            Received::Text(text) => Ok(text),
            other => bail!("Expected text frame, got {:?}", other),
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.ws
            .close(Some(CloseFrame {
                code: CloseCode::Normal,
                reason: "User disconnected".into(),
            }))
            .await?;
        Ok(())
    }
}
