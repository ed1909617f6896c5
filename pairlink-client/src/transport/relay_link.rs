use crate::error::TransportError;
use async_trait::async_trait;
use tokio::sync::mpsc;
use url::Url;

/// Кадр между транспортом и сокетом relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkFrame {
    Text(String),
    /// Ping/pong or any other frame that proves the socket is alive.
    Alive,
    Close { code: u16, reason: String },
}

/// One established relay connection, as a pair of frame channels.
/// Dropping `outbound` closes the socket; `inbound` ends when the socket dies.
#[derive(Debug)]
pub struct RelayLink {
    pub outbound: mpsc::UnboundedSender<LinkFrame>,
    pub inbound: mpsc::UnboundedReceiver<LinkFrame>,
}

#[async_trait]
pub trait RelayDialer: Send + Sync {
    async fn dial(&self, url: &Url) -> Result<RelayLink, TransportError>;
}
