mod webrtc_connector;

pub use webrtc_connector::*;

use crate::error::ConnectorError;
use async_trait::async_trait;
use bytes::Bytes;
use pairlink_core::{IceCandidate, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Open,
    Closed,
}

/// События, которые peer connection генерирует асинхронно, вне вызовов движка.
pub enum ConnectorEvent {
    /// Сгенерирован локальный ICE-кандидат, его нужно отправить пиру.
    LocalCandidate(IceCandidate),

    /// Пир открыл data channel (сторона responder).
    InboundChannel(Arc<dyn DataChannel>),

    ChannelState(ChannelState),

    /// Получено бинарное сообщение из data channel.
    ChannelMessage(Bytes),

    /// Peer connection перешло в Failed или Closed.
    ConnectionLost,
}

impl std::fmt::Debug for ConnectorEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectorEvent::LocalCandidate(c) => f.debug_tuple("LocalCandidate").field(c).finish(),
            ConnectorEvent::InboundChannel(dc) => {
                f.debug_tuple("InboundChannel").field(&dc.label()).finish()
            }
            ConnectorEvent::ChannelState(s) => f.debug_tuple("ChannelState").field(s).finish(),
            ConnectorEvent::ChannelMessage(b) => {
                f.debug_tuple("ChannelMessage").field(&b.len()).finish()
            }
            ConnectorEvent::ConnectionLost => f.write_str("ConnectionLost"),
        }
    }
}

/// Sender handed to each connector instance. Events are stamped with the
/// instance generation so the session can ignore a replaced connector.
#[derive(Clone)]
pub struct ConnectorEvents {
    generation: u64,
    tx: mpsc::UnboundedSender<(u64, ConnectorEvent)>,
}

impl ConnectorEvents {
    pub fn new(generation: u64, tx: mpsc::UnboundedSender<(u64, ConnectorEvent)>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn emit(&self, event: ConnectorEvent) {
        let _ = self.tx.send((self.generation, event));
    }
}

#[async_trait]
pub trait DataChannel: Send + Sync {
    fn label(&self) -> String;

    async fn send(&self, data: &Bytes) -> Result<(), ConnectorError>;

    async fn close(&self);
}

/// Возможность peer connection: все, что движку переговоров нужно от WebRTC.
#[async_trait]
pub trait PeerConnector: Send + Sync {
    async fn create_offer(&self) -> Result<SessionDescription, ConnectorError>;

    async fn create_answer(&self) -> Result<SessionDescription, ConnectorError>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), ConnectorError>;

    async fn set_remote_description(&self, desc: SessionDescription)
    -> Result<(), ConnectorError>;

    /// The applied local description, including candidates gathered since.
    async fn local_description(&self) -> Option<SessionDescription>;

    /// Only valid once a remote description has been applied.
    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), ConnectorError>;

    async fn create_data_channel(
        &self,
        label: &str,
        ordered: bool,
    ) -> Result<Arc<dyn DataChannel>, ConnectorError>;

    async fn close(&self) -> Result<(), ConnectorError>;
}

#[async_trait]
pub trait ConnectorFactory: Send + Sync {
    async fn create(&self, events: ConnectorEvents) -> Result<Box<dyn PeerConnector>, ConnectorError>;
}
