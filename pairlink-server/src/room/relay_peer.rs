use axum::extract::ws::{CloseFrame, Message};
use std::fmt;
use tokio::sync::mpsc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct ConnId(pub Uuid);

impl ConnId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Живое WebSocket соединение, занимающее слот комнаты.
/// Отправка идет через канал в send-таск соединения.
#[derive(Debug, Clone)]
pub struct RelayPeer {
    pub conn_id: ConnId,
    tx: mpsc::UnboundedSender<Message>,
}

impl RelayPeer {
    pub fn new(conn_id: ConnId, tx: mpsc::UnboundedSender<Message>) -> Self {
        Self { conn_id, tx }
    }

    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Returns `false` when the connection's writer is already gone.
    pub fn send(&self, msg: Message) -> bool {
        self.tx.send(msg).is_ok()
    }

    pub fn close(&self, code: u16, reason: &'static str) -> bool {
        self.send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.into(),
        })))
    }
}
