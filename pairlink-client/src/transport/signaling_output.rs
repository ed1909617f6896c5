use async_trait::async_trait;
use pairlink_core::{IceCandidate, SignalMessage};

/// События сигнального канала для движка переговоров.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalingEvent {
    Connected,
    Message(SignalMessage),
    Disconnected,
}

/// Исходящая сторона сигнального канала, как ее видит движок.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    async fn connect(&self);

    async fn disconnect(&self);

    /// Fire-and-forget: dropped when the relay connection is not open.
    async fn send_signal(&self, msg: SignalMessage);

    async fn send_offer(&self, sdp: String) {
        self.send_signal(SignalMessage::Offer { sdp }).await
    }

    async fn send_answer(&self, sdp: String) {
        self.send_signal(SignalMessage::Answer { sdp }).await
    }

    async fn send_ice(&self, candidate: IceCandidate) {
        self.send_signal(SignalMessage::Candidate(candidate)).await
    }
}
