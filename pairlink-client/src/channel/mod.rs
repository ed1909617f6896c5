use crate::connector::DataChannel;
use crate::engine::NegotiationState;
use crate::error::SessionError;
use bytes::Bytes;
use std::sync::Arc;
use tracing::debug;

/// Обертка над data channel сессии: не больше одного канала за раз.
#[derive(Default)]
pub struct ChannelAdapter {
    channel: Option<Arc<dyn DataChannel>>,
}

impl ChannelAdapter {
    pub fn attach(&mut self, channel: Arc<dyn DataChannel>) {
        debug!("Attaching DataChannel '{}'", channel.label());
        self.channel = Some(channel);
    }

    pub fn is_attached(&self) -> bool {
        self.channel.is_some()
    }

    pub async fn send(&self, state: NegotiationState, data: &Bytes) -> Result<(), SessionError> {
        let channel = match (&self.channel, state) {
            (Some(channel), NegotiationState::ChannelOpen) => channel,
            _ => return Err(SessionError::ChannelNotReady),
        };

        channel.send(data).await.map_err(SessionError::Send)
    }

    pub async fn release(&mut self) {
        if let Some(channel) = self.channel.take() {
            debug!("Releasing DataChannel '{}'", channel.label());
            channel.close().await;
        }
    }
}
