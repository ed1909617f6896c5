use crate::connector::{ChannelState, ConnectorEvent};
use crate::engine::{NegotiationState, PeerSession, SessionNotice};
use tracing::{debug, info, warn};

impl PeerSession {
    pub(super) async fn handle_connector_event(&mut self, generation: u64, event: ConnectorEvent) {
        if generation != self.generation || self.connector.is_none() {
            debug!("Ignoring {:?} from stale peer connection #{}", event, generation);
            return;
        }

        match event {
            ConnectorEvent::LocalCandidate(candidate) => {
                debug!("Sending local ICE candidate");
                self.signaling.send_ice(candidate).await;
            }
            ConnectorEvent::InboundChannel(channel) => {
                info!("Received DataChannel: {}", channel.label());
                self.channel.attach(channel);
            }
            ConnectorEvent::ChannelState(ChannelState::Open) => {
                if self.state() != NegotiationState::DescriptionExchanged {
                    debug!("DataChannel open in state {:?}", self.state());
                    return;
                }
                self.set_state(NegotiationState::ChannelOpen);
                if self.config.close_signaling_on_open {
                    info!("DataChannel open, leaving relay");
                    self.signaling.disconnect().await;
                }
            }
            ConnectorEvent::ChannelState(ChannelState::Closed) => {
                info!("DataChannel closed");
                self.close().await;
            }
            ConnectorEvent::ChannelMessage(data) => {
                self.notify(SessionNotice::Data(data));
            }
            ConnectorEvent::ConnectionLost => {
                warn!("Peer connection lost");
                self.close().await;
            }
        }
    }
}
