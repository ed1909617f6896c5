use crate::engine::{NegotiationState, PeerSession, SessionNotice};
use crate::error::SessionError;
use crate::transport::SignalingEvent;
use pairlink_core::{Role, SignalMessage};
use tracing::{debug, info, warn};

impl PeerSession {
    pub(super) async fn handle_signaling_event(&mut self, event: SignalingEvent) {
        match event {
            SignalingEvent::Connected => self.on_signaling_connected().await,
            SignalingEvent::Disconnected => info!("Relay connection lost ({:?})", self.state()),
            SignalingEvent::Message(msg) => self.handle_signal(msg).await,
        }
    }

    async fn on_signaling_connected(&mut self) {
        match self.state() {
            NegotiationState::Idle => {
                self.set_state(self.resting_state());
                if self.role == Role::Initiator && self.config.offer_on_connect {
                    self.start_offer().await;
                }
            }
            NegotiationState::SignalingConnected => {
                if self.config.offer_on_connect {
                    self.start_offer().await;
                }
            }
            // the peer may have missed the offer while it was away
            NegotiationState::Offering => self.resend_offer().await,
            state => debug!("Relay reconnected in state {:?}", state),
        }
    }

    async fn handle_signal(&mut self, msg: SignalMessage) {
        if matches!(
            self.state(),
            NegotiationState::Idle | NegotiationState::Closed
        ) {
            debug!("Dropping {} in state {:?}", msg.kind(), self.state());
            return;
        }

        match msg {
            SignalMessage::Offer { sdp } => {
                info!("Received OFFER from relay");
                self.handle_remote_offer(sdp).await;
            }
            SignalMessage::Answer { sdp } => {
                info!("Received ANSWER from relay");
                self.handle_remote_answer(sdp).await;
            }
            SignalMessage::Candidate(candidate) => self.add_remote_candidate(candidate).await,
            SignalMessage::Error { message } => {
                warn!("Peer reported an error: {}", message);
                self.notify(SessionNotice::Error(SessionError::Remote(message)));
            }
        }
    }
}
