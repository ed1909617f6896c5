use crate::engine::{NegotiationState, PeerSession};
use crate::error::{NegotiationStage, SessionError};
use pairlink_core::SdpKind;
use tracing::{info, warn};

impl PeerSession {
    pub(super) async fn start_offer(&mut self) {
        match self.state() {
            NegotiationState::Offering => {
                self.resend_offer().await;
                return;
            }
            NegotiationState::SignalingConnected | NegotiationState::AwaitingOffer => {}
            state => {
                warn!("Cannot offer in state {:?}", state);
                return;
            }
        }

        if let Err(e) = self.create_offer().await {
            self.fail(e).await;
        }
    }

    /// Channel first, then offer, then local description; the offer goes
    /// out only after it has been applied locally.
    async fn create_offer(&mut self) -> Result<(), SessionError> {
        let label = self.config.channel_label.clone();
        let connector = self.ensure_connector().await?;

        let channel = connector
            .create_data_channel(&label, true)
            .await
            .map_err(|e| SessionError::negotiation(NegotiationStage::CreateChannel, e))?;

        let offer = connector
            .create_offer()
            .await
            .map_err(|e| SessionError::negotiation(NegotiationStage::CreateOffer, e))?;

        connector
            .set_local_description(offer.clone())
            .await
            .map_err(|e| SessionError::negotiation(NegotiationStage::ApplyLocal, e))?;

        self.channel.attach(channel);
        self.local_offer = Some(offer.clone());
        self.set_state(NegotiationState::Offering);

        info!("Sending OFFER to relay");
        self.signaling.send_offer(offer.sdp).await;
        self.schedule_offer_resend();
        Ok(())
    }

    /// Trickled candidates were dropped along with the first offer, so the
    /// repeat carries the current local description.
    pub(super) async fn resend_offer(&mut self) {
        let Some(pending) = self.local_offer.clone() else {
            warn!("Offering without a local offer");
            return;
        };

        let offer = match self.connector.as_deref() {
            Some(connector) => connector
                .local_description()
                .await
                .filter(|desc| desc.kind == SdpKind::Offer)
                .unwrap_or(pending),
            None => pending,
        };

        info!("Re-sending pending OFFER");
        self.signaling.send_offer(offer.sdp).await;
        self.schedule_offer_resend();
    }
}
