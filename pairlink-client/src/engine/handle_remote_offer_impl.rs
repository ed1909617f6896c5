use crate::engine::{NegotiationState, PeerSession};
use crate::error::{NegotiationStage, SessionError};
use pairlink_core::{Role, SdpKind, SessionDescription};
use std::cmp::Ordering;
use tracing::{debug, info, warn};

impl PeerSession {
    pub(super) async fn handle_remote_offer(&mut self, remote_sdp: String) {
        match self.state() {
            NegotiationState::SignalingConnected | NegotiationState::AwaitingOffer => {}
            NegotiationState::Offering => {
                if !self.yields_to(&remote_sdp) {
                    info!("Offer collision: keeping own offer, ignoring peer's");
                    return;
                }
                info!("Offer collision: yielding to peer's offer");
                self.release_connector().await;
            }
            NegotiationState::DescriptionExchanged | NegotiationState::ChannelOpen
                if self.is_answered_offer(&remote_sdp) =>
            {
                info!("Peer repeated the offer we answered, re-sending ANSWER");
                self.resend_answer().await;
                return;
            }
            NegotiationState::DescriptionExchanged | NegotiationState::ChannelOpen => {
                info!("Peer sent a new offer, restarting peer connection");
                self.release_connector().await;
                self.set_state(self.resting_state());
            }
            state => {
                debug!("Ignoring offer in state {:?}", state);
                return;
            }
        }

        if let Err(e) = self.answer_offer(remote_sdp).await {
            self.fail(e).await;
        }
    }

    /// Both peers compare the same two offers, so exactly one of them yields.
    /// Only the origin lines are compared: a repeated offer may carry more
    /// candidates than the first copy did.
    fn yields_to(&self, remote_sdp: &str) -> bool {
        let Some(own) = &self.local_offer else {
            return true;
        };

        match sdp_origin(&own.sdp).cmp(sdp_origin(remote_sdp)) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => self.role == Role::Responder,
        }
    }

    fn is_answered_offer(&self, remote_sdp: &str) -> bool {
        self.answered_offer
            .as_deref()
            .is_some_and(|answered| sdp_origin(answered) == sdp_origin(remote_sdp))
    }

    async fn resend_answer(&self) {
        let Some(connector) = self.connector.as_deref() else {
            return;
        };

        match connector.local_description().await {
            Some(answer) if answer.kind == SdpKind::Answer => {
                self.signaling.send_answer(answer.sdp).await;
            }
            _ => warn!("No local answer to re-send"),
        }
    }

    async fn answer_offer(&mut self, remote_sdp: String) -> Result<(), SessionError> {
        let connector = self.ensure_connector().await?;
        connector
            .set_remote_description(SessionDescription::offer(remote_sdp.clone()))
            .await
            .map_err(|e| SessionError::negotiation(NegotiationStage::ApplyRemote, e))?;

        self.remote_description_set = true;
        self.answered_offer = Some(remote_sdp);
        self.flush_pending_candidates().await;

        let connector = self.ensure_connector().await?;
        let answer = connector
            .create_answer()
            .await
            .map_err(|e| SessionError::negotiation(NegotiationStage::CreateAnswer, e))?;

        connector
            .set_local_description(answer.clone())
            .await
            .map_err(|e| SessionError::negotiation(NegotiationStage::ApplyLocal, e))?;

        self.set_state(NegotiationState::DescriptionExchanged);

        info!("Sending ANSWER to relay");
        self.signaling.send_answer(answer.sdp).await;
        Ok(())
    }

    pub(super) async fn handle_remote_answer(&mut self, remote_sdp: String) {
        if self.state() != NegotiationState::Offering {
            warn!("Ignoring answer in state {:?}", self.state());
            return;
        }
        let Some(connector) = self.connector.as_deref() else {
            warn!("Ignoring answer without a peer connection");
            return;
        };

        let applied = connector
            .set_remote_description(SessionDescription::answer(remote_sdp))
            .await;
        if let Err(e) = applied {
            self.fail(SessionError::negotiation(NegotiationStage::ApplyRemote, e))
                .await;
            return;
        }

        info!("Remote description set (Answer)");
        self.remote_description_set = true;
        self.flush_pending_candidates().await;
        self.set_state(NegotiationState::DescriptionExchanged);
    }
}

/// The `o=` line names the session and its version; a description without
/// one is compared whole.
fn sdp_origin(sdp: &str) -> &str {
    sdp.lines()
        .find(|line| line.starts_with("o="))
        .unwrap_or(sdp)
}
