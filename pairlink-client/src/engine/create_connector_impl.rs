use crate::connector::{ConnectorEvents, PeerConnector};
use crate::engine::PeerSession;
use crate::error::{NegotiationStage, SessionError};
use pairlink_core::IceCandidate;
use tracing::{debug, info, warn};

impl PeerSession {
    /// Returns the live connector, creating one on first use.
    pub(super) async fn ensure_connector(&mut self) -> Result<&dyn PeerConnector, SessionError> {
        if self.connector.is_none() {
            self.generation += 1;
            let events = ConnectorEvents::new(self.generation, self.connector_tx.clone());
            let connector = self
                .factory
                .create(events)
                .await
                .map_err(|e| SessionError::negotiation(NegotiationStage::CreateConnection, e))?;

            info!("Created peer connection #{}", self.generation);
            self.connector = Some(connector);
        }

        self.connector
            .as_deref()
            .ok_or(SessionError::Closed)
    }

    /// Drops the connector and everything tied to it: data channel,
    /// buffered candidates, the pending offer.
    pub(super) async fn release_connector(&mut self) {
        self.channel.release().await;

        if let Some(connector) = self.connector.take() {
            info!("Closing peer connection #{}", self.generation);
            if let Err(e) = connector.close().await {
                debug!("Peer connection close failed: {}", e);
            }
            // events still in flight from the closed instance are stale now
            self.generation += 1;
        }

        self.pending_candidates.clear();
        self.remote_description_set = false;
        self.local_offer = None;
        self.offer_resend_at = None;
        self.answered_offer = None;
    }

    pub(super) async fn add_remote_candidate(&mut self, candidate: IceCandidate) {
        if !self.remote_description_set || self.connector.is_none() {
            debug!(
                "Buffering remote candidate until remote description is set ({} pending)",
                self.pending_candidates.len() + 1
            );
            self.pending_candidates.push(candidate);
            return;
        }

        self.apply_candidate(candidate).await;
    }

    pub(super) async fn flush_pending_candidates(&mut self) {
        let pending = std::mem::take(&mut self.pending_candidates);
        if !pending.is_empty() {
            debug!("Applying {} buffered candidates", pending.len());
        }

        for candidate in pending {
            self.apply_candidate(candidate).await;
        }
    }

    async fn apply_candidate(&self, candidate: IceCandidate) {
        let Some(connector) = self.connector.as_deref() else {
            return;
        };

        debug!("Adding ICE: {}", candidate.candidate);
        if let Err(e) = connector.add_ice_candidate(candidate).await {
            warn!("Error adding ICE candidate: {}", e);
        }
    }
}
