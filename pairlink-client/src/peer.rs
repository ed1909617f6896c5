use crate::connector::{ConnectorFactory, WebRtcConfig, WebRtcConnectorFactory};
use crate::engine::{PeerSession, SessionConfig, SessionHandle, SessionNotice};
use crate::error::TransportError;
use crate::transport::{SignalingTransport, TransportConfig};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// Собирает сессию поверх WebSocket relay и WebRTC.
pub fn spawn_peer(
    transport: TransportConfig,
    session: SessionConfig,
    webrtc: WebRtcConfig,
) -> Result<(SessionHandle, mpsc::UnboundedReceiver<SessionNotice>), TransportError> {
    spawn_peer_with(transport, session, Arc::new(WebRtcConnectorFactory::new(webrtc)))
}

pub fn spawn_peer_with(
    transport: TransportConfig,
    session: SessionConfig,
    factory: Arc<dyn ConnectorFactory>,
) -> Result<(SessionHandle, mpsc::UnboundedReceiver<SessionNotice>), TransportError> {
    let role = transport.role;
    let (signaling, signaling_rx) = SignalingTransport::new(transport)?;
    info!("Peer {} will use relay {}", role, signaling.url());

    Ok(PeerSession::spawn(
        role,
        session,
        Arc::new(signaling),
        signaling_rx,
        factory,
    ))
}
