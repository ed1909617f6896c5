use crate::connector::{
    ChannelState, ConnectorEvent, ConnectorEvents, ConnectorFactory, DataChannel, PeerConnector,
};
use crate::error::ConnectorError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use pairlink_core::{IceCandidate, SdpKind, SessionDescription};
use std::sync::Arc;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::setting_engine::SettingEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_init::RTCDataChannelInit;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

pub const DEFAULT_STUN_SERVERS: [&str; 3] = [
    "stun:stun.l.google.com:19302",
    "stun:stun1.l.google.com:19302",
    "stun:stun2.l.google.com:19302",
];

/// Конфигурация для WebRTC
#[derive(Debug, Clone)]
pub struct WebRtcConfig {
    pub ice_servers: Vec<String>,
    /// Gather candidates on loopback interfaces too.
    pub include_loopback: bool,
}

impl WebRtcConfig {
    /// No STUN/TURN at all: host candidates only, loopback included.
    pub fn local() -> Self {
        Self {
            ice_servers: Vec::new(),
            include_loopback: true,
        }
    }
}

impl Default for WebRtcConfig {
    fn default() -> Self {
        Self {
            ice_servers: DEFAULT_STUN_SERVERS.iter().map(|s| s.to_string()).collect(),
            include_loopback: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WebRtcConnectorFactory {
    config: WebRtcConfig,
}

impl WebRtcConnectorFactory {
    pub fn new(config: WebRtcConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ConnectorFactory for WebRtcConnectorFactory {
    async fn create(&self, events: ConnectorEvents) -> Result<Box<dyn PeerConnector>, ConnectorError> {
        let connector = WebRtcConnector::new(&self.config, events).await?;
        Ok(Box::new(connector))
    }
}

pub struct WebRtcConnector {
    peer_connection: Arc<RTCPeerConnection>,
    events: ConnectorEvents,
}

impl WebRtcConnector {
    pub async fn new(config: &WebRtcConfig, events: ConnectorEvents) -> Result<Self> {
        // кодеки регистрируются даже для чистого DataChannel, иначе SDP не соберется
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let mut settings = SettingEngine::default();
        settings.set_include_loopback_candidate(config.include_loopback);

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .with_setting_engine(settings)
            .build();

        let ice_servers = if config.ice_servers.is_empty() {
            vec![]
        } else {
            vec![RTCIceServer {
                urls: config.ice_servers.clone(),
                ..Default::default()
            }]
        };

        let rtc_config = RTCConfiguration {
            ice_servers,
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .context("Failed to create peer connection")?,
        );

        let generation = events.generation();

        let state_events = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let events = state_events.clone();

                Box::pin(async move {
                    info!("Peer connection #{} state changed: {:?}", generation, s);
                    match s {
                        RTCPeerConnectionState::Failed | RTCPeerConnectionState::Closed => {
                            events.emit(ConnectorEvent::ConnectionLost);
                        }
                        RTCPeerConnectionState::Disconnected => {
                            warn!("Peer connection #{} disconnected, waiting for ICE", generation);
                        }
                        _ => {}
                    }
                })
            },
        ));

        let ice_events = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let events = ice_events.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let init = match candidate.to_json() {
                    Ok(init) => init,
                    Err(e) => {
                        warn!("Failed to serialize local ICE candidate: {}", e);
                        return;
                    }
                };
                events.emit(ConnectorEvent::LocalCandidate(IceCandidate {
                    sdp_mid: init.sdp_mid.unwrap_or_default(),
                    sdp_m_line_index: init.sdp_mline_index.unwrap_or_default(),
                    candidate: init.candidate,
                }));
            })
        }));

        let dc_events = events.clone();
        peer_connection.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            let events = dc_events.clone();

            Box::pin(async move {
                debug!("Inbound DataChannel '{}' on connection #{}", dc.label(), generation);
                WebRtcDataChannel::wire(dc, &events, true);
            })
        }));

        Ok(Self {
            peer_connection,
            events,
        })
    }

    fn to_rtc(desc: SessionDescription) -> Result<RTCSessionDescription> {
        let rtc = match desc.kind {
            SdpKind::Offer => RTCSessionDescription::offer(desc.sdp)?,
            SdpKind::Answer => RTCSessionDescription::answer(desc.sdp)?,
        };
        Ok(rtc)
    }
}

#[async_trait]
impl PeerConnector for WebRtcConnector {
    async fn create_offer(&self) -> Result<SessionDescription, ConnectorError> {
        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .map_err(ConnectorError::engine)?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_answer(&self) -> Result<SessionDescription, ConnectorError> {
        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .map_err(ConnectorError::engine)?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), ConnectorError> {
        let desc = Self::to_rtc(desc)?;
        self.peer_connection
            .set_local_description(desc)
            .await
            .map_err(ConnectorError::engine)
    }

    async fn set_remote_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), ConnectorError> {
        let desc = Self::to_rtc(desc)?;
        self.peer_connection
            .set_remote_description(desc)
            .await
            .map_err(ConnectorError::engine)
    }

    async fn local_description(&self) -> Option<SessionDescription> {
        let desc = self.peer_connection.local_description().await?;
        match desc.sdp_type {
            RTCSdpType::Offer => Some(SessionDescription::offer(desc.sdp)),
            RTCSdpType::Answer => Some(SessionDescription::answer(desc.sdp)),
            _ => None,
        }
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), ConnectorError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: Some(candidate.sdp_mid),
            sdp_mline_index: Some(candidate.sdp_m_line_index),
            ..Default::default()
        };
        self.peer_connection
            .add_ice_candidate(init)
            .await
            .map_err(ConnectorError::engine)
    }

    async fn create_data_channel(
        &self,
        label: &str,
        ordered: bool,
    ) -> Result<Arc<dyn DataChannel>, ConnectorError> {
        let init = RTCDataChannelInit {
            ordered: Some(ordered),
            ..Default::default()
        };
        let dc = self
            .peer_connection
            .create_data_channel(label, Some(init))
            .await
            .map_err(ConnectorError::engine)?;

        Ok(WebRtcDataChannel::wire(dc, &self.events, false))
    }

    async fn close(&self) -> Result<(), ConnectorError> {
        self.peer_connection
            .close()
            .await
            .map_err(ConnectorError::engine)
    }
}

pub struct WebRtcDataChannel {
    inner: Arc<RTCDataChannel>,
}

impl WebRtcDataChannel {
    /// Wraps the channel and registers open/close/message callbacks.
    /// An inbound channel is announced before its callbacks can fire.
    fn wire(
        dc: Arc<RTCDataChannel>,
        events: &ConnectorEvents,
        inbound: bool,
    ) -> Arc<dyn DataChannel> {
        let channel: Arc<dyn DataChannel> = Arc::new(Self { inner: dc.clone() });
        if inbound {
            events.emit(ConnectorEvent::InboundChannel(channel.clone()));
        }

        let open_events = events.clone();
        let label = dc.label().to_owned();
        dc.on_open(Box::new(move || {
            let events = open_events.clone();
            let label = label.clone();
            Box::pin(async move {
                info!("DataChannel '{}' open", label);
                events.emit(ConnectorEvent::ChannelState(ChannelState::Open));
            })
        }));

        let close_events = events.clone();
        dc.on_close(Box::new(move || {
            let events = close_events.clone();
            Box::pin(async move {
                events.emit(ConnectorEvent::ChannelState(ChannelState::Closed));
            })
        }));

        let msg_events = events.clone();
        dc.on_message(Box::new(move |msg: DataChannelMessage| {
            let events = msg_events.clone();
            Box::pin(async move {
                events.emit(ConnectorEvent::ChannelMessage(msg.data));
            })
        }));

        channel
    }
}

#[async_trait]
impl DataChannel for WebRtcDataChannel {
    fn label(&self) -> String {
        self.inner.label().to_owned()
    }

    async fn send(&self, data: &Bytes) -> Result<(), ConnectorError> {
        self.inner
            .send(data)
            .await
            .map(|_| ())
            .map_err(ConnectorError::engine)
    }

    async fn close(&self) {
        if let Err(e) = self.inner.close().await {
            debug!("DataChannel close failed: {}", e);
        }
    }
}
