use crate::channel::ChannelAdapter;
use crate::connector::{ConnectorEvent, ConnectorFactory, PeerConnector};
use crate::error::SessionError;
use crate::transport::{SignalingEvent, SignalingOutput};
use pairlink_core::{IceCandidate, Role, SessionDescription};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant};
use tracing::{error, info};

mod connector_events_impl;
mod create_connector_impl;
mod create_offer_impl;
mod handle_remote_offer_impl;
mod handle_signal_impl;
mod session_handle;


pub use session_handle::*;

pub const DEFAULT_CHANNEL_LABEL: &str = "chat";
pub const DEFAULT_OFFER_RESEND_INTERVAL: Duration = Duration::from_secs(2);

/// Состояние переговоров одной сессии.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    Idle,
    SignalingConnected,
    AwaitingOffer,
    Offering,
    DescriptionExchanged,
    ChannelOpen,
    Closed,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub channel_label: String,
    /// The initiator offers as soon as the relay connection opens.
    pub offer_on_connect: bool,
    /// Drop the relay connection once the data channel is open.
    pub close_signaling_on_open: bool,
    /// The relay drops messages for an empty slot, so an unanswered offer
    /// goes out again on this period. `None` sends it once.
    pub offer_resend_interval: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            channel_label: DEFAULT_CHANNEL_LABEL.to_owned(),
            offer_on_connect: true,
            close_signaling_on_open: false,
            offer_resend_interval: Some(DEFAULT_OFFER_RESEND_INTERVAL),
        }
    }
}

/// Движок переговоров. Одна задача на сессию: команды пользователя,
/// сигнальные сообщения и события peer connection обрабатываются строго по очереди.
pub struct PeerSession {
    role: Role,
    config: SessionConfig,
    signaling: Arc<dyn SignalingOutput>,
    factory: Arc<dyn ConnectorFactory>,
    connector: Option<Box<dyn PeerConnector>>,
    generation: u64,
    connector_tx: mpsc::UnboundedSender<(u64, ConnectorEvent)>,
    channel: ChannelAdapter,
    pending_candidates: Vec<IceCandidate>,
    remote_description_set: bool,
    local_offer: Option<SessionDescription>,
    offer_resend_at: Option<Instant>,
    answered_offer: Option<String>,
    state_tx: watch::Sender<NegotiationState>,
    notices: mpsc::UnboundedSender<SessionNotice>,
}

impl PeerSession {
    pub fn spawn(
        role: Role,
        config: SessionConfig,
        signaling: Arc<dyn SignalingOutput>,
        signaling_rx: mpsc::UnboundedReceiver<SignalingEvent>,
        factory: Arc<dyn ConnectorFactory>,
    ) -> (SessionHandle, mpsc::UnboundedReceiver<SessionNotice>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (connector_tx, connector_rx) = mpsc::unbounded_channel();
        let (notices, notices_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(NegotiationState::Idle);

        let session = PeerSession {
            role,
            config,
            signaling,
            factory,
            connector: None,
            generation: 0,
            connector_tx,
            channel: ChannelAdapter::default(),
            pending_candidates: Vec::new(),
            remote_description_set: false,
            local_offer: None,
            offer_resend_at: None,
            answered_offer: None,
            state_tx,
            notices,
        };

        tokio::spawn(session.run(command_rx, signaling_rx, connector_rx));

        (SessionHandle::new(command_tx, state_rx), notices_rx)
    }

    async fn run(
        mut self,
        mut command_rx: mpsc::UnboundedReceiver<SessionCommand>,
        mut signaling_rx: mpsc::UnboundedReceiver<SignalingEvent>,
        mut connector_rx: mpsc::UnboundedReceiver<(u64, ConnectorEvent)>,
    ) {
        loop {
            tokio::select! {
                command = command_rx.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                Some(event) = signaling_rx.recv() => self.handle_signaling_event(event).await,
                Some((generation, event)) = connector_rx.recv() => {
                    self.handle_connector_event(generation, event).await
                }
                _ = resend_due(self.offer_resend_at),
                    if self.state() == NegotiationState::Offering => self.resend_offer().await,
            }
        }

        self.close().await;
        info!("Session task for {} finished", self.role);
    }

    async fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Connect => {
                if self.state() == NegotiationState::Closed {
                    self.notify(SessionNotice::Error(SessionError::Closed));
                    return;
                }
                self.signaling.connect().await;
            }
            SessionCommand::Offer => self.start_offer().await,
            SessionCommand::Send { data, reply } => {
                let result = match self.state() {
                    NegotiationState::Closed => Err(SessionError::Closed),
                    state => self.channel.send(state, &data).await,
                };
                let _ = reply.send(result);
            }
            SessionCommand::Disconnect { reply } => {
                self.close().await;
                let _ = reply.send(());
            }
        }
    }

    pub(super) fn schedule_offer_resend(&mut self) {
        self.offer_resend_at = self
            .config
            .offer_resend_interval
            .map(|period| Instant::now() + period);
    }

    pub(super) fn state(&self) -> NegotiationState {
        *self.state_tx.borrow()
    }

    pub(super) fn set_state(&self, state: NegotiationState) {
        let previous = self.state_tx.send_replace(state);
        if previous != state {
            info!("Session {}: {:?} -> {:?}", self.role, previous, state);
            self.notify(SessionNotice::State(state));
        }
    }

    /// Where a connected session rests between negotiation attempts.
    pub(super) fn resting_state(&self) -> NegotiationState {
        match self.role {
            Role::Initiator => NegotiationState::SignalingConnected,
            Role::Responder => NegotiationState::AwaitingOffer,
        }
    }

    pub(super) fn notify(&self, notice: SessionNotice) {
        let _ = self.notices.send(notice);
    }

    /// Отказ переговоров: сообщаем приложению и возвращаемся в исходное состояние.
    pub(super) async fn fail(&mut self, err: SessionError) {
        error!("Negotiation failed: {}", err);
        self.notify(SessionNotice::Error(err));
        self.release_connector().await;
        self.set_state(self.resting_state());
    }

    pub(super) async fn close(&mut self) {
        if self.state() == NegotiationState::Closed {
            return;
        }

        self.release_connector().await;
        self.signaling.disconnect().await;
        self.set_state(NegotiationState::Closed);
    }
}

async fn resend_due(at: Option<Instant>) {
    match at {
        Some(at) => time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
