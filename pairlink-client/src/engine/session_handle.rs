use crate::engine::NegotiationState;
use crate::error::SessionError;
use bytes::Bytes;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};

pub(crate) enum SessionCommand {
    Connect,
    Offer,
    Send {
        data: Bytes,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    Disconnect {
        reply: oneshot::Sender<()>,
    },
}

/// Уведомления сессии для приложения.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionNotice {
    /// Payload received on the data channel, in channel order.
    Data(Bytes),
    Error(SessionError),
    State(NegotiationState),
}

/// Клонируемая ручка управления сессией.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    state: watch::Receiver<NegotiationState>,
}

impl SessionHandle {
    pub(crate) fn new(
        commands: mpsc::UnboundedSender<SessionCommand>,
        state: watch::Receiver<NegotiationState>,
    ) -> Self {
        Self { commands, state }
    }

    pub fn connect(&self) -> Result<(), SessionError> {
        self.commands
            .send(SessionCommand::Connect)
            .map_err(|_| SessionError::Closed)
    }

    /// Starts an offer, or re-sends the pending one while still waiting for an answer.
    pub fn offer(&self) -> Result<(), SessionError> {
        self.commands
            .send(SessionCommand::Offer)
            .map_err(|_| SessionError::Closed)
    }

    pub async fn send(&self, data: impl Into<Bytes>) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(SessionCommand::Send {
                data: data.into(),
                reply,
            })
            .map_err(|_| SessionError::Closed)?;

        rx.await.map_err(|_| SessionError::Closed)?
    }

    /// Closes the session. Safe to call more than once.
    pub async fn disconnect(&self) {
        let (reply, rx) = oneshot::channel();
        if self
            .commands
            .send(SessionCommand::Disconnect { reply })
            .is_ok()
        {
            let _ = rx.await;
        }
    }

    pub fn state(&self) -> NegotiationState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<NegotiationState> {
        self.state.clone()
    }

    /// Waits until the session reaches `target`. Returns `false` on timeout
    /// or if the session task is gone.
    pub async fn wait_for_state(&self, target: NegotiationState, timeout: Duration) -> bool {
        let mut state = self.state.clone();
        matches!(
            tokio::time::timeout(timeout, state.wait_for(|s| *s == target)).await,
            Ok(Ok(_))
        )
    }
}
