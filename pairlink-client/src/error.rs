use thiserror::Error;

/// Ошибки возможности peer connection (движка WebRTC).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectorError {
    #[error("peer connection engine error: {0}")]
    Engine(String),

    #[error("peer connection is closed")]
    Closed,
}

impl ConnectorError {
    pub fn engine(err: impl std::fmt::Display) -> Self {
        ConnectorError::Engine(err.to_string())
    }
}

impl From<anyhow::Error> for ConnectorError {
    fn from(err: anyhow::Error) -> Self {
        ConnectorError::Engine(format!("{:#}", err))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("invalid relay url: {0}")]
    InvalidUrl(String),

    #[error("connection to relay failed: {0}")]
    ConnectionFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationStage {
    CreateOffer,
    CreateAnswer,
    ApplyLocal,
    ApplyRemote,
    CreateChannel,
    CreateConnection,
}

impl std::fmt::Display for NegotiationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stage = match self {
            NegotiationStage::CreateOffer => "create offer",
            NegotiationStage::CreateAnswer => "create answer",
            NegotiationStage::ApplyLocal => "apply local description",
            NegotiationStage::ApplyRemote => "apply remote description",
            NegotiationStage::CreateChannel => "create data channel",
            NegotiationStage::CreateConnection => "create peer connection",
        };
        f.write_str(stage)
    }
}

/// Ошибки уровня сессии, которые видит приложение.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("data channel is not open")]
    ChannelNotReady,

    #[error("session is closed")]
    Closed,

    #[error("negotiation failed to {stage}: {source}")]
    Negotiation {
        stage: NegotiationStage,
        #[source]
        source: ConnectorError,
    },

    #[error("data channel send failed: {0}")]
    Send(#[source] ConnectorError),

    #[error("peer reported an error: {0}")]
    Remote(String),
}

impl SessionError {
    pub fn negotiation(stage: NegotiationStage, source: ConnectorError) -> Self {
        SessionError::Negotiation { stage, source }
    }
}
