use crate::error::TransportError;
use pairlink_core::{Role, RoomId};
use std::time::Duration;
use url::Url;

pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(1);

/// Параметры подключения к relay серверу.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub relay_url: String,
    pub room: RoomId,
    pub role: Role,
    /// Пауза перед повторным подключением после обрыва.
    pub reconnect_delay: Duration,
    /// Если за это время не пришло ни одного кадра, соединение считается полуоткрытым.
    pub read_timeout: Duration,
    pub ping_interval: Duration,
}

impl TransportConfig {
    pub fn new(relay_url: impl Into<String>, room: RoomId, role: Role) -> Self {
        Self {
            relay_url: relay_url.into(),
            room,
            role,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            read_timeout: DEFAULT_READ_TIMEOUT,
            ping_interval: DEFAULT_PING_INTERVAL,
        }
    }

    /// Relay url with `room` and `type` appended to the query.
    pub fn request_url(&self) -> Result<Url, TransportError> {
        let mut url = Url::parse(&self.relay_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", self.relay_url, e)))?;

        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(TransportError::InvalidUrl(format!(
                "{}: expected ws:// or wss://",
                self.relay_url
            )));
        }

        url.query_pairs_mut()
            .append_pair("room", self.room.as_str())
            .append_pair("type", self.role.as_str());

        Ok(url)
    }
}
