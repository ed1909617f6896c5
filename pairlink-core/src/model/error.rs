use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("room id must not be empty")]
    InvalidRoomId,

    #[error("unknown peer role '{0}'")]
    UnknownRole(String),
}
