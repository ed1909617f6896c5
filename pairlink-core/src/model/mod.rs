mod error;
mod peer;
mod room;
mod signaling;

pub use error::ModelError;
pub use peer::Role;
pub use room::RoomId;
pub use signaling::{IceCandidate, SdpKind, SessionDescription, SignalMessage};
