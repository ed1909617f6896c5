mod relay_peer;
mod room;
mod room_manager;

pub use relay_peer::*;
pub use room::*;
pub use room_manager::*;
