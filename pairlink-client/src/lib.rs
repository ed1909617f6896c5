pub mod channel;
pub mod connector;
pub mod engine;
mod error;
mod peer;
pub mod transport;

pub use channel::*;
pub use connector::*;
pub use engine::*;
pub use error::*;
pub use peer::*;
pub use transport::*;
