mod relay_link;
mod signaling_output;
mod signaling_transport;
mod transport_config;
mod ws_dialer;

pub use relay_link::*;
pub use signaling_output::*;
pub use signaling_transport::*;
pub use transport_config::*;
pub use ws_dialer::*;
