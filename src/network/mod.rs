pub mod codec;
pub mod discovery;
pub(crate) mod events;
pub mod listener;
pub mod peer;
pub mod registry;
pub mod transport;

pub use codec::{CodecError, Command};
pub use discovery::run_discovery;
pub use listener::{bind_listener, run_accept_loop};
pub use peer::Peer;
pub use registry::PeerRegistry;
pub use transport::dial_peer;
