// src/network/peer.rs

use tokio::sync::mpsc::Sender;

/// A connected sibling node. The live byte stream itself is owned by the
/// connection handler task; everyone else reaches the peer through the
/// outbound line sender.
#[derive(Debug, Clone)]
pub struct Peer {
    /// The port the peer announced (or was dialed on).
    pub port: u16,
    /// Channel into the peer's writer task; each message is one wire line.
    pub sender: Sender<String>,
}

impl Peer {
    pub fn new(port: u16, sender: Sender<String>) -> Self {
        Self { port, sender }
    }
}
