// src/network/registry.rs

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::Sender;
use tokio::sync::Mutex;

use crate::network::peer::Peer;

#[derive(Debug)]
struct PortEntry {
    peer: Option<Peer>,
    live: bool,
    is_self: bool,
}

/// Single source of truth for "have we dialed or been dialed by this port".
///
/// Shared mutably by the accept path, the discovery sweep, and every
/// connection handler, so all state lives behind one async mutex. Two
/// distinct facts are tracked per port: `known` (a handshake ever
/// completed; never cleared) and `live` (a connection currently exists;
/// cleared on loss so the sweep can re-dial).
#[derive(Clone)]
pub struct PeerRegistry {
    inner: Arc<Mutex<HashMap<u16, PortEntry>>>,
}

impl Default for PeerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Pre-seed the node's own port as permanently live so the discovery
    /// sweep never dials it.
    pub async fn seed_self(&self, port: u16) {
        let mut map = self.inner.lock().await;
        map.insert(
            port,
            PortEntry {
                peer: None,
                live: true,
                is_self: true,
            },
        );
    }

    /// Register a completed handshake. Idempotent and deduped by port:
    /// re-registering replaces the stored sender in place, it never appends
    /// a second entry. Registering the self port is a no-op.
    pub async fn register(&self, port: u16, sender: Sender<String>) {
        let mut map = self.inner.lock().await;
        match map.get_mut(&port) {
            Some(entry) if entry.is_self => {}
            Some(entry) => {
                entry.peer = Some(Peer::new(port, sender));
                entry.live = true;
            }
            None => {
                map.insert(
                    port,
                    PortEntry {
                        peer: Some(Peer::new(port, sender)),
                        live: true,
                        is_self: false,
                    },
                );
            }
        }
    }

    /// A live connection for this port exists (self counts as live).
    pub async fn is_live(&self, port: u16) -> bool {
        self.inner
            .lock()
            .await
            .get(&port)
            .map(|e| e.live)
            .unwrap_or(false)
    }

    /// The port has ever completed a handshake. Never cleared.
    pub async fn is_known(&self, port: u16) -> bool {
        self.inner.lock().await.contains_key(&port)
    }

    /// Clear the live flag on connection loss. The port stays known; the
    /// next discovery sweep is free to dial it again.
    pub async fn mark_lost(&self, port: u16) {
        let mut map = self.inner.lock().await;
        if let Some(entry) = map.get_mut(&port) {
            if !entry.is_self {
                entry.live = false;
                entry.peer = None;
            }
        }
    }

    /// Ports with a live peer connection (self excluded).
    pub async fn live_peers(&self) -> Vec<u16> {
        let map = self.inner.lock().await;
        let mut ports: Vec<u16> = map
            .iter()
            .filter(|(_, e)| e.live && !e.is_self)
            .map(|(p, _)| *p)
            .collect();
        ports.sort_unstable();
        ports
    }

    /// All ports ever registered, self included.
    pub async fn known_ports(&self) -> Vec<u16> {
        let map = self.inner.lock().await;
        let mut ports: Vec<u16> = map.keys().copied().collect();
        ports.sort_unstable();
        ports
    }

    /// Send a serialized wire line (without trailing newline) to every live
    /// peer. Returns how many peers it was handed to.
    pub async fn broadcast(&self, message: &str) -> usize {
        let senders: Vec<Sender<String>> = {
            let map = self.inner.lock().await;
            map.values()
                .filter(|e| e.live && !e.is_self)
                .filter_map(|e| e.peer.as_ref().map(|p| p.sender.clone()))
                .collect()
        };
        let mut delivered = 0usize;
        for sender in senders {
            // A closed channel means the writer task is gone; the read side
            // of that connection will mark the port lost.
            if sender.send(message.to_string()).await.is_ok() {
                delivered += 1;
            }
        }
        delivered
    }
}
