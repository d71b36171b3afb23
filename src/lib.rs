//! # tallymesh Core Library
//!
//! Minimal peer-to-peer node that discovers sibling nodes on a fixed local
//! port range, speaks a small line-oriented control protocol over TCP, and
//! replicates decoded vote-tally records into a backing document store.
//!
//! ## Design Principles
//! * Async-first: all I/O paths are non-blocking (Tokio).
//! * Flat concurrency: one long-lived task per connection plus the accept
//!   loop and the discovery sweep; no central scheduler.
//! * Liveness over error visibility: transient dial and decode failures are
//!   logged and skipped, only startup failures are fatal.
//! * Event-driven instrumentation (JSON line audit log + console).
//!
//! ## Key Modules
//! * `config` – Runtime configuration (TOML + env override).
//! * `network` – Listener, discovery sweep, wire codec, peer registry.
//! * `replication` – Tally records and the document-store boundary.
//! * `events` – Structured logging/events dispatcher.

pub mod config;
pub mod constants;
pub mod events;
pub mod network;
pub mod prelude; // curated stable-intent re-exports
pub mod replication;

use crate::network::codec::Command;
use crate::network::registry::PeerRegistry;
use crate::replication::record::CandidateTally;
use crate::replication::store::ReplicationSink;
use std::sync::Arc;
use thiserror::Error;

/// Failures of the initialization phase. The core surfaces these as typed
/// results; the caller (not the core) decides whether to retry or abort.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind listen port: {0}")]
    Bind(#[source] std::io::Error),
    #[error("failed to open tally store: {0}")]
    StoreOpen(#[source] std::io::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// tallymesh Core Struct
pub struct TallyNode {
    config: config::Config,
    registry: PeerRegistry,
    sink: Arc<dyn ReplicationSink>,
}

impl TallyNode {
    /// Initializes the node around an already-opened replication sink.
    pub fn new(config: config::Config, sink: Arc<dyn ReplicationSink>) -> Self {
        Self {
            config,
            registry: PeerRegistry::new(),
            sink,
        }
    }

    pub fn registry(&self) -> &PeerRegistry {
        &self.registry
    }

    pub fn port(&self) -> u16 {
        self.config.port
    }

    /// Starts the P2P node: seeds the self port, binds the listener
    /// (surfacing a bind failure synchronously), then spawns the accept
    /// loop and the discovery sweep. Returns once both are running.
    pub async fn start(&self) -> Result<(), StartupError> {
        let settings = self.config.discovery_settings();
        if settings.range_start > settings.range_end {
            return Err(StartupError::Config(format!(
                "discovery range [{},{}] is empty",
                settings.range_start, settings.range_end
            )));
        }

        self.registry.seed_self(self.config.port).await;

        let listener = network::bind_listener(self.config.port, true).await?;
        tokio::spawn(network::run_accept_loop(
            listener,
            self.registry.clone(),
            self.sink.clone(),
            true,
        ));
        tokio::spawn(network::run_discovery(
            settings,
            self.config.port,
            self.registry.clone(),
            self.sink.clone(),
            true,
        ));
        Ok(())
    }

    /// Replicate a batch of tally records to every live peer. Returns the
    /// number of peers the batch was handed to.
    pub async fn replicate(&self, records: &[CandidateTally]) -> usize {
        let line = Command::Replicate {
            records: records.to_vec(),
        }
        .encode();
        self.registry.broadcast(&line).await
    }
}
