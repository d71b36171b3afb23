// src/network/discovery.rs
// Polling discovery: sweep the configured port range forever, dialing any
// port without a live connection. Lost peers become dialable again once the
// registry clears their live flag.

use crate::config::DiscoverySettings;
use crate::events::model::LogLevel;
use crate::network::events::emit_network_event;
use crate::network::registry::PeerRegistry;
use crate::network::transport::dial_peer;
use crate::replication::store::ReplicationSink;
use std::sync::Arc;

pub async fn run_discovery(
    settings: DiscoverySettings,
    own_port: u16,
    registry: PeerRegistry,
    sink: Arc<dyn ReplicationSink>,
    allow_console: bool,
) {
    emit_network_event(
        "discovery",
        LogLevel::Info,
        "sweep_start",
        None,
        Some(format!(
            "range=[{},{}] delay={:?}",
            settings.range_start, settings.range_end, settings.dial_delay
        )),
        allow_console,
    );
    loop {
        for port in settings.range_start..=settings.range_end {
            if !registry.is_live(port).await {
                match dial_peer(
                    port,
                    own_port,
                    settings.dial_timeout,
                    registry.clone(),
                    sink.clone(),
                    allow_console,
                )
                .await
                {
                    Ok(()) => {
                        emit_network_event(
                            "discovery",
                            LogLevel::Info,
                            "dial_success",
                            Some(format!("127.0.0.1:{}", port)),
                            None,
                            allow_console,
                        );
                    }
                    Err(e) => {
                        // Transient by definition; the next sweep retries.
                        emit_network_event(
                            "discovery",
                            LogLevel::Debug,
                            "dial_failed",
                            Some(format!("127.0.0.1:{}", port)),
                            Some(e.to_string()),
                            allow_console,
                        );
                    }
                }
            }
            tokio::time::sleep(settings.dial_delay).await;
        }
        // Sweep restarts immediately; pacing comes from the per-port delay.
    }
}
