// src/network/listener.rs

use crate::events::model::LogLevel;
use crate::network::events::emit_network_event;
use crate::network::registry::PeerRegistry;
use crate::network::transport::{receive_and_dispatch, spawn_writer_task};
use crate::replication::store::ReplicationSink;
use crate::StartupError;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// Bind the node's own port. Separated from the accept loop so the caller
/// can observe the bind result synchronously and decide what a failure
/// means (the binary treats it as fatal).
pub async fn bind_listener(port: u16, allow_console: bool) -> Result<TcpListener, StartupError> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(StartupError::Bind)?;
    emit_network_event(
        "listener",
        LogLevel::Info,
        "listener_bind",
        Some(addr),
        None,
        allow_console,
    );
    Ok(listener)
}

/// Accept inbound connections forever, one handler task per stream.
pub async fn run_accept_loop(
    listener: TcpListener,
    registry: PeerRegistry,
    sink: Arc<dyn ReplicationSink>,
    allow_console: bool,
) {
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                emit_network_event(
                    "listener",
                    LogLevel::Info,
                    "incoming_connection",
                    Some(peer_addr.to_string()),
                    None,
                    allow_console,
                );
                tokio::spawn(handle_connection(
                    stream,
                    peer_addr.to_string(),
                    registry.clone(),
                    sink.clone(),
                    allow_console,
                ));
            }
            Err(e) => {
                emit_network_event(
                    "listener",
                    LogLevel::Error,
                    "accept_failed",
                    None,
                    Some(e.to_string()),
                    allow_console,
                );
            }
        }
    }
}

/// Own one inbound stream: set up the writer task, then run the shared
/// receive loop. The peer's port is unknown until its handshake arrives.
async fn handle_connection(
    stream: TcpStream,
    peer_addr: String,
    registry: PeerRegistry,
    sink: Arc<dyn ReplicationSink>,
    allow_console: bool,
) {
    let (read_half, write_half) = stream.into_split();
    let reader = BufReader::new(read_half);
    let (tx, rx) = mpsc::channel::<String>(32);
    spawn_writer_task(write_half, rx, peer_addr.clone(), allow_console);
    receive_and_dispatch(reader, peer_addr, None, tx, registry, sink, allow_console).await;
}
