// src/network/transport.rs

use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use crate::events::model::LogLevel;
use crate::network::codec::{CodecError, Command};
use crate::network::events::{emit_network_event, emit_replication_event};
use crate::network::registry::PeerRegistry;
use crate::replication::store::ReplicationSink;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

/// Spawn the writer half of a connection: drains the mpsc channel and
/// appends the newline frame delimiter to each outgoing wire line.
pub(crate) fn spawn_writer_task<W>(
    mut writer: W,
    mut rx: mpsc::Receiver<String>,
    remote: String,
    allow_console: bool,
) where
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = writer.write_all(msg.as_bytes()).await {
                emit_network_event(
                    "transport",
                    LogLevel::Error,
                    "stream_write_failed",
                    Some(remote.clone()),
                    Some(e.to_string()),
                    allow_console,
                );
                break;
            }
            if let Err(e) = writer.write_all(b"\n").await {
                emit_network_event(
                    "transport",
                    LogLevel::Error,
                    "stream_newline_failed",
                    Some(remote.clone()),
                    Some(e.to_string()),
                    allow_console,
                );
                break;
            }
        }
    });
}

/// Dial a sibling node on the local loopback, announce our own port, and
/// hand the connection to the shared receive loop.
///
/// The dial itself is bounded by `dial_timeout`; everything after a
/// successful connect runs on spawned tasks so the discovery sweep is never
/// blocked by a slow peer.
pub async fn dial_peer(
    port: u16,
    own_port: u16,
    dial_timeout: Duration,
    registry: PeerRegistry,
    sink: Arc<dyn ReplicationSink>,
    allow_console: bool,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = format!("127.0.0.1:{}", port);
    emit_network_event(
        "transport",
        LogLevel::Debug,
        "dial_start",
        Some(addr.clone()),
        Some(format!("local_port={}", own_port)),
        allow_console,
    );

    let stream = tokio::time::timeout(dial_timeout, TcpStream::connect(&addr))
        .await
        .map_err(|_| format!("dial timed out after {:?}", dial_timeout))??;
    emit_network_event(
        "transport",
        LogLevel::Info,
        "tcp_connected",
        Some(addr.clone()),
        None,
        allow_console,
    );

    let (read_half, mut write_half) = stream.into_split();

    // Handshake first, directly on the write half, then hand the half to
    // the writer task. Both sides register each other: we register the
    // dialed port here, the peer registers us when it reads the handshake.
    let hello = Command::Connect { port: own_port }.encode();
    write_half.write_all(hello.as_bytes()).await?;
    write_half.write_all(b"\n").await?;

    let (tx, rx) = mpsc::channel::<String>(32);
    spawn_writer_task(write_half, rx, addr.clone(), allow_console);
    registry.register(port, tx.clone()).await;
    emit_network_event(
        "transport",
        LogLevel::Info,
        "handshake_sent",
        Some(addr.clone()),
        Some(format!("announced_port={}", own_port)),
        allow_console,
    );

    let reader = BufReader::new(read_half);
    tokio::spawn(receive_and_dispatch(
        reader,
        addr,
        Some(port),
        tx,
        registry,
        sink,
        allow_console,
    ));
    Ok(())
}

/// Shared receive-and-dispatch loop for peer connections.
///
/// One sequential loop per connection: commands on a single stream are
/// processed strictly in arrival order, with no ordering across peers.
/// `announced_port` is known up front for outbound connections and learned
/// from the handshake on inbound ones; it is what gets marked lost when the
/// stream ends.
pub async fn receive_and_dispatch<R: AsyncBufReadExt + Unpin>(
    mut reader: R,
    remote: String,
    mut announced_port: Option<u16>,
    outgoing: mpsc::Sender<String>,
    registry: PeerRegistry,
    sink: Arc<dyn ReplicationSink>,
    allow_console: bool,
) {
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                emit_network_event(
                    "transport",
                    LogLevel::Info,
                    "peer_disconnected",
                    Some(remote.clone()),
                    announced_port.map(|p| format!("port={}", p)),
                    allow_console,
                );
                break;
            }
            Ok(_) => match Command::decode(&line) {
                Ok(Command::Connect { port }) => {
                    registry.register(port, outgoing.clone()).await;
                    announced_port = Some(port);
                    emit_network_event(
                        "transport",
                        LogLevel::Info,
                        "handshake_received",
                        Some(remote.clone()),
                        Some(format!("announced_port={}", port)),
                        allow_console,
                    );
                }
                Ok(Command::Replicate { records }) => {
                    let count = records.len();
                    match sink.insert_many(&records).await {
                        Ok(()) => {
                            emit_replication_event(
                                LogLevel::Info,
                                "records_stored",
                                count,
                                Some(format!("from={}", remote)),
                                allow_console,
                            );
                        }
                        Err(e) => {
                            // Surfaced, not retried; the connection stays open.
                            emit_replication_event(
                                LogLevel::Error,
                                "store_write_failed",
                                count,
                                Some(e.to_string()),
                                allow_console,
                            );
                        }
                    }
                }
                Err(CodecError::UnknownPrefix) => {
                    emit_network_event(
                        "transport",
                        LogLevel::Debug,
                        "command_ignored",
                        Some(remote.clone()),
                        Some(line.trim().to_string()),
                        allow_console,
                    );
                }
                Err(e) => {
                    // Malformed command: dropped, connection stays open,
                    // nothing is surfaced to the peer.
                    emit_network_event(
                        "transport",
                        LogLevel::Debug,
                        "command_invalid",
                        Some(remote.clone()),
                        Some(e.to_string()),
                        allow_console,
                    );
                }
            },
            Err(e) => {
                emit_network_event(
                    "transport",
                    LogLevel::Error,
                    "peer_read_error",
                    Some(remote.clone()),
                    Some(e.to_string()),
                    allow_console,
                );
                break;
            }
        }
    }
    // Liveness only; the port stays known so the registry remembers the
    // handshake ever happened.
    if let Some(port) = announced_port {
        registry.mark_lost(port).await;
    }
}
