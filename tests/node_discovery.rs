use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tallymesh::config::{Config, DiscoveryConfig};
use tallymesh::replication::{CandidateTally, MemorySink};
use tallymesh::TallyNode;

fn node_config(port: u16, range_start: u16, range_end: u16) -> Config {
    Config {
        port,
        discovery: Some(DiscoveryConfig {
            range_start: Some(range_start),
            range_end: Some(range_end),
            dial_delay_ms: Some(20),
            dial_timeout_ms: Some(200),
        }),
        store: None,
        logging: None,
        app_name: None,
    }
}

async fn settle() {
    // A couple of full sweeps at the configured 20 ms per-port delay.
    tokio::time::sleep(Duration::from_millis(600)).await;
}

#[tokio::test]
async fn two_nodes_discover_each_other() {
    let sink_a = Arc::new(MemorySink::new());
    let sink_b = Arc::new(MemorySink::new());
    let a = TallyNode::new(node_config(46100, 46100, 46101), sink_a);
    let b = TallyNode::new(node_config(46101, 46100, 46101), sink_b);

    a.start().await.unwrap();
    b.start().await.unwrap();
    settle().await;

    // Each registry holds {self, other}; exactly one live peer per side.
    assert_eq!(a.registry().known_ports().await, vec![46100, 46101]);
    assert_eq!(b.registry().known_ports().await, vec![46100, 46101]);
    assert_eq!(a.registry().live_peers().await, vec![46101]);
    assert_eq!(b.registry().live_peers().await, vec![46100]);
}

#[tokio::test]
async fn registry_stays_deduped_across_sweeps() {
    let sink_a = Arc::new(MemorySink::new());
    let sink_b = Arc::new(MemorySink::new());
    let a = TallyNode::new(node_config(46110, 46110, 46111), sink_a);
    let b = TallyNode::new(node_config(46111, 46110, 46111), sink_b);

    a.start().await.unwrap();
    b.start().await.unwrap();
    settle().await;
    // Extra sweeps must not add duplicate entries or re-dial live peers.
    settle().await;

    assert_eq!(a.registry().known_ports().await.len(), 2);
    assert_eq!(a.registry().live_peers().await.len(), 1);
    assert_eq!(b.registry().known_ports().await.len(), 2);
    assert_eq!(b.registry().live_peers().await.len(), 1);
}

#[tokio::test]
async fn replicate_delivers_records_to_peer_sink() {
    let sink_a = Arc::new(MemorySink::new());
    let sink_b = Arc::new(MemorySink::new());
    let a = TallyNode::new(node_config(46120, 46120, 46121), sink_a.clone());
    let b = TallyNode::new(node_config(46121, 46120, 46121), sink_b.clone());

    a.start().await.unwrap();
    b.start().await.unwrap();
    settle().await;

    let records = vec![CandidateTally {
        name: "X".to_string(),
        key: "k1".to_string(),
        election: "e1".to_string(),
        votes: 3,
    }];
    let delivered = a.replicate(&records).await;
    assert_eq!(delivered, 1);

    tokio::time::sleep(Duration::from_millis(300)).await;
    let batches = sink_b.batches().await;
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0], records);
    // The sender's own sink is untouched.
    assert_eq!(sink_a.call_count().await, 0);
}

#[tokio::test]
async fn live_port_is_not_redialed_on_later_sweeps() {
    // A bare listener stands in for the sibling so every inbound dial is
    // countable. Accepted streams are held open to keep the port live.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:46135")
        .await
        .unwrap();
    let accepts = Arc::new(AtomicUsize::new(0));
    let counter = accepts.clone();
    tokio::spawn(async move {
        let mut held = Vec::new();
        loop {
            let (stream, _) = listener.accept().await.unwrap();
            counter.fetch_add(1, Ordering::SeqCst);
            held.push(stream);
        }
    });

    let node = TallyNode::new(node_config(46134, 46134, 46135), Arc::new(MemorySink::new()));
    node.start().await.unwrap();

    // Many sweep intervals at 20 ms per port. The port goes live on the
    // first successful dial and must never be dialed again while the
    // connection holds.
    settle().await;
    settle().await;

    assert!(node.registry().is_live(46135).await);
    assert_eq!(accepts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn lost_peer_is_rediscovered_on_a_later_sweep() {
    let sink_a = Arc::new(MemorySink::new());
    let a = TallyNode::new(node_config(46130, 46130, 46131), sink_a);
    a.start().await.unwrap();

    let sink_b = Arc::new(MemorySink::new());
    let b = TallyNode::new(node_config(46131, 46130, 46131), sink_b);
    b.start().await.unwrap();
    settle().await;
    assert_eq!(a.registry().live_peers().await, vec![46131]);

    // Simulate connection loss: liveness cleared, handshake history kept.
    a.registry().mark_lost(46131).await;
    assert!(a.registry().is_known(46131).await);

    // The port is still listening, so a later sweep dials it again and
    // liveness returns.
    settle().await;
    assert_eq!(a.registry().live_peers().await, vec![46131]);
}
