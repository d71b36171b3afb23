use std::sync::Arc;
use std::time::Duration;
use tallymesh::config::{Config, DiscoveryConfig};
use tallymesh::replication::MemorySink;
use tallymesh::TallyNode;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

fn solo_config(port: u16) -> Config {
    // Range covers only the node itself so the sweep never dials out.
    Config {
        port,
        discovery: Some(DiscoveryConfig {
            range_start: Some(port),
            range_end: Some(port),
            dial_delay_ms: Some(20),
            dial_timeout_ms: Some(200),
        }),
        store: None,
        logging: None,
        app_name: None,
    }
}

async fn start_node(port: u16, sink: Arc<MemorySink>) -> TallyNode {
    let node = TallyNode::new(solo_config(port), sink);
    node.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    node
}

#[tokio::test]
async fn malformed_commands_do_not_kill_the_handler() {
    let sink = Arc::new(MemorySink::new());
    let node = start_node(46140, sink.clone()).await;

    let mut stream = TcpStream::connect("127.0.0.1:46140").await.unwrap();
    stream
        .write_all(b"recieve data {definitely not json\n")
        .await
        .unwrap();
    stream.write_all(b"connect not-a-port\n").await.unwrap();
    stream.write_all(b"some other junk\n").await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(sink.call_count().await, 0);

    // The same connection must still dispatch valid commands.
    stream.write_all(b"connect 46199\n").await.unwrap();
    stream
        .write_all(b"recieve data [{\"name\":\"X\",\"key\":\"k1\",\"election\":\"e1\",\"votes\":3}]\n")
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(sink.call_count().await, 1);
    assert!(node.registry().is_live(46199).await);
    let batches = sink.batches().await;
    assert_eq!(batches[0][0].name, "X");
    assert_eq!(batches[0][0].votes, 3);
}

#[tokio::test]
async fn empty_replicate_payload_is_a_noop() {
    let sink = Arc::new(MemorySink::new());
    let _node = start_node(46141, sink.clone()).await;

    let mut stream = TcpStream::connect("127.0.0.1:46141").await.unwrap();
    stream.write_all(b"recieve data []\n").await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(sink.call_count().await, 0);

    // Connection is still healthy afterwards.
    stream
        .write_all(b"recieve data [{\"name\":\"Y\",\"key\":\"k2\",\"election\":\"e1\",\"votes\":1}]\n")
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(sink.call_count().await, 1);
}

#[tokio::test]
async fn store_write_failure_keeps_the_connection_open() {
    let sink = Arc::new(MemorySink::failing());
    let node = start_node(46142, sink.clone()).await;

    let mut stream = TcpStream::connect("127.0.0.1:46142").await.unwrap();
    stream
        .write_all(b"recieve data [{\"name\":\"X\",\"key\":\"k1\",\"election\":\"e1\",\"votes\":3}]\n")
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    // The write failed, but the handler must keep reading.
    stream.write_all(b"connect 46198\n").await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(node.registry().is_live(46198).await);
}

#[tokio::test]
async fn disconnect_marks_the_announced_port_lost() {
    let sink = Arc::new(MemorySink::new());
    let node = start_node(46143, sink).await;

    let mut stream = TcpStream::connect("127.0.0.1:46143").await.unwrap();
    stream.write_all(b"connect 46197\n").await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(node.registry().is_live(46197).await);

    drop(stream);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!node.registry().is_live(46197).await);
    assert!(node.registry().is_known(46197).await);
}
