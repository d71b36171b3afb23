use std::fs;
use std::sync::Arc;
use tallymesh::config::{Config, DiscoveryConfig};
use tallymesh::replication::{JsonlStore, MemorySink};
use tallymesh::{StartupError, TallyNode};

#[tokio::test]
async fn bind_conflict_is_a_typed_startup_error() {
    let config = Config {
        port: 46150,
        discovery: Some(DiscoveryConfig {
            range_start: Some(46150),
            range_end: Some(46150),
            dial_delay_ms: Some(20),
            dial_timeout_ms: Some(200),
        }),
        store: None,
        logging: None,
        app_name: None,
    };
    let first = TallyNode::new(config.clone(), Arc::new(MemorySink::new()));
    first.start().await.unwrap();

    let second = TallyNode::new(config, Arc::new(MemorySink::new()));
    match second.start().await {
        Err(StartupError::Bind(_)) => {}
        other => panic!("expected bind error, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn empty_discovery_range_is_rejected() {
    let config = Config {
        port: 46151,
        discovery: Some(DiscoveryConfig {
            range_start: Some(7001),
            range_end: Some(7000),
            dial_delay_ms: None,
            dial_timeout_ms: None,
        }),
        store: None,
        logging: None,
        app_name: None,
    };
    let node = TallyNode::new(config, Arc::new(MemorySink::new()));
    match node.start().await {
        Err(StartupError::Config(msg)) => assert!(msg.contains("range")),
        other => panic!("expected config error, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn store_open_failure_is_surfaced() {
    // A directory at the store path makes the open fail.
    let base = "data/test-store-openfail";
    let path = format!("{}/tallies.jsonl", base);
    let _ = fs::remove_dir_all(base);
    fs::create_dir_all(&path).unwrap();

    assert!(JsonlStore::open(&path).await.is_err());

    let _ = fs::remove_dir_all(base);
}

#[tokio::test]
async fn env_port_override_wins_over_toml() {
    let toml = "port = 7000\n";
    let mut config: Config = toml::from_str(toml).unwrap();
    std::env::set_var("PORT", "7111");
    config.apply_env_overrides();
    std::env::remove_var("PORT");
    assert_eq!(config.port, 7111);
}
