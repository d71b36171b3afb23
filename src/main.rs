use anyhow::Context;
use clap::Parser;
use std::fs;
use std::sync::Arc;
use tallymesh::{
    config::Config,
    constants::*, // Import all constants
    replication::JsonlStore,
    TallyNode,
};
use tokio::signal;

#[derive(Parser, Debug)]
#[command(author, version, about = "tallymesh vote-tally replication node")]
struct Args {
    /// Optional path to config file (TOML)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| "config.toml".to_string());
    let mut config = match fs::read_to_string(&config_path) {
        Ok(content) => {
            let cfg = toml::from_str::<Config>(&content)
                .with_context(|| format!("failed to parse config file '{}'", config_path))?;
            println!("{}Loaded config from: {}", ICON_PLACEHOLDER, config_path);
            cfg
        }
        Err(_) => {
            println!(
                "⚠️ No config file found at '{}', falling back to default config.",
                config_path
            );
            Config::default()
        }
    };

    // Env wins over TOML for the listen port (deployments set PORT per node).
    config.apply_env_overrides();

    // Initialize events AFTER config is loaded so custom logging path can be applied
    if let Some(log_cfg) = config.logging.as_ref() {
        tallymesh::events::init_events_from_config(Some(log_cfg)).await;
    } else {
        tallymesh::events::init_default_events().await;
    }

    // Store connectivity is a startup dependency: fatal when unavailable.
    let store_uri = config.store_uri();
    let store = JsonlStore::open(&store_uri)
        .await
        .with_context(|| format!("failed to open tally store '{}'", store_uri))?;
    println!("{}Tally store ready: {}", ICON_PLACEHOLDER, store_uri);

    let node = TallyNode::new(config.clone(), Arc::new(store));
    node.start().await.context("startup failed")?;
    {
        use tallymesh::events::{
            dispatcher,
            model::{LogEvent, LogLevel, SystemEvent},
        };
        let mut meta = dispatcher::meta("node", LogLevel::Info);
        meta.corr_id = Some(dispatcher::correlation_id());
        dispatcher::emit(LogEvent::System(SystemEvent {
            meta,
            action: "node_started".into(),
            detail: Some(format!("port={}", config.port)),
        }));
    }

    let app_name = config.app_name.as_deref().unwrap_or(DEFAULT_APP_NAME);
    println!(
        "🟢 {} v{} is running on port {}. Press Ctrl+C to shut down...",
        app_name, APP_VERSION, config.port
    );

    // Wait for Ctrl+C
    signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    println!("🛑 {} shutting down gracefully.", app_name);
    Ok(())
}
