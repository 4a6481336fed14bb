use bond_core::{Ledger, Miner};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tinychain_node::node::Node;
use tinychain_node::{config, http};
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let (config, miner_address) = config::load();

    let blockchain_file = config.blockchain_file.as_ref().map(PathBuf::from);
    let ledger = match &blockchain_file {
        Some(path) if path.exists() => match Ledger::load(path, config.params) {
            Ok(loaded) => {
                info!(path = %path.display(), "loaded persisted ledger");
                loaded
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to load persisted ledger; starting empty");
                Ledger::new(config.params)
            }
        },
        _ => Ledger::new(config.params),
    };
    let ledger = Arc::new(Mutex::new(ledger));

    let node = Arc::new(Node::new(config.peers.clone()));

    if config.synchronize_on_start {
        info!(peers = ?node.peers(), "synchronizing with peers at startup");
        node.synchronize(&ledger).await;
    }

    let _miner = miner_address.clone().map(|addr| {
        info!(address = %addr, "starting background miner");
        Miner::spawn(Arc::clone(&ledger), addr, Duration::from_secs(config.poll_interval_secs))
    });

    let state = http::AppState {
        ledger,
        node,
        miner_address: Arc::new(Mutex::new(miner_address)),
        blockchain_file,
        params: config.params,
    };

    let app = http::router(state);
    let addr = format!("{}:{}", config.bind_address, config.rpc_port);
    info!(%addr, "starting HTTP surface");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {addr}: {e}"));
    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| panic!("server error: {e}"));
}
