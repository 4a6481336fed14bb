//! Node configuration assembly: CLI flags layered over `TOYCHAIN_*`
//! environment variables (§6). CLI flags win when both are present.

use clap::Parser;
use shared::{LedgerParams, NodeConfig};

/// tinychain node.
#[derive(Parser, Debug)]
#[command(name = "tinychain-node")]
#[command(about = "A from-scratch UTXO ledger node")]
struct Cli {
    /// Address to bind the HTTP surface to.
    #[arg(long)]
    bind_address: Option<String>,

    /// Port the HTTP surface listens on.
    #[arg(long)]
    port: Option<u16>,

    /// Directory used for default persistence paths.
    #[arg(long)]
    data_dir: Option<String>,

    /// Path to the single-file persisted ledger document.
    #[arg(long)]
    blockchain_file: Option<String>,

    /// Peer host:port list (space- or flag-separated).
    #[arg(long)]
    peer: Vec<String>,

    /// Pull blocks from peers once at startup.
    #[arg(long)]
    synchronize: bool,

    /// Address that receives coinbase rewards if mining is enabled at startup.
    #[arg(long)]
    miner_address: Option<String>,
}

fn env_peers() -> Vec<String> {
    std::env::var("TOYCHAIN_PEERS")
        .ok()
        .map(|s| s.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

fn env_synchronize() -> bool {
    std::env::var("TOYCHAIN_SYNCHRONIZE")
        .ok()
        .map(|s| s.trim() == "1")
        .unwrap_or(false)
}

/// Assembles a [`NodeConfig`] from CLI flags, falling back to the
/// `TOYCHAIN_*` environment variables, falling back to `NodeConfig::default()`.
#[must_use]
pub fn load() -> (NodeConfig, Option<String>) {
    let cli = Cli::parse();
    let defaults = NodeConfig::default();

    let mut peers = env_peers();
    peers.extend(cli.peer);

    let config = NodeConfig {
        bind_address: cli.bind_address.unwrap_or(defaults.bind_address),
        rpc_port: cli.port.unwrap_or(defaults.rpc_port),
        data_dir: cli.data_dir.unwrap_or(defaults.data_dir),
        blockchain_file: cli
            .blockchain_file
            .or_else(|| std::env::var("TOYCHAIN_BLOCKCHAIN_FILE").ok())
            .or(defaults.blockchain_file),
        peers,
        synchronize_on_start: cli.synchronize || env_synchronize(),
        poll_interval_secs: defaults.poll_interval_secs,
        params: LedgerParams::default(),
    };

    (config, cli.miner_address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_peers_splits_on_whitespace() {
        std::env::set_var("TOYCHAIN_PEERS", "a:1 b:2  c:3");
        assert_eq!(env_peers(), vec!["a:1", "b:2", "c:3"]);
        std::env::remove_var("TOYCHAIN_PEERS");
    }

    #[test]
    fn env_synchronize_reads_flag() {
        std::env::remove_var("TOYCHAIN_SYNCHRONIZE");
        assert!(!env_synchronize());
        std::env::set_var("TOYCHAIN_SYNCHRONIZE", "1");
        assert!(env_synchronize());
        std::env::remove_var("TOYCHAIN_SYNCHRONIZE");
    }
}
