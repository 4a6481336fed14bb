//! Common type aliases and configuration shared across the workspace.

use serde::{Deserialize, Serialize};

pub type TxId = crate::Hash256;
pub type BlockId = crate::Hash256;
pub type Amount = u64;
/// Nanoseconds since the Unix epoch.
pub type Timestamp = u64;
pub type BlockHeight = u64;
pub type OutputIndex = u32;

/// Consensus parameters governing difficulty, rewards, and fork resolution.
/// Defaults match the scenarios in the testable-properties suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerParams {
    pub base_difficulty: u32,
    pub base_block_reward: u64,
    pub confirmations: u64,
    pub transactions_per_block: usize,
}

impl Default for LedgerParams {
    fn default() -> Self {
        Self {
            base_difficulty: 2,
            base_block_reward: 50,
            confirmations: 2,
            transactions_per_block: 2,
        }
    }
}

impl LedgerParams {
    #[must_use]
    pub fn difficulty(&self, height: BlockHeight) -> u32 {
        self.base_difficulty + (height / 2) as u32
    }

    #[must_use]
    pub fn block_reward(&self, height: BlockHeight) -> u64 {
        self.base_block_reward / (height / 5 + 1)
    }
}

/// Assembled node configuration: CLI flags layered over environment
/// variables, following the precedence the teacher's CLI establishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub bind_address: String,
    pub rpc_port: u16,
    pub data_dir: String,
    pub blockchain_file: Option<String>,
    pub peers: Vec<String>,
    pub synchronize_on_start: bool,
    pub poll_interval_secs: u64,
    pub params: LedgerParams,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            rpc_port: 5000,
            data_dir: "./data".to_string(),
            blockchain_file: None,
            peers: Vec::new(),
            synchronize_on_start: false,
            poll_interval_secs: 10,
            params: LedgerParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ledger_params_match_test_suite_defaults() {
        let params = LedgerParams::default();
        assert_eq!(params.difficulty(0), 2);
        assert_eq!(params.difficulty(5), 4);
        assert_eq!(params.block_reward(0), 50);
        assert_eq!(params.block_reward(5), 25);
        assert_eq!(params.block_reward(9), 25);
        assert_eq!(params.block_reward(10), 16);
    }

    #[test]
    fn node_config_defaults() {
        let config = NodeConfig::default();
        assert_eq!(config.rpc_port, 5000);
        assert!(config.peers.is_empty());
        assert!(!config.synchronize_on_start);
    }
}
