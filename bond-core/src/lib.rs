pub mod block;
pub mod blockchain;
pub mod codec;
pub mod error;
pub mod mempool;
pub mod mining;
pub mod transaction;
pub mod utxo;

pub use block::Block;
pub use blockchain::{verify_transaction_against, Ledger, LedgerStats};
pub use codec::canonical_json;
pub use error::{LedgerError, LedgerResult};
pub use mempool::Mempool;
pub use mining::Miner;
pub use transaction::{Transaction, TxInput, TxOutput};
pub use utxo::{balance_for_address, find_transaction, is_spent};

pub use shared::{BlockchainError, Hash256, LedgerParams, Result};
