use crate::codec::canonical_json;
use crate::error::LedgerError;
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use shared::Hash256;

/// The subset of a transaction's fields entering a block's identity hash:
/// each transaction contributes only its hashable image, not its signature.
#[derive(Serialize)]
struct TxImageRef<'a> {
    inputs: &'a [crate::transaction::TxInput],
    outputs: &'a [crate::transaction::TxOutput],
    timestamp: u64,
}

#[derive(Serialize)]
struct BlockHashableImage<'a> {
    timestamp: u64,
    prev: &'a str,
    nonce: u64,
    transactions: Vec<TxImageRef<'a>>,
}

/// A block: a previous-block reference, a nonce, a timestamp, and an
/// ordered list of transactions (the last of which is the coinbase).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub prev: String,
    pub nonce: u64,
    pub timestamp: u64,
    pub transactions: Vec<Transaction>,
}

impl Block {
    #[must_use]
    pub fn new(prev: String, timestamp: u64, transactions: Vec<Transaction>) -> Self {
        Self {
            prev,
            nonce: 0,
            timestamp,
            transactions,
        }
    }

    #[must_use]
    pub fn is_genesis(&self) -> bool {
        self.prev == Hash256::genesis_prev().to_hex()
    }

    fn hashable_image(&self) -> BlockHashableImage<'_> {
        BlockHashableImage {
            timestamp: self.timestamp,
            prev: &self.prev,
            nonce: self.nonce,
            transactions: self
                .transactions
                .iter()
                .map(|tx| TxImageRef {
                    inputs: &tx.inputs,
                    outputs: &tx.outputs,
                    timestamp: tx.timestamp,
                })
                .collect(),
        }
    }

    /// The canonical bytes hashed to produce this block's id.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn hashable_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        Ok(canonical_json(&self.hashable_image())?)
    }

    /// `SHA-256(canonical_json(hashable_image))`.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn hash(&self) -> Result<Hash256, LedgerError> {
        let bytes = self.hashable_bytes()?;
        Ok(Hash256::digest(&bytes))
    }

    #[must_use]
    pub fn coinbase(&self) -> Option<&Transaction> {
        self.transactions.last()
    }

    #[must_use]
    pub fn non_coinbase_transactions(&self) -> &[Transaction] {
        if self.transactions.is_empty() {
            &[]
        } else {
            &self.transactions[..self.transactions.len() - 1]
        }
    }
}
