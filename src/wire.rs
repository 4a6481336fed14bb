//! Wire DTOs for the HTTP surface (§6). `hash` is always derived — it is not
//! a stored field on `Block`/`Transaction` — so these types exist
//! specifically to add it on the way out and ignore it on the way in.

use bond_core::{Block, Transaction, TxInput, TxOutput};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionWire {
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub timestamp: u64,
    pub signature: Option<String>,
    pub public_key: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
}

impl TransactionWire {
    /// Recomputes `hash` from the transaction's hashable image; never trusts
    /// a caller-supplied value.
    pub fn from_domain(tx: &Transaction) -> Result<Self, bond_core::LedgerError> {
        Ok(Self {
            inputs: tx.inputs.clone(),
            outputs: tx.outputs.clone(),
            timestamp: tx.timestamp,
            signature: tx.signature.clone(),
            public_key: tx.public_key.clone(),
            hash: Some(tx.id()?),
        })
    }
}

impl From<TransactionWire> for Transaction {
    fn from(wire: TransactionWire) -> Self {
        Transaction {
            inputs: wire.inputs,
            outputs: wire.outputs,
            timestamp: wire.timestamp,
            signature: wire.signature,
            public_key: wire.public_key,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BlockWire {
    pub timestamp: u64,
    pub prev: String,
    pub nonce: u64,
    pub transactions: Vec<TransactionWire>,
    #[serde(default)]
    pub hash: Option<String>,
}

impl BlockWire {
    /// Recomputes `hash` from the block's hashable image.
    pub fn from_domain(block: &Block) -> Result<Self, bond_core::LedgerError> {
        let mut transactions = Vec::with_capacity(block.transactions.len());
        for tx in &block.transactions {
            transactions.push(TransactionWire::from_domain(tx)?);
        }
        Ok(Self {
            timestamp: block.timestamp,
            prev: block.prev.clone(),
            nonce: block.nonce,
            transactions,
            hash: Some(block.hash()?.to_hex()),
        })
    }
}

impl From<BlockWire> for Block {
    fn from(wire: BlockWire) -> Self {
        let mut block = Block::new(
            wire.prev,
            wire.timestamp,
            wire.transactions.into_iter().map(Transaction::from).collect(),
        );
        block.nonce = wire.nonce;
        block
    }
}
