//! Full-chain UTXO inference (§4.4, §9: "the source scans the whole main
//! chain to infer whether an output is spent"). These are plain scanning
//! helpers over a chain slice rather than a persistent index, matching the
//! behavioral contract the ledger is tested against; `Ledger` may still
//! memoize results internally as long as these semantics are preserved.

use crate::block::Block;
use crate::transaction::Transaction;

/// Locates the transaction with id `txid` by scanning `chain` from the tip
/// backward, mirroring the original's tip-to-genesis search order.
#[must_use]
pub fn find_transaction<'a>(chain: &'a [Block], txid: &str) -> Option<&'a Transaction> {
    for block in chain.iter().rev() {
        for tx in &block.transactions {
            if tx.id().ok().as_deref() == Some(txid) {
                return Some(tx);
            }
        }
    }
    None
}

/// Whether `(txid, vout)` is referenced as an input by any transaction in
/// `chain` — i.e. whether that output has already been spent.
#[must_use]
pub fn is_spent(chain: &[Block], txid: &str, vout: u32) -> bool {
    chain.iter().any(|block| {
        block.transactions.iter().any(|tx| {
            tx.inputs
                .iter()
                .any(|input| input.transaction_id == txid && input.vout == vout)
        })
    })
}

/// Balance of `address`: Σ amounts of outputs to `address` in `chain`, minus
/// Σ amounts of outputs to `address` that are spent as inputs in `chain`.
#[must_use]
pub fn balance_for_address(chain: &[Block], address: &str) -> u64 {
    let mut received = 0u64;
    let mut spent = 0u64;

    for block in chain {
        for tx in &block.transactions {
            for (vout, output) in tx.outputs.iter().enumerate() {
                if output.address == address {
                    received = received.saturating_add(output.amount);
                    if let Ok(txid) = tx.id() {
                        if is_spent(chain, &txid, vout as u32) {
                            spent = spent.saturating_add(output.amount);
                        }
                    }
                }
            }
        }
    }

    received.saturating_sub(spent)
}
