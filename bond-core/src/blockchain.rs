use crate::block::Block;
use crate::error::LedgerError;
use crate::mempool::Mempool;
use crate::transaction::Transaction;
use crate::utxo;
use serde::{Deserialize, Serialize};
use shared::{Hash256, LedgerParams};

/// Document persisted to `TOYCHAIN_BLOCKCHAIN_FILE`. The mempool is
/// deliberately absent — it is not persisted (§6).
#[derive(Debug, Serialize, Deserialize)]
struct PersistedLedger {
    blocks: Vec<Block>,
    fork: Vec<Block>,
    orphans: Vec<Block>,
}

/// Main chain, the single tracked alternate branch, the orphan set, and the
/// mempool. All mutating operations are expected to run under one exclusive
/// lock held by the caller (§5) — this type itself is not internally
/// synchronized.
#[derive(Debug, Clone)]
pub struct Ledger {
    blocks: Vec<Block>,
    fork: Vec<Block>,
    orphans: Vec<Block>,
    mempool: Mempool,
    params: LedgerParams,
}

/// Where a just-received block fits relative to the ledger's current state.
enum AcceptancePath {
    GenesisSlot,
    ExtendsMainTip,
    NewFork { ancestor_index: usize },
    TooOldAncestor,
    ExtendsForkTip,
    Orphan,
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerStats {
    pub height: Option<u64>,
    pub tip: Option<String>,
    pub fork_len: usize,
    pub orphan_count: usize,
    pub mempool_len: usize,
}

impl Ledger {
    #[must_use]
    pub fn new(params: LedgerParams) -> Self {
        Self {
            blocks: Vec::new(),
            fork: Vec::new(),
            orphans: Vec::new(),
            mempool: Mempool::new(),
            params,
        }
    }

    #[must_use]
    pub const fn params(&self) -> &LedgerParams {
        &self.params
    }

    #[must_use]
    pub fn main_chain(&self) -> &[Block] {
        &self.blocks
    }

    #[must_use]
    pub fn fork(&self) -> &[Block] {
        &self.fork
    }

    #[must_use]
    pub fn orphans(&self) -> &[Block] {
        &self.orphans
    }

    #[must_use]
    pub fn mempool(&self) -> &Mempool {
        &self.mempool
    }

    /// `None` if the chain is empty; otherwise the tip's index.
    #[must_use]
    pub fn height(&self) -> Option<u64> {
        if self.blocks.is_empty() {
            None
        } else {
            Some(self.blocks.len() as u64 - 1)
        }
    }

    #[must_use]
    pub fn tip(&self) -> Option<&Block> {
        self.blocks.last()
    }

    fn tip_hash_hex(&self) -> Option<String> {
        self.tip().and_then(|b| b.hash().ok()).map(Hash256::to_hex)
    }

    /// The height the next mined/received block would take.
    #[must_use]
    pub fn next_height(&self) -> u64 {
        self.blocks.len() as u64
    }

    #[must_use]
    pub fn next_difficulty(&self) -> u32 {
        self.params.difficulty(self.next_height())
    }

    #[must_use]
    pub fn next_prev(&self) -> String {
        self.tip_hash_hex()
            .unwrap_or_else(|| Hash256::genesis_prev().to_hex())
    }

    fn find_main_chain_index_by_hash(&self, hash: &str) -> Option<usize> {
        self.blocks
            .iter()
            .position(|b| b.hash().ok().map(Hash256::to_hex).as_deref() == Some(hash))
    }

    // ---- §4.4 verification ----------------------------------------------

    /// `verify_transaction(tx) -> fee`, checked against `self.main_chain()`.
    ///
    /// # Errors
    /// Returns `InputUnavailable`, `UnknownSource`, `AddressMismatch`,
    /// `BadSignature`, or `InsufficientInputs` per §4.4.
    pub fn verify_transaction(&self, tx: &Transaction) -> Result<u64, LedgerError> {
        verify_transaction_against(&self.blocks, tx)
    }

    /// Verifies `tx` and, if valid, admits it to the mempool.
    ///
    /// # Errors
    /// Propagates `verify_transaction`'s errors; also propagates
    /// transaction-id computation failures.
    pub fn add_transaction_to_pool(&mut self, tx: Transaction) -> Result<String, LedgerError> {
        let fee = self.verify_transaction(&tx)?;
        let id = tx.id()?;
        self.mempool.add(id.clone(), tx, fee);
        Ok(id)
    }

    #[must_use]
    pub fn calculate_balance(&self, address: &str) -> u64 {
        utxo::balance_for_address(&self.blocks, address)
    }

    #[must_use]
    pub fn get_transaction(&self, id: &str) -> Option<&Transaction> {
        utxo::find_transaction(&self.blocks, id)
    }

    #[must_use]
    pub fn get_block(&self, hash: &str) -> Option<&Block> {
        self.find_main_chain_index_by_hash(hash)
            .map(|i| &self.blocks[i])
    }

    #[must_use]
    pub fn get_block_height(&self, hash: &str) -> Option<u64> {
        self.find_main_chain_index_by_hash(hash).map(|i| i as u64)
    }

    /// Next block after `current_tip` on the main chain; `None` ⇒ genesis.
    /// Returns `Ok(None)` when the caller is already at the tip.
    ///
    /// # Errors
    /// Returns `BlockNotInMainChain` if `current_tip` is not on the main
    /// chain.
    pub fn get_next_block(&self, current_tip: Option<&str>) -> Result<Option<&Block>, LedgerError> {
        match current_tip {
            None => Ok(self.blocks.first()),
            Some(hash) => {
                let idx = self
                    .find_main_chain_index_by_hash(hash)
                    .ok_or_else(|| LedgerError::BlockNotInMainChain(hash.to_string()))?;
                Ok(self.blocks.get(idx + 1))
            }
        }
    }

    // ---- §4.5 block acceptance -------------------------------------------

    fn classify(&self, block: &Block) -> AcceptancePath {
        if self.blocks.is_empty() {
            return AcceptancePath::GenesisSlot;
        }
        if Some(block.prev.clone()) == self.tip_hash_hex() {
            return AcceptancePath::ExtendsMainTip;
        }
        if let Some(fork_tip) = self.fork.last() {
            if fork_tip.hash().ok().map(Hash256::to_hex).as_deref() == Some(block.prev.as_str()) {
                return AcceptancePath::ExtendsForkTip;
            }
        }
        if let Some(ancestor_index) = self.find_main_chain_index_by_hash(&block.prev) {
            let current_height = self.blocks.len() as u64 - 1;
            let ancestor_height = ancestor_index as u64;
            if current_height - ancestor_height <= self.params.confirmations {
                return AcceptancePath::NewFork { ancestor_index };
            }
            return AcceptancePath::TooOldAncestor;
        }
        AcceptancePath::Orphan
    }

    /// Validates PoW, coinbase correctness, and every non-coinbase
    /// transaction against `chain_prefix` — the chain up to (but not
    /// including) `block` (§4.5).
    fn validate_block_for_acceptance(
        &self,
        block: &Block,
        target_height: u64,
        chain_prefix: &[Block],
    ) -> Result<(), LedgerError> {
        let hash = block.hash()?;
        let difficulty = self.params.difficulty(target_height);
        if !hash.meets_difficulty(difficulty) {
            return Err(LedgerError::InvalidBlock(format!(
                "hash {hash} does not meet difficulty {difficulty} at height {target_height}"
            )));
        }

        let Some((coinbase, rest)) = block.transactions.split_last() else {
            return Err(LedgerError::InvalidBlock("block has no transactions".to_string()));
        };
        if !coinbase.is_coinbase() {
            return Err(LedgerError::InvalidBlock(
                "last transaction is not a coinbase".to_string(),
            ));
        }
        if coinbase.outputs.len() != 1 {
            return Err(LedgerError::InvalidBlock(
                "coinbase must have exactly one output".to_string(),
            ));
        }

        let mut total_fees = 0u64;
        for tx in rest {
            if tx.is_coinbase() {
                return Err(LedgerError::InvalidBlock(
                    "only the last transaction may be a coinbase".to_string(),
                ));
            }
            let fee = verify_transaction_against(chain_prefix, tx)?;
            total_fees = total_fees.checked_add(fee).ok_or_else(|| {
                LedgerError::InvalidBlock("fee overflow".to_string())
            })?;
        }

        let expected = self.params.block_reward(target_height) + total_fees;
        if coinbase.outputs[0].amount != expected {
            return Err(LedgerError::InvalidBlock(format!(
                "coinbase amount {} does not match reward+fees {expected}",
                coinbase.outputs[0].amount
            )));
        }

        Ok(())
    }

    fn prune_mempool(&mut self, block: &Block) {
        for tx in block.non_coinbase_transactions() {
            if let Ok(id) = tx.id() {
                let _ = self.mempool.remove(&id);
            }
        }
    }

    /// `receive_block(block)` (§4.5). Idempotent: receiving the same block
    /// twice leaves state unchanged.
    ///
    /// # Errors
    /// Returns `InvalidBlock` if the block fails proof-of-work, coinbase, or
    /// transaction validation; on error, ledger state is unchanged.
    pub fn receive_block(&mut self, block: Block) -> Result<(), LedgerError> {
        let hash_hex = block.hash()?.to_hex();
        if self.find_main_chain_index_by_hash(&hash_hex).is_some() {
            return Ok(());
        }

        match self.classify(&block) {
            AcceptancePath::GenesisSlot => {
                if !block.is_genesis() {
                    tracing::warn!(block = %hash_hex, "dropping non-genesis block offered to an empty chain");
                    return Ok(());
                }
                self.validate_block_for_acceptance(&block, 0, &[])?;
                self.blocks.push(block);
            }
            AcceptancePath::ExtendsMainTip => {
                let target_height = self.blocks.len() as u64;
                let chain_prefix = self.blocks.clone();
                self.validate_block_for_acceptance(&block, target_height, &chain_prefix)?;
                self.prune_mempool(&block);
                self.blocks.push(block);
            }
            AcceptancePath::NewFork { ancestor_index } => {
                let chain_prefix = self.blocks[..=ancestor_index].to_vec();
                let target_height = chain_prefix.len() as u64;
                self.validate_block_for_acceptance(&block, target_height, &chain_prefix)?;
                self.fork = vec![block];
            }
            AcceptancePath::TooOldAncestor => {
                tracing::warn!(block = %hash_hex, "dropping block extending an ancestor older than confirmations");
                return Ok(());
            }
            AcceptancePath::ExtendsForkTip => {
                let ancestor_index = self
                    .find_main_chain_index_by_hash(&self.fork[0].prev)
                    .ok_or_else(|| {
                        LedgerError::InvalidBlock("fork base missing from main chain".to_string())
                    })?;
                let mut chain_prefix = self.blocks[..=ancestor_index].to_vec();
                chain_prefix.extend(self.fork.iter().cloned());
                let target_height = chain_prefix.len() as u64;
                self.validate_block_for_acceptance(&block, target_height, &chain_prefix)?;
                self.fork.push(block);
            }
            AcceptancePath::Orphan => {
                tracing::info!(block = %hash_hex, "orphan block: unknown parent");
                self.orphans.push(block);
                return Ok(());
            }
        }

        self.reconverge()
    }

    // ---- §4.6 reconvergence ----------------------------------------------

    fn reconverge(&mut self) -> Result<(), LedgerError> {
        if self.fork.is_empty() {
            return Ok(());
        }
        let Some(fork_base_index) = self.find_main_chain_index_by_hash(&self.fork[0].prev) else {
            tracing::warn!("fork base no longer on main chain; dropping fork");
            self.fork.clear();
            return Ok(());
        };
        let fork_base_height = fork_base_index as u64;
        let main_height = self.blocks.len() as u64 - 1;
        let fork_tip_height = fork_base_height + self.fork.len() as u64;

        if main_height >= fork_tip_height {
            if main_height - fork_tip_height >= self.params.confirmations {
                tracing::debug!("main chain leads fork by confirmations; discarding fork");
                self.fork.clear();
            }
            return Ok(());
        }

        if fork_tip_height - main_height < self.params.confirmations {
            return Ok(());
        }

        tracing::info!(
            fork_base_height,
            new_height = fork_tip_height,
            "reconverging onto fork"
        );
        let evicted: Vec<Block> = self.blocks.split_off(fork_base_index + 1);
        self.blocks.append(&mut self.fork);

        for block in &evicted {
            for tx in block.non_coinbase_transactions() {
                match self.verify_transaction(tx) {
                    Ok(fee) => {
                        if let Ok(id) = tx.id() {
                            self.mempool.add(id, tx.clone(), fee);
                        }
                    }
                    Err(LedgerError::InputUnavailable { .. }) => {
                        // double-spent in the new branch: drop silently
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "dropping re-admitted transaction");
                    }
                }
            }
        }

        let adopted = self.blocks[fork_base_index + 1..].to_vec();
        for block in &adopted {
            for tx in block.non_coinbase_transactions() {
                if let Ok(id) = tx.id() {
                    let _ = self.mempool.remove(&id);
                }
            }
        }

        self.fork.clear();
        Ok(())
    }

    #[must_use]
    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            height: self.height(),
            tip: self.tip_hash_hex(),
            fork_len: self.fork.len(),
            orphan_count: self.orphans.len(),
            mempool_len: self.mempool.len(),
        }
    }

    // ---- §4.8 persistence --------------------------------------------------

    /// # Errors
    /// Returns `Io`/`Serialization` errors from writing the file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), LedgerError> {
        let doc = PersistedLedger {
            blocks: self.blocks.clone(),
            fork: self.fork.clone(),
            orphans: self.orphans.clone(),
        };
        let bytes =
            serde_json::to_vec(&doc).map_err(|e| LedgerError::Serialization(e.to_string()))?;
        std::fs::write(path, bytes).map_err(|e| LedgerError::Io(e.to_string()))
    }

    /// # Errors
    /// Returns `Io`/`Serialization` errors from reading the file.
    pub fn load(path: &std::path::Path, params: LedgerParams) -> Result<Self, LedgerError> {
        let bytes = std::fs::read(path).map_err(|e| LedgerError::Io(e.to_string()))?;
        let doc: PersistedLedger =
            serde_json::from_slice(&bytes).map_err(|e| LedgerError::Serialization(e.to_string()))?;
        Ok(Self {
            blocks: doc.blocks,
            fork: doc.fork,
            orphans: doc.orphans,
            mempool: Mempool::new(),
            params,
        })
    }
}

/// `verify_transaction(tx) -> fee` against an arbitrary chain slice; used
/// both for main-chain verification and for verifying fork candidates
/// against their (possibly forked) ancestor prefix.
///
/// # Errors
/// Returns `InputUnavailable`, `UnknownSource`, `AddressMismatch`,
/// `BadSignature`, or `InsufficientInputs` per §4.4.
pub fn verify_transaction_against(chain: &[Block], tx: &Transaction) -> Result<u64, LedgerError> {
    if tx.is_coinbase() {
        return Ok(0);
    }

    let mut total_in = 0u64;
    for input in &tx.inputs {
        if utxo::is_spent(chain, &input.transaction_id, input.vout) {
            return Err(LedgerError::InputUnavailable {
                transaction_id: input.transaction_id.clone(),
                vout: input.vout,
            });
        }

        let source = utxo::find_transaction(chain, &input.transaction_id)
            .ok_or_else(|| LedgerError::UnknownSource(input.transaction_id.clone()))?;
        let output = source
            .outputs
            .get(input.vout as usize)
            .ok_or_else(|| LedgerError::UnknownSource(input.transaction_id.clone()))?;

        let public_key = tx
            .decode_public_key()
            .map_err(|_| LedgerError::BadSignature)?
            .ok_or(LedgerError::BadSignature)?;
        if public_key.address() != output.address {
            return Err(LedgerError::AddressMismatch);
        }

        let signature = tx
            .decode_signature()
            .map_err(|_| LedgerError::BadSignature)?
            .ok_or(LedgerError::BadSignature)?;
        let bytes = tx.hashable_bytes()?;
        let ok = shared::verify_transaction_signature(&bytes, &signature, &public_key)
            .map_err(|_| LedgerError::BadSignature)?;
        if !ok {
            return Err(LedgerError::BadSignature);
        }

        total_in = total_in.saturating_add(output.amount);
    }

    let total_out = tx.total_output_value()?;
    if total_in < total_out {
        return Err(LedgerError::InsufficientInputs {
            inputs: total_in,
            outputs: total_out,
        });
    }

    Ok(total_in - total_out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{TxInput, TxOutput};
    use shared::KeyPair;

    fn mine_block(prev: String, timestamp: u64, transactions: Vec<Transaction>, difficulty: u32) -> Block {
        let mut block = Block::new(prev, timestamp, transactions);
        while !block.hash().unwrap().meets_difficulty(difficulty) {
            block.nonce += 1;
        }
        block
    }

    fn genesis(params: &LedgerParams, miner: &str) -> Block {
        let coinbase = Transaction::coinbase(miner.to_string(), params.block_reward(0), 0);
        mine_block(
            Hash256::genesis_prev().to_hex(),
            0,
            vec![coinbase],
            params.difficulty(0),
        )
    }

    #[test]
    fn s1_genesis_and_simple_transfer() {
        let params = LedgerParams::default();
        let mut ledger = Ledger::new(params);
        let m1 = KeyPair::generate().unwrap();
        let m1_addr = m1.public_key.address();
        let m2_addr = KeyPair::generate().unwrap().public_key.address();

        let genesis_block = genesis(&ledger.params().clone(), &m1_addr);
        ledger.receive_block(genesis_block.clone()).unwrap();
        assert_eq!(ledger.height(), Some(0));
        assert_eq!(ledger.calculate_balance(&m1_addr), 50);

        let coinbase_id = genesis_block.transactions[0].id().unwrap();
        let spend = Transaction::new(
            vec![TxInput::new(coinbase_id, 0)],
            vec![TxOutput::new(m2_addr.clone(), 20), TxOutput::new(m1_addr.clone(), 28)],
            1,
        )
        .sign(&m1)
        .unwrap();

        let pooled_id = ledger.add_transaction_to_pool(spend).unwrap();
        assert!(!pooled_id.is_empty());

        let fees = 2u64;
        let reward = ledger.params().block_reward(1) + fees;
        let coinbase = Transaction::coinbase(m1_addr.clone(), reward, 2);
        let top = ledger.mempool().top(2);
        let mut txs: Vec<Transaction> = top.into_iter().map(|(_, tx, _)| tx).collect();
        txs.push(coinbase);
        let block = mine_block(genesis_block.hash().unwrap().to_hex(), 2, txs, ledger.next_difficulty());
        ledger.receive_block(block).unwrap();

        assert_eq!(ledger.height(), Some(1));
        assert_eq!(ledger.calculate_balance(&m1_addr), 80);
        assert_eq!(ledger.calculate_balance(&m2_addr), 20);
    }

    #[test]
    fn s3_double_spend_rejected() {
        let params = LedgerParams::default();
        let mut ledger = Ledger::new(params);
        let m1 = KeyPair::generate().unwrap();
        let m1_addr = m1.public_key.address();
        let m2_addr = KeyPair::generate().unwrap().public_key.address();

        let genesis_block = genesis(&ledger.params().clone(), &m1_addr);
        ledger.receive_block(genesis_block.clone()).unwrap();
        let coinbase_id = genesis_block.transactions[0].id().unwrap();

        let spend = Transaction::new(
            vec![TxInput::new(coinbase_id.clone(), 0)],
            vec![TxOutput::new(m2_addr.clone(), 20), TxOutput::new(m1_addr.clone(), 28)],
            1,
        )
        .sign(&m1)
        .unwrap();
        ledger.add_transaction_to_pool(spend.clone()).unwrap();

        let txs = vec![spend.clone(), Transaction::coinbase(m1_addr.clone(), ledger.params().block_reward(1) + 2, 2)];
        let block = mine_block(genesis_block.hash().unwrap().to_hex(), 2, txs, ledger.next_difficulty());
        ledger.receive_block(block).unwrap();

        let err = ledger.add_transaction_to_pool(spend).unwrap_err();
        assert!(matches!(err, LedgerError::InputUnavailable { .. }));
    }

    #[test]
    fn s4_insufficient_inputs_rejected() {
        let params = LedgerParams::default();
        let mut ledger = Ledger::new(params);
        let m1 = KeyPair::generate().unwrap();
        let m1_addr = m1.public_key.address();

        let genesis_block = genesis(&ledger.params().clone(), &m1_addr);
        ledger.receive_block(genesis_block.clone()).unwrap();
        let coinbase_id = genesis_block.transactions[0].id().unwrap();

        let overspend = Transaction::new(
            vec![TxInput::new(coinbase_id, 0)],
            vec![TxOutput::new(m1_addr.clone(), 55)],
            1,
        )
        .sign(&m1)
        .unwrap();

        let err = ledger.add_transaction_to_pool(overspend).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientInputs { .. }));
    }

    #[test]
    fn s5_signature_mismatch_rejected() {
        let params = LedgerParams::default();
        let mut ledger = Ledger::new(params);
        let m1 = KeyPair::generate().unwrap();
        let m3 = KeyPair::generate().unwrap();
        let m1_addr = m1.public_key.address();

        let genesis_block = genesis(&ledger.params().clone(), &m1_addr);
        ledger.receive_block(genesis_block.clone()).unwrap();
        let coinbase_id = genesis_block.transactions[0].id().unwrap();

        let tx = Transaction::new(
            vec![TxInput::new(coinbase_id, 0)],
            vec![TxOutput::new(m1_addr.clone(), 50)],
            1,
        );
        let mut tampered = tx.sign(&m1).unwrap();
        let bytes = tampered.hashable_bytes().unwrap();
        let forged = m3.sign(&bytes).unwrap();
        tampered.signature = Some(base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            forged.as_bytes(),
        ));

        let err = ledger.add_transaction_to_pool(tampered).unwrap_err();
        assert_eq!(err, LedgerError::BadSignature);
    }

    #[test]
    fn s6_address_mismatch_rejected() {
        let params = LedgerParams::default();
        let mut ledger = Ledger::new(params);
        let m1 = KeyPair::generate().unwrap();
        let m3 = KeyPair::generate().unwrap();
        let m1_addr = m1.public_key.address();

        let genesis_block = genesis(&ledger.params().clone(), &m1_addr);
        ledger.receive_block(genesis_block.clone()).unwrap();
        let coinbase_id = genesis_block.transactions[0].id().unwrap();

        let tx = Transaction::new(
            vec![TxInput::new(coinbase_id, 0)],
            vec![TxOutput::new(m1_addr.clone(), 50)],
            1,
        )
        .sign(&m3)
        .unwrap();

        let err = ledger.add_transaction_to_pool(tx).unwrap_err();
        assert_eq!(err, LedgerError::AddressMismatch);
    }

    #[test]
    fn idempotent_receive() {
        let params = LedgerParams::default();
        let mut ledger = Ledger::new(params);
        let m1_addr = KeyPair::generate().unwrap().public_key.address();
        let genesis_block = genesis(&ledger.params().clone(), &m1_addr);

        ledger.receive_block(genesis_block.clone()).unwrap();
        let stats_before = ledger.stats();
        ledger.receive_block(genesis_block).unwrap();
        let stats_after = ledger.stats();
        assert_eq!(stats_before.height, stats_after.height);
        assert_eq!(stats_before.tip, stats_after.tip);
    }

    #[test]
    fn s7_fork_with_reconvergence() {
        let params = LedgerParams::default();
        let mut a = Ledger::new(params);
        let mut b = Ledger::new(params);
        let miner_addr = KeyPair::generate().unwrap().public_key.address();

        let genesis_block = genesis(&a.params().clone(), &miner_addr);
        a.receive_block(genesis_block.clone()).unwrap();
        b.receive_block(genesis_block.clone()).unwrap();

        // b mines its own competing block at height 1, diverging from a.
        let b1 = mine_block(
            genesis_block.hash().unwrap().to_hex(),
            101,
            vec![Transaction::coinbase(miner_addr.clone(), b.params().block_reward(1), 101)],
            b.params().difficulty(1),
        );
        b.receive_block(b1).unwrap();
        assert_eq!(b.height(), Some(1));

        let mut prev = genesis_block.hash().unwrap().to_hex();
        let mut a_blocks = Vec::new();
        for h in 1..=3u64 {
            let reward = a.params().block_reward(h);
            let cb = Transaction::coinbase(miner_addr.clone(), reward, h);
            let block = mine_block(prev.clone(), h, vec![cb], a.params().difficulty(h));
            prev = block.hash().unwrap().to_hex();
            a.receive_block(block.clone()).unwrap();
            a_blocks.push(block);
        }
        assert_eq!(a.height(), Some(3));

        // a1 extends the known ancestor (genesis) within confirmations: opens a fork.
        b.receive_block(a_blocks[0].clone()).unwrap();
        assert_eq!(b.fork().len(), 1);
        assert_eq!(b.height(), Some(1));

        // a2 extends the fork tip; fork (2) now leads main (1) by 1 < confirmations.
        b.receive_block(a_blocks[1].clone()).unwrap();
        assert_eq!(b.fork().len(), 2);
        assert_eq!(b.height(), Some(1));

        // a3 extends the fork tip; fork (3) leads main (1) by 2 >= confirmations: reconverge.
        b.receive_block(a_blocks[2].clone()).unwrap();
        assert_eq!(b.height(), Some(3));
        assert!(b.fork().is_empty());
        assert_eq!(
            b.get_block(&a_blocks[2].hash().unwrap().to_hex())
                .unwrap()
                .hash()
                .unwrap(),
            a_blocks[2].hash().unwrap()
        );
        assert_eq!(
            b.calculate_balance(&miner_addr),
            a.calculate_balance(&miner_addr)
        );
    }
}
