//! Background mining (§4.7): a single thread that polls the mempool,
//! assembles a candidate block, searches for a satisfying nonce, and submits
//! the result through `Ledger::receive_block` like any other peer's block
//! would be submitted.

use crate::block::Block;
use crate::blockchain::Ledger;
use crate::transaction::Transaction;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// How often (in nonce attempts) the search re-checks whether the chain it
/// is mining against has moved on, without re-locking the ledger every
/// attempt.
const STALENESS_CHECK_INTERVAL: u64 = 4096;

fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// A background miner bound to one `Ledger`. Dropping it stops the thread.
pub struct Miner {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Miner {
    /// Spawns the mining thread. `miner_address` receives every coinbase
    /// reward this miner produces.
    #[must_use]
    pub fn spawn(ledger: Arc<Mutex<Ledger>>, miner_address: String, poll_interval: Duration) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_for_thread = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("miner".to_string())
            .spawn(move || mine_loop(&ledger, &miner_address, &stop_for_thread, poll_interval))
            .expect("failed to spawn miner thread");
        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Signals the mining thread to stop and waits for it to exit.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Miner {
    fn drop(&mut self) {
        self.stop();
    }
}

fn mine_loop(ledger: &Arc<Mutex<Ledger>>, miner_address: &str, stop: &Arc<AtomicBool>, poll_interval: Duration) {
    while !stop.load(Ordering::SeqCst) {
        let Some((block, difficulty, parent)) = assemble_candidate(ledger, miner_address) else {
            thread::sleep(poll_interval);
            continue;
        };

        match search(block, difficulty, &parent, ledger, stop) {
            Some(mined) => {
                let mut guard = ledger.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
                if let Err(e) = guard.receive_block(mined) {
                    tracing::warn!(error = %e, "mined block rejected by the ledger");
                }
            }
            None => {
                // stopped, or the chain moved on under us: reassemble against the new tip
            }
        }
    }
}

/// Builds an unmined candidate block: the mempool's top `transactions_per_block`
/// transactions plus a coinbase paying `block_reward(height) + fees`. Mirrors
/// the original's height guard (`toychain/main.py`'s `create_block`): an
/// empty mempool on a non-genesis chain means nothing to mine yet.
fn assemble_candidate(ledger: &Arc<Mutex<Ledger>>, miner_address: &str) -> Option<(Block, u32, String)> {
    let guard = ledger.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    let height = guard.next_height();
    let top = guard.mempool().top(guard.params().transactions_per_block);
    if top.is_empty() && height > 0 {
        return None;
    }

    let difficulty = guard.next_difficulty();
    let prev = guard.next_prev();
    let fees: u64 = top.iter().map(|(_, _, fee)| fee).sum();
    let reward = guard.params().block_reward(height);
    drop(guard);

    let timestamp = now_ns();
    let coinbase = Transaction::coinbase(miner_address.to_string(), reward + fees, timestamp);
    let mut transactions: Vec<Transaction> = top.into_iter().map(|(_, tx, _)| tx).collect();
    transactions.push(coinbase);

    Some((Block::new(prev.clone(), timestamp, transactions), difficulty, prev))
}

/// Searches nonces until `block` meets `difficulty`, `stop` fires, or the
/// ledger's tip moves past `parent` (someone else's block won the race).
fn search(
    mut block: Block,
    difficulty: u32,
    parent: &str,
    ledger: &Arc<Mutex<Ledger>>,
    stop: &Arc<AtomicBool>,
) -> Option<Block> {
    let mut nonce = 0u64;
    loop {
        if stop.load(Ordering::SeqCst) {
            return None;
        }

        block.nonce = nonce;
        if let Ok(hash) = block.hash() {
            if hash.meets_difficulty(difficulty) {
                return Some(block);
            }
        }

        nonce = nonce.wrapping_add(1);
        if nonce % STALENESS_CHECK_INTERVAL == 0 {
            let guard = ledger.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            if guard.next_prev() != parent {
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{KeyPair, LedgerParams};
    use std::time::Duration;

    #[test]
    fn mines_and_submits_genesis_block() {
        let mut params = LedgerParams::default();
        params.base_difficulty = 1; // keep the test fast
        let ledger = Arc::new(Mutex::new(Ledger::new(params)));
        let miner_addr = KeyPair::generate().unwrap().public_key.address();

        let mut miner = Miner::spawn(Arc::clone(&ledger), miner_addr.clone(), Duration::from_millis(5));

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        loop {
            if ledger.lock().unwrap().height() == Some(0) {
                break;
            }
            assert!(std::time::Instant::now() < deadline, "miner did not produce a block in time");
            thread::sleep(Duration::from_millis(10));
        }

        miner.stop();
        let guard = ledger.lock().unwrap();
        assert_eq!(guard.calculate_balance(&miner_addr), guard.params().block_reward(0));
    }
}
