//! The node façade: an opaque peer set plus the two things a peer needs from
//! another node (§6) — best-effort block publication, and pulling missing
//! blocks during synchronization. Peer discovery itself is out of scope
//! (§9 Non-goals); peers are a fixed list supplied at startup.

use crate::wire::BlockWire;
use bond_core::Ledger;
use std::sync::{Arc, Mutex};

/// A fixed set of peer `host:port` strings and an HTTP client to reach them.
#[derive(Debug, Clone)]
pub struct Node {
    peers: Vec<String>,
    client: reqwest::Client,
}

impl Node {
    #[must_use]
    pub fn new(peers: Vec<String>) -> Self {
        Self {
            peers,
            client: reqwest::Client::new(),
        }
    }

    #[must_use]
    pub fn peers(&self) -> &[String] {
        &self.peers
    }

    /// Fire-and-forget `POST /blocks` to every peer. Failures are logged and
    /// otherwise ignored (§7: "publication failures to peers are best-effort").
    pub async fn publish_block(&self, block: &BlockWire) {
        for peer in &self.peers {
            let url = format!("http://{peer}/blocks");
            match self.client.post(&url).json(block).send().await {
                Ok(resp) if !resp.status().is_success() => {
                    tracing::warn!(peer, status = %resp.status(), "peer rejected published block");
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(peer, error = %err, "failed to publish block to peer");
                }
            }
        }
    }

    /// Walks each peer's `GET /blocks/get-next?current-tip=<tip>` in turn,
    /// feeding whatever it returns into the ledger via `receive_block`, until
    /// a full pass over every peer makes no progress (§6 peer sync protocol).
    pub async fn synchronize(&self, ledger: &Arc<Mutex<Ledger>>) {
        if self.peers.is_empty() {
            return;
        }

        loop {
            let mut made_progress = false;

            for peer in &self.peers {
                loop {
                    let current_tip = {
                        let guard = ledger.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
                        guard.tip().and_then(|b| b.hash().ok()).map(|h| h.to_hex())
                    };

                    let url = match &current_tip {
                        Some(tip) => format!("http://{peer}/blocks/get-next?current-tip={tip}"),
                        None => format!("http://{peer}/blocks/get-next"),
                    };

                    let response = match self.client.get(&url).send().await {
                        Ok(resp) => resp,
                        Err(err) => {
                            tracing::warn!(peer, error = %err, "sync request failed");
                            break;
                        }
                    };

                    if !response.status().is_success() {
                        break;
                    }

                    let wire: BlockWire = match response.json().await {
                        Ok(w) => w,
                        Err(err) => {
                            tracing::warn!(peer, error = %err, "peer sent a malformed block");
                            break;
                        }
                    };

                    let block = bond_core::Block::from(wire);
                    let mut guard = ledger.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
                    match guard.receive_block(block) {
                        Ok(()) => made_progress = true,
                        Err(err) => {
                            tracing::warn!(peer, error = %err, "peer block rejected during sync");
                            break;
                        }
                    }
                }
            }

            if !made_progress {
                break;
            }
        }
    }
}
