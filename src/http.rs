//! The HTTP transport (§6): a thin `axum` surface over a shared
//! `Arc<Mutex<Ledger>>`. Handlers deserialize, take the lock briefly, and map
//! `LedgerError` onto HTTP status codes via `NodeError`.

use crate::error::NodeError;
use crate::node::Node;
use crate::wire::{BlockWire, TransactionWire};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use bond_core::{Block, Ledger, Transaction};
use serde::{Deserialize, Serialize};
use shared::{KeyPair, LedgerParams};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Mutex<Ledger>>,
    pub node: Arc<Node>,
    pub miner_address: Arc<Mutex<Option<String>>>,
    pub blockchain_file: Option<PathBuf>,
    pub params: LedgerParams,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/balances/:address", get(get_balance))
        .route("/blocks/:hash", get(get_block))
        .route("/blocks/get-next", get(get_next_block))
        .route("/blocks", post(post_block))
        .route("/transactions/:id", get(get_transaction))
        .route("/transactions", post(post_transaction))
        .route("/transactions/sign", post(post_sign_transaction))
        .route("/mine", post(post_mine))
        .route("/persistence/save", post(post_save))
        .route("/persistence/load", post(post_load))
        .route("/synchronize", post(post_synchronize))
        .with_state(state)
}

#[derive(Serialize)]
struct BalanceResponse {
    balance: u64,
}

async fn get_balance(
    State(state): State<AppState>,
    axum::extract::Path(address): axum::extract::Path<String>,
) -> Json<BalanceResponse> {
    let guard = state.ledger.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    Json(BalanceResponse {
        balance: guard.calculate_balance(&address),
    })
}

async fn get_block(
    State(state): State<AppState>,
    axum::extract::Path(hash): axum::extract::Path<String>,
) -> Result<Json<BlockWire>, NodeError> {
    let guard = state.ledger.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    let block = guard.get_block(&hash).ok_or(NodeError::NotFound)?;
    Ok(Json(BlockWire::from_domain(block)?))
}

#[derive(Deserialize)]
struct GetNextQuery {
    #[serde(rename = "current-tip")]
    current_tip: Option<String>,
}

async fn get_next_block(
    State(state): State<AppState>,
    Query(query): Query<GetNextQuery>,
) -> Result<Json<BlockWire>, NodeError> {
    let guard = state.ledger.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    let next = guard.get_next_block(query.current_tip.as_deref())?;
    let block = next.ok_or(NodeError::NotFound)?;
    Ok(Json(BlockWire::from_domain(block)?))
}

async fn post_block(
    State(state): State<AppState>,
    Json(wire): Json<BlockWire>,
) -> Result<StatusCode, NodeError> {
    let block = Block::from(wire);
    let mut guard = state.ledger.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    guard.receive_block(block)?;
    Ok(StatusCode::ACCEPTED)
}

async fn get_transaction(
    State(state): State<AppState>,
    axum::extract::Path(id): axum::extract::Path<String>,
) -> Result<Json<TransactionWire>, NodeError> {
    let guard = state.ledger.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    let tx = guard.get_transaction(&id).ok_or(NodeError::NotFound)?;
    Ok(Json(TransactionWire::from_domain(tx)?))
}

async fn post_transaction(
    State(state): State<AppState>,
    Json(wire): Json<TransactionWire>,
) -> Result<Json<serde_json::Value>, NodeError> {
    let tx = Transaction::from(wire);
    let mut guard = state.ledger.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    let id = guard.add_transaction_to_pool(tx)?;
    Ok(Json(serde_json::json!({ "id": id })))
}

#[derive(Deserialize)]
struct SignTransactionBody {
    transaction: TransactionWire,
    private_key: String,
}

#[derive(Deserialize)]
struct SignQuery {
    #[serde(rename = "add-to-transaction-pool", default)]
    add_to_transaction_pool: Option<String>,
}

/// Server-side signing for diagnostics only: the caller supplies the raw
/// base64 private key scalar and the transaction is signed with it.
async fn post_sign_transaction(
    State(state): State<AppState>,
    Query(query): Query<SignQuery>,
    Json(body): Json<SignTransactionBody>,
) -> Result<Json<TransactionWire>, NodeError> {
    use base64::Engine;
    let scalar = base64::engine::general_purpose::STANDARD
        .decode(&body.private_key)
        .map_err(|e| NodeError::BadRequest(e.to_string()))?;
    let private_key =
        shared::PrivateKey::from_bytes(scalar).map_err(|e| NodeError::BadRequest(e.to_string()))?;
    let keypair =
        KeyPair::from_private_key(private_key).map_err(|e| NodeError::BadRequest(e.to_string()))?;

    let tx = Transaction::from(body.transaction);
    let signed = tx.sign(&keypair)?;

    if query.add_to_transaction_pool.is_some() {
        let mut guard = state.ledger.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.add_transaction_to_pool(signed.clone())?;
    }

    Ok(Json(TransactionWire::from_domain(&signed)?))
}

async fn post_mine(State(state): State<AppState>) -> Result<Json<BlockWire>, NodeError> {
    let miner_address = {
        let guard = state.miner_address.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.clone()
    }
    .ok_or_else(|| NodeError::BadRequest("no miner-address configured".to_string()))?;

    let mined = {
        let mut guard = state.ledger.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let height = guard.next_height();
        let difficulty = guard.next_difficulty();
        let prev = guard.next_prev();
        let top = guard.mempool().top(guard.params().transactions_per_block);
        let fees: u64 = top.iter().map(|(_, _, fee)| fee).sum();
        let reward = guard.params().block_reward(height) + fees;
        let timestamp = crate::now_ns();
        let coinbase = Transaction::coinbase(miner_address, reward, timestamp);
        let mut transactions: Vec<Transaction> = top.into_iter().map(|(_, tx, _)| tx).collect();
        transactions.push(coinbase);
        let mut block = Block::new(prev, timestamp, transactions);
        while !block.hash()?.meets_difficulty(difficulty) {
            block.nonce += 1;
        }
        guard.receive_block(block.clone())?;
        block
    };

    let wire = BlockWire::from_domain(&mined)?;
    state.node.publish_block(&wire).await;
    Ok(Json(wire))
}

async fn post_save(State(state): State<AppState>) -> Result<StatusCode, NodeError> {
    let path = state
        .blockchain_file
        .clone()
        .ok_or_else(|| NodeError::BadRequest("TOYCHAIN_BLOCKCHAIN_FILE not configured".to_string()))?;
    let guard = state.ledger.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    guard.save(&path)?;
    Ok(StatusCode::OK)
}

async fn post_load(State(state): State<AppState>) -> Result<StatusCode, NodeError> {
    let path = state
        .blockchain_file
        .clone()
        .ok_or_else(|| NodeError::BadRequest("TOYCHAIN_BLOCKCHAIN_FILE not configured".to_string()))?;
    let loaded = Ledger::load(&path, state.params)?;
    let mut guard = state.ledger.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    *guard = loaded;
    Ok(StatusCode::OK)
}

async fn post_synchronize(State(state): State<AppState>) -> StatusCode {
    state.node.synchronize(&state.ledger).await;
    StatusCode::OK
}
