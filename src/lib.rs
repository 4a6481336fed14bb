//! Library surface for the node binary: config assembly, the HTTP transport,
//! the peer façade, and the wire DTOs. Split out from `main.rs` so the HTTP
//! surface can be exercised directly in integration tests, mirroring
//! `examples/DanDo385-rust-edu/labs/28-web-server-axum`'s lib/main split.

pub mod config;
pub mod error;
pub mod http;
pub mod node;
pub mod wire;

use std::time::{SystemTime, UNIX_EPOCH};

/// Nanoseconds since the Unix epoch, used for block/transaction timestamps.
#[must_use]
pub fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
