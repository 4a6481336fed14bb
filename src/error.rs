//! HTTP-facing error type: wraps `LedgerError` and maps it onto status codes
//! per §7's policy table.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bond_core::LedgerError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("malformed request body: {0}")]
    BadRequest(String),

    #[error("not found")]
    NotFound,
}

impl IntoResponse for NodeError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Ledger(LedgerError::InputUnavailable { .. })
            | Self::Ledger(LedgerError::UnknownSource(_))
            | Self::Ledger(LedgerError::AddressMismatch)
            | Self::Ledger(LedgerError::BadSignature)
            | Self::Ledger(LedgerError::InsufficientInputs { .. }) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            Self::Ledger(LedgerError::BlockNotInMainChain(_)) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            Self::Ledger(LedgerError::NotInPool(_)) => (StatusCode::NOT_FOUND, self.to_string()),
            Self::Ledger(LedgerError::InvalidBlock(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            Self::Ledger(
                LedgerError::Crypto(_) | LedgerError::Serialization(_) | LedgerError::Io(_),
            ) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Self::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
