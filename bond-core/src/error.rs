use shared::BlockchainError;
use thiserror::Error;

/// The ledger's error taxonomy. Variant names are the error *kinds*; callers
/// (the HTTP transport, the miner) map these onto their own surfaces.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("input {transaction_id}:{vout} is already spent in the main chain")]
    InputUnavailable { transaction_id: String, vout: u32 },

    #[error("no transaction {0} found in the main chain")]
    UnknownSource(String),

    #[error("public key does not hash to the claimed source address")]
    AddressMismatch,

    #[error("signature verification failed")]
    BadSignature,

    #[error("inputs ({inputs}) are less than outputs ({outputs})")]
    InsufficientInputs { inputs: u64, outputs: u64 },

    #[error("transaction {0} is not in the mempool")]
    NotInPool(String),

    #[error("hash {0} is not on the main chain")]
    BlockNotInMainChain(String),

    #[error("block rejected: {0}")]
    InvalidBlock(String),

    #[error("cryptographic error: {0}")]
    Crypto(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<BlockchainError> for LedgerError {
    fn from(err: BlockchainError) -> Self {
        match err {
            BlockchainError::SerializationError(msg) => Self::Serialization(msg),
            BlockchainError::IoError(msg) => Self::Io(msg),
            BlockchainError::InvalidSignature => Self::BadSignature,
            other => Self::Crypto(other.to_string()),
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
