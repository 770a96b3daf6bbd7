//! Error types for the JSON-RPC adapter and their mapping into [`LedgerError`].

use agora_ledger::LedgerError;
use thiserror::Error;

/// Malformed ABI data or JSON-RPC encodings.
#[derive(Debug, Error)]
pub enum AbiError {
    #[error("data too short: needed {needed} bytes, got {got}")]
    ShortData { needed: usize, got: usize },

    #[error("value does not fit in {0}")]
    Overflow(&'static str),

    #[error("bool word is neither 0 nor 1")]
    InvalidBool,

    #[error("dynamic offset {0} is not word aligned")]
    MisalignedOffset(usize),

    #[error("unexpected topic count {0}")]
    UnexpectedTopics(usize),

    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("string is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl From<AbiError> for LedgerError {
    fn from(e: AbiError) -> Self {
        LedgerError::Decode(e.to_string())
    }
}

/// Map a reqwest failure onto the ledger's transport error.
pub(crate) fn transport_error(e: reqwest::Error) -> LedgerError {
    if e.is_timeout() {
        LedgerError::Transport(format!("request timed out: {e}"))
    } else if e.is_connect() {
        LedgerError::Transport(format!("connection failed: {e}"))
    } else if e.is_decode() {
        LedgerError::Decode(format!("invalid JSON-RPC response: {e}"))
    } else {
        LedgerError::Transport(e.to_string())
    }
}

/// Map a JSON-RPC error object. Nodes report reverted `eth_call`s as code 3
/// or with "revert" in the message.
pub(crate) fn rpc_error(code: i64, message: String) -> LedgerError {
    if code == 3 || message.to_ascii_lowercase().contains("revert") {
        LedgerError::Reverted(message)
    } else {
        LedgerError::Rpc { code, message }
    }
}
