use agora_types::TypesError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("call reverted: {0}")]
    Reverted(String),

    #[error("malformed ledger response: {0}")]
    Decode(String),

    #[error("invalid value from ledger: {0}")]
    Types(#[from] TypesError),

    #[error("ledger does not support event subscriptions")]
    SubscriptionUnsupported,
}
