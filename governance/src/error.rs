use agora_ledger::LedgerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("reconstruction pass {generation} was superseded by a newer pass")]
    Superseded { generation: u64 },

    #[error("reconstruction task failed: {0}")]
    TaskFailed(String),
}
