//! Parsing and conversion errors for the fundamental types.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid proposal id: {0}")]
    InvalidProposalId(String),

    #[error("proposal id does not fit in 256 bits: {0}")]
    ProposalIdOverflow(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("unknown proposal state code {0}")]
    UnknownState(u8),

    #[error("unknown proposal state: {0}")]
    UnknownStateName(String),

    #[error("unknown proposal category code {0}")]
    UnknownCategory(u8),

    #[error("unknown proposal category: {0}")]
    UnknownCategoryName(String),
}
