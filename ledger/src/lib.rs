//! Read-only ledger interface to the on-chain governor.
//!
//! Everything the proposal pipeline knows about governance arrives through
//! [`GovernanceLedger`]: historical logs, per-proposal view calls, and a
//! notification stream for new governance events. Implementations live in
//! other crates (the JSON-RPC adapter, the in-memory nullable).

pub mod error;
pub mod ledger;
pub mod log;
pub mod notification;
pub mod query;

pub use error::LedgerError;
pub use ledger::GovernanceLedger;
pub use log::{BlockTag, GovernanceEvent, LogEntry, LogFilter};
pub use notification::LedgerNotification;
pub use query::{ProposalVotes, RawProposalMetadata};
