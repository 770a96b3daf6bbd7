//! The ledger trait consumed by the proposal pipeline.

use agora_types::{BlockNumber, ProposalId, ProposalState};
use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::{LedgerError, LedgerNotification, LogEntry, LogFilter, ProposalVotes, RawProposalMetadata};

/// Read-only access to the governor contract.
///
/// One handle is shared by every concurrent query of a reconstruction pass,
/// so implementations must be `Send + Sync` and must not assume calls
/// complete in the order they were issued.
#[async_trait]
pub trait GovernanceLedger: Send + Sync {
    /// Logs matching `filter`, in emission order.
    async fn query_logs(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, LedgerError>;

    /// `proposalVotes(id)`.
    async fn proposal_votes(&self, id: ProposalId) -> Result<ProposalVotes, LedgerError>;

    /// `state(id)`.
    async fn proposal_state(&self, id: ProposalId) -> Result<ProposalState, LedgerError>;

    /// `proposalSnapshot(id)`.
    async fn proposal_snapshot(&self, id: ProposalId) -> Result<BlockNumber, LedgerError>;

    /// `proposalDeadline(id)`.
    async fn proposal_deadline(&self, id: ProposalId) -> Result<BlockNumber, LedgerError>;

    /// `getProposalMetadata(id)`. Governors without the metadata extension,
    /// or proposals created without metadata, fail this call.
    async fn proposal_metadata(&self, id: ProposalId) -> Result<RawProposalMetadata, LedgerError>;

    /// Open a notification stream. Dropping the receiver deregisters it.
    async fn subscribe(&self) -> Result<broadcast::Receiver<LedgerNotification>, LedgerError> {
        Err(LedgerError::SubscriptionUnsupported)
    }
}
