//! Notifications pushed by a ledger when new governance events land.

use agora_types::{BlockNumber, ProposalId};

use crate::GovernanceEvent;

/// A governance event observed on chain after a subscription was opened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerNotification {
    pub event: GovernanceEvent,
    /// The proposal the event concerns, when the log carries it.
    pub proposal_id: Option<ProposalId>,
    pub block_number: BlockNumber,
}

impl LedgerNotification {
    pub fn new(event: GovernanceEvent, proposal_id: Option<ProposalId>, block_number: BlockNumber) -> Self {
        Self {
            event,
            proposal_id,
            block_number,
        }
    }
}
