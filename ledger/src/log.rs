//! Governance event logs and the filter used to query them.

use agora_types::{Address, BlockNumber, ProposalId};
use serde::{Deserialize, Serialize};

/// Governor events the client reads or listens for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GovernanceEvent {
    ProposalCreated,
    VoteCast,
    ProposalQueued,
    ProposalExecuted,
    ProposalCanceled,
    ProposalCanceledByGuardian,
    ProposalMetadataSet,
}

impl GovernanceEvent {
    pub const ALL: [GovernanceEvent; 7] = [
        Self::ProposalCreated,
        Self::VoteCast,
        Self::ProposalQueued,
        Self::ProposalExecuted,
        Self::ProposalCanceled,
        Self::ProposalCanceledByGuardian,
        Self::ProposalMetadataSet,
    ];

    /// Event name as declared in the governor ABI.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ProposalCreated => "ProposalCreated",
            Self::VoteCast => "VoteCast",
            Self::ProposalQueued => "ProposalQueued",
            Self::ProposalExecuted => "ProposalExecuted",
            Self::ProposalCanceled => "ProposalCanceled",
            Self::ProposalCanceledByGuardian => "ProposalCanceledByGuardian",
            Self::ProposalMetadataSet => "ProposalMetadataSet",
        }
    }
}

/// One end of a block range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockTag {
    Number(BlockNumber),
    Latest,
}

/// Which logs to fetch: one event kind over a block range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogFilter {
    pub event: GovernanceEvent,
    pub from_block: BlockTag,
    pub to_block: BlockTag,
}

impl LogFilter {
    /// The whole chain history, genesis through the latest block.
    pub fn full_history(event: GovernanceEvent) -> Self {
        Self {
            event,
            from_block: BlockTag::Number(BlockNumber::GENESIS),
            to_block: BlockTag::Latest,
        }
    }
}

/// A decoded governor log.
///
/// `proposer` and `description` are only present on `ProposalCreated`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub event: GovernanceEvent,
    pub proposal_id: ProposalId,
    pub block_number: BlockNumber,
    pub log_index: u64,
    pub proposer: Option<Address>,
    pub description: Option<String>,
}

impl LogEntry {
    pub fn proposal_created(
        proposal_id: ProposalId,
        proposer: Address,
        description: impl Into<String>,
        block_number: BlockNumber,
        log_index: u64,
    ) -> Self {
        Self {
            event: GovernanceEvent::ProposalCreated,
            proposal_id,
            block_number,
            log_index,
            proposer: Some(proposer),
            description: Some(description.into()),
        }
    }
}
