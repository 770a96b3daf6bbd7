//! Reconstructed proposals and their optional metadata.

use agora_ledger::RawProposalMetadata;
use agora_types::{
    Address, BlockNumber, ProposalAction, ProposalCategory, ProposalId, ProposalState, Timestamp,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The client's view of one governance proposal.
///
/// Built fresh on every reconstruction pass and never mutated afterwards.
/// `id` is the aggregation key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProposalRecord {
    pub id: ProposalId,
    pub title: String,
    pub description: String,
    pub category: ProposalCategory,
    pub state: ProposalState,
    /// Human-scaled decimal strings (18-decimal fixed point on chain).
    pub for_votes: String,
    pub against_votes: String,
    pub abstain_votes: String,
    /// Snapshot block.
    pub start: BlockNumber,
    /// Deadline block.
    pub end: BlockNumber,
    pub created_at: Timestamp,
    pub executed: bool,
    pub canceled: bool,
    pub proposer: Option<Address>,
    pub ipfs_cid: Option<String>,
}

impl ProposalRecord {
    /// Title shown when the governor holds no metadata for a proposal.
    pub fn placeholder_title(id: &ProposalId) -> String {
        format!("Proposal {id}")
    }

    /// Sum of the three tallies as a floating-point approximation.
    pub fn total_votes(&self) -> f64 {
        vote_magnitude(&self.for_votes)
            + vote_magnitude(&self.against_votes)
            + vote_magnitude(&self.abstain_votes)
    }

    pub fn available_actions(&self) -> &'static [ProposalAction] {
        self.state.available_actions()
    }
}

/// Parse a decimal vote string into a magnitude for sorting and analytics.
///
/// Unparseable or non-finite input counts as zero.
pub fn vote_magnitude(votes: &str) -> f64 {
    votes
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Metadata after defaults have been applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalMetadata {
    pub title: String,
    pub description: Option<String>,
    pub category: ProposalCategory,
    pub created_at: Timestamp,
    pub executed: bool,
    pub canceled: bool,
    pub ipfs_cid: Option<String>,
}

impl ProposalMetadata {
    /// Defaults used when `getProposalMetadata` fails.
    pub fn unavailable(id: &ProposalId) -> Self {
        Self {
            title: ProposalRecord::placeholder_title(id),
            description: None,
            category: ProposalCategory::default(),
            created_at: Timestamp::UNKNOWN,
            executed: false,
            canceled: false,
            ipfs_cid: None,
        }
    }

    /// Apply defaults to what the governor returned: an empty title falls
    /// back to the placeholder, an unknown category code to `Finance`.
    pub fn from_raw(id: &ProposalId, raw: RawProposalMetadata) -> Self {
        let title = if raw.title.is_empty() {
            ProposalRecord::placeholder_title(id)
        } else {
            raw.title
        };
        let category = ProposalCategory::from_code(raw.category).unwrap_or_else(|_| {
            warn!(proposal = %id, code = raw.category, "unknown proposal category, using Finance");
            ProposalCategory::default()
        });
        Self {
            title,
            description: Some(raw.description).filter(|d| !d.is_empty()),
            category,
            created_at: Timestamp::new(raw.created_at),
            executed: raw.executed,
            canceled: raw.canceled,
            ipfs_cid: Some(raw.ipfs_cid).filter(|c| !c.is_empty()),
        }
    }
}
