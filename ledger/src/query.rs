//! Results of the governor's per-proposal view calls.

use agora_types::VoteAmount;
use serde::{Deserialize, Serialize};

/// Return value of `proposalVotes(uint256)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalVotes {
    pub against: VoteAmount,
    pub for_votes: VoteAmount,
    pub abstain: VoteAmount,
}

/// Return value of `getProposalMetadata(uint256)`, undecoded beyond ABI types.
///
/// `category` stays a raw code here; mapping it (and deciding what to do with
/// unknown codes) is the fetcher's job.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProposalMetadata {
    pub title: String,
    pub description: String,
    pub ipfs_cid: String,
    pub category: u8,
    pub created_at: u64,
    pub executed: bool,
    pub canceled: bool,
}
