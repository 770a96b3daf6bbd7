//! Analytics reducer.

use agora_types::ProposalState;
use serde::{Deserialize, Serialize};

use crate::proposal::ProposalRecord;

/// Summary counts over the unfiltered proposal list.
///
/// Vote figures are f64 approximations for display.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total_proposals: usize,
    pub executed_proposals: usize,
    pub defeated_proposals: usize,
    pub active_proposals: usize,
    pub average_participation: f64,
    pub total_votes: f64,
}

pub fn summarize(records: &[ProposalRecord]) -> AnalyticsSummary {
    let mut summary = records
        .iter()
        .fold(AnalyticsSummary::default(), |mut acc, record| {
            acc.total_proposals += 1;
            match record.state {
                ProposalState::Executed => acc.executed_proposals += 1,
                ProposalState::Defeated => acc.defeated_proposals += 1,
                ProposalState::Active => acc.active_proposals += 1,
                _ => {}
            }
            acc.total_votes += record.total_votes();
            acc
        });

    if summary.total_proposals > 0 {
        summary.average_participation = summary.total_votes / summary.total_proposals as f64;
    }
    summary
}
