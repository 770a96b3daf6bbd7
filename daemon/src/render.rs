//! Terminal and JSON output for the CLI.

use std::fmt;

use agora_governance::{AnalyticsSummary, ProposalRecord};
use agora_types::ProposalAction;
use agora_utils::format_created_at;
use serde::Serialize;

fn action_label(action: &ProposalAction) -> &'static str {
    match action {
        ProposalAction::Vote => "vote",
        ProposalAction::Queue => "queue",
        ProposalAction::Execute => "execute",
    }
}

/// One block per proposal, in the order given.
pub fn proposals_text(records: &[ProposalRecord]) -> String {
    ProposalList(records).to_string()
}

struct ProposalList<'a>(&'a [ProposalRecord]);

impl fmt::Display for ProposalList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No proposals found.");
        }
        for record in self.0 {
            writeln!(f, "#{} [{}] {}", record.id, record.state, record.title)?;
            writeln!(
                f,
                "    category: {}  created: {}  voting: blocks {}-{}",
                record.category,
                format_created_at(record.created_at),
                record.start,
                record.end
            )?;
            writeln!(
                f,
                "    for: {}  against: {}  abstain: {}",
                record.for_votes, record.against_votes, record.abstain_votes
            )?;
            if !record.description.is_empty() && record.description != record.title {
                writeln!(f, "    {}", record.description)?;
            }
            let actions: Vec<&str> = record.available_actions().iter().map(action_label).collect();
            if !actions.is_empty() {
                writeln!(f, "    actions: {}", actions.join(", "))?;
            }
        }
        Ok(())
    }
}

pub fn analytics_text(summary: &AnalyticsSummary) -> String {
    format!(
        "Total proposals:       {}\n\
         Executed:              {}\n\
         Defeated:              {}\n\
         Active:                {}\n\
         Total votes:           {:.2}\n\
         Average participation: {:.2}\n",
        summary.total_proposals,
        summary.executed_proposals,
        summary.defeated_proposals,
        summary.active_proposals,
        summary.total_votes,
        summary.average_participation,
    )
}

pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}
