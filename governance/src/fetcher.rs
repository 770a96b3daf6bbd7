//! Per-proposal state fetcher.

use agora_ledger::{GovernanceLedger, LedgerError, LogEntry};
use tracing::debug;

use crate::proposal::{ProposalMetadata, ProposalRecord};

/// Rebuild one proposal from the governor's view calls.
///
/// Tallies, state, snapshot, deadline and metadata are queried concurrently.
/// A failure in any of the first four fails the record. A metadata failure
/// is swallowed and replaced by [`ProposalMetadata::unavailable`].
pub async fn fetch_proposal<L>(ledger: &L, entry: &LogEntry) -> Result<ProposalRecord, LedgerError>
where
    L: GovernanceLedger + ?Sized,
{
    let id = entry.proposal_id;

    let metadata = async {
        let metadata = match ledger.proposal_metadata(id).await {
            Ok(raw) => ProposalMetadata::from_raw(&id, raw),
            Err(err) => {
                debug!(proposal = %id, %err, "metadata unavailable, using defaults");
                ProposalMetadata::unavailable(&id)
            }
        };
        Ok::<_, LedgerError>(metadata)
    };

    let (votes, state, start, end, metadata) = tokio::try_join!(
        ledger.proposal_votes(id),
        ledger.proposal_state(id),
        ledger.proposal_snapshot(id),
        ledger.proposal_deadline(id),
        metadata,
    )?;

    let description = entry
        .description
        .clone()
        .filter(|d| !d.is_empty())
        .or(metadata.description)
        .unwrap_or_default();

    debug!(proposal = %id, state = %state, "fetched proposal");

    Ok(ProposalRecord {
        id,
        title: metadata.title,
        description,
        category: metadata.category,
        state,
        for_votes: votes.for_votes.to_decimal_string(),
        against_votes: votes.against.to_decimal_string(),
        abstain_votes: votes.abstain.to_decimal_string(),
        start,
        end,
        created_at: metadata.created_at,
        executed: metadata.executed,
        canceled: metadata.canceled,
        proposer: entry.proposer,
        ipfs_cid: metadata.ipfs_cid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_ledger::{GovernanceEvent, LogFilter, RawProposalMetadata};
    use agora_nullables::{NullLedger, NullProposal};
    use agora_types::{BlockNumber, ProposalCategory, ProposalState, Timestamp};

    async fn only_entry(ledger: &NullLedger) -> LogEntry {
        ledger
            .query_logs(&LogFilter::full_history(GovernanceEvent::ProposalCreated))
            .await
            .unwrap()
            .remove(0)
    }

    #[tokio::test]
    async fn metadata_failure_substitutes_defaults() {
        let ledger = NullLedger::with_proposals([NullProposal::new(77, "Release ETH from Treasury")
            .with_state(ProposalState::Active)
            .with_votes(10, 2, 1)]);
        let entry = only_entry(&ledger).await;

        let record = fetch_proposal(&ledger, &entry).await.unwrap();
        assert_eq!(record.title, "Proposal 77");
        assert_eq!(record.category, ProposalCategory::Finance);
        assert_eq!(record.created_at, Timestamp::UNKNOWN);
        assert_eq!(record.description, "Release ETH from Treasury");
        assert_eq!(record.state, ProposalState::Active);
        assert_eq!(record.for_votes, "10.0");
        assert_eq!(record.against_votes, "2.0");
        assert_eq!(record.abstain_votes, "1.0");
    }

    #[tokio::test]
    async fn metadata_fields_flow_into_record() {
        let ledger = NullLedger::with_proposals([NullProposal::new(8, "raw description")
            .with_window(100, 120)
            .with_metadata(RawProposalMetadata {
                title: "Upgrade router".into(),
                description: "ignored, log wins".into(),
                ipfs_cid: "bafyrouter".into(),
                category: 1,
                created_at: 1_700_000_123,
                executed: true,
                canceled: false,
            })]);
        let entry = only_entry(&ledger).await;

        let record = fetch_proposal(&ledger, &entry).await.unwrap();
        assert_eq!(record.title, "Upgrade router");
        assert_eq!(record.description, "raw description");
        assert_eq!(record.category, ProposalCategory::Protocol);
        assert_eq!(record.created_at, Timestamp::new(1_700_000_123));
        assert_eq!(record.start, BlockNumber::new(100));
        assert_eq!(record.end, BlockNumber::new(120));
        assert!(record.executed);
        assert_eq!(record.ipfs_cid.as_deref(), Some("bafyrouter"));
    }

    #[tokio::test]
    async fn empty_log_description_falls_back_to_metadata() {
        let ledger = NullLedger::with_proposals([NullProposal::new(9, "").with_metadata(
            RawProposalMetadata {
                title: "t".into(),
                description: "from metadata".into(),
                ..Default::default()
            },
        )]);
        let entry = only_entry(&ledger).await;
        let record = fetch_proposal(&ledger, &entry).await.unwrap();
        assert_eq!(record.description, "from metadata");
    }

    #[tokio::test]
    async fn tally_failure_fails_the_record() {
        let ledger = NullLedger::with_proposals([NullProposal::new(1, "a")]);
        ledger.fail_reads_for(1);
        let entry = only_entry(&ledger).await;
        assert!(matches!(
            fetch_proposal(&ledger, &entry).await,
            Err(LedgerError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn issues_every_query_once() {
        let ledger = NullLedger::with_proposals([NullProposal::new(1, "a")]);
        let entry = only_entry(&ledger).await;
        fetch_proposal(&ledger, &entry).await.unwrap();
        let calls = ledger.call_counts();
        assert_eq!(
            (calls.votes, calls.state, calls.snapshot, calls.deadline, calls.metadata),
            (1, 1, 1, 1, 1)
        );
    }
}
