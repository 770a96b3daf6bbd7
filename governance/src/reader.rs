//! Event log reader: the full `ProposalCreated` history.

use agora_ledger::{GovernanceEvent, GovernanceLedger, LedgerError, LogEntry, LogFilter};
use tracing::debug;

/// Read every `ProposalCreated` log from genesis to the latest block, in
/// emission order.
///
/// There is no pagination and no bounded window. Ledger errors are returned
/// unchanged; the caller gets all entries or none.
pub async fn read_proposal_log<L>(ledger: &L) -> Result<Vec<LogEntry>, LedgerError>
where
    L: GovernanceLedger + ?Sized,
{
    let filter = LogFilter::full_history(GovernanceEvent::ProposalCreated);
    let entries = ledger.query_logs(&filter).await?;
    debug!(count = entries.len(), "read ProposalCreated history");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_nullables::{NullLedger, NullProposal};
    use agora_types::ProposalId;

    #[tokio::test]
    async fn returns_entries_in_emission_order() {
        let ledger = NullLedger::with_proposals([
            NullProposal::new(3, "c"),
            NullProposal::new(1, "a"),
            NullProposal::new(2, "b"),
        ]);
        let entries = read_proposal_log(&ledger).await.unwrap();
        let ids: Vec<ProposalId> = entries.iter().map(|e| e.proposal_id).collect();
        assert_eq!(
            ids,
            vec![
                ProposalId::from_u128(3),
                ProposalId::from_u128(1),
                ProposalId::from_u128(2)
            ]
        );
    }

    #[tokio::test]
    async fn transport_error_propagates_unchanged() {
        let ledger = NullLedger::with_proposals([NullProposal::new(1, "a")]);
        ledger.fail_log_queries(LedgerError::Transport("connection refused".into()));
        let err = read_proposal_log(&ledger).await.unwrap_err();
        assert!(matches!(err, LedgerError::Transport(ref msg) if msg == "connection refused"));
    }

    #[tokio::test]
    async fn empty_chain_reads_empty() {
        let ledger = NullLedger::new();
        assert!(read_proposal_log(&ledger).await.unwrap().is_empty());
        assert_eq!(ledger.call_counts().log_queries, 1);
    }
}
