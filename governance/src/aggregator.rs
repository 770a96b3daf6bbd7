//! Proposal aggregator: join every per-proposal fetch, newest first.

use std::collections::HashSet;

use agora_ledger::{GovernanceLedger, LedgerError, LogEntry};
use futures_util::{stream, StreamExt, TryStreamExt};
use tracing::{debug, warn};

use crate::fetcher::fetch_proposal;
use crate::proposal::ProposalRecord;

/// Fetch every logged proposal and return the records newest first.
///
/// Entries sharing an id collapse to the first occurrence. At most
/// `max_concurrent` fetches are in flight at once; results are reassembled
/// in log order regardless of completion order. Nothing is returned until
/// every fetch has resolved, and the first failure aborts the rest.
pub async fn aggregate<L>(
    ledger: &L,
    entries: &[LogEntry],
    max_concurrent: usize,
) -> Result<Vec<ProposalRecord>, LedgerError>
where
    L: GovernanceLedger + ?Sized,
{
    let distinct = distinct_entries(entries);
    debug!(
        logged = entries.len(),
        distinct = distinct.len(),
        max_concurrent,
        "aggregating proposals"
    );

    let mut records: Vec<ProposalRecord> = stream::iter(distinct)
        .map(move |entry| async move { fetch_proposal(ledger, &entry).await })
        .buffered(max_concurrent.max(1))
        .try_collect()
        .await?;

    records.reverse();
    Ok(records)
}

/// Drop repeated ids, keeping the earliest log entry for each.
///
/// Entries are cloned so each fetch future owns its entry and stays `Send`
/// when the pass runs on a spawned task.
fn distinct_entries(entries: &[LogEntry]) -> Vec<LogEntry> {
    let mut seen = HashSet::with_capacity(entries.len());
    let mut distinct = Vec::with_capacity(entries.len());
    for entry in entries {
        if seen.insert(entry.proposal_id) {
            distinct.push(entry.clone());
        } else {
            warn!(
                proposal = %entry.proposal_id,
                block = %entry.block_number,
                "duplicate ProposalCreated log ignored"
            );
        }
    }
    distinct
}
