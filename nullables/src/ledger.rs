//! Nullable ledger — an in-memory governor for testing.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use agora_ledger::{
    GovernanceEvent, GovernanceLedger, LedgerError, LedgerNotification, LogEntry, LogFilter,
    ProposalVotes, RawProposalMetadata,
};
use agora_types::{Address, BlockNumber, ProposalId, ProposalState, VoteAmount};
use async_trait::async_trait;
use tokio::sync::broadcast;

/// One proposal as the in-memory governor stores it.
#[derive(Clone, Debug)]
pub struct NullProposal {
    pub id: ProposalId,
    pub proposer: Address,
    pub description: String,
    pub votes: ProposalVotes,
    pub state: ProposalState,
    pub snapshot: BlockNumber,
    pub deadline: BlockNumber,
    /// `None` makes `getProposalMetadata` revert for this proposal.
    pub metadata: Option<RawProposalMetadata>,
}

impl NullProposal {
    pub fn new(id: u128, description: impl Into<String>) -> Self {
        Self {
            id: ProposalId::from_u128(id),
            proposer: Address::ZERO,
            description: description.into(),
            votes: ProposalVotes::default(),
            state: ProposalState::Pending,
            snapshot: BlockNumber::new(1),
            deadline: BlockNumber::new(21),
            metadata: None,
        }
    }

    pub fn with_state(mut self, state: ProposalState) -> Self {
        self.state = state;
        self
    }

    /// Tallies in whole tokens.
    pub fn with_votes(mut self, for_votes: u128, against: u128, abstain: u128) -> Self {
        self.votes = ProposalVotes {
            against: VoteAmount::from_tokens(against),
            for_votes: VoteAmount::from_tokens(for_votes),
            abstain: VoteAmount::from_tokens(abstain),
        };
        self
    }

    pub fn with_raw_votes(mut self, votes: ProposalVotes) -> Self {
        self.votes = votes;
        self
    }

    pub fn with_window(mut self, snapshot: u64, deadline: u64) -> Self {
        self.snapshot = BlockNumber::new(snapshot);
        self.deadline = BlockNumber::new(deadline);
        self
    }

    pub fn with_proposer(mut self, proposer: Address) -> Self {
        self.proposer = proposer;
        self
    }

    pub fn with_metadata(mut self, metadata: RawProposalMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// How many times each ledger method has been called.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub log_queries: usize,
    pub votes: usize,
    pub state: usize,
    pub snapshot: usize,
    pub deadline: usize,
    pub metadata: usize,
}

struct Inner {
    logs: Vec<LogEntry>,
    proposals: HashMap<ProposalId, NullProposal>,
    log_failure: Option<LedgerError>,
    failing_reads: HashSet<ProposalId>,
    delays: HashMap<ProposalId, Duration>,
    calls: CallCounts,
    block: u64,
}

/// An in-memory governor ledger.
///
/// Proposals are appended with [`NullLedger::add_proposal`], which also emits
/// the matching `ProposalCreated` log. Everything else is adjusted in place.
pub struct NullLedger {
    inner: Mutex<Inner>,
    notifications: broadcast::Sender<LedgerNotification>,
}

impl NullLedger {
    pub fn new() -> Self {
        let (notifications, _) = broadcast::channel(64);
        Self {
            inner: Mutex::new(Inner {
                logs: Vec::new(),
                proposals: HashMap::new(),
                log_failure: None,
                failing_reads: HashSet::new(),
                delays: HashMap::new(),
                calls: CallCounts::default(),
                block: 0,
            }),
            notifications,
        }
    }

    /// Build a ledger preloaded with proposals, created in the given order.
    pub fn with_proposals(proposals: impl IntoIterator<Item = NullProposal>) -> Self {
        let ledger = Self::new();
        for proposal in proposals {
            ledger.add_proposal(proposal);
        }
        ledger
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a proposal and append its `ProposalCreated` log.
    pub fn add_proposal(&self, proposal: NullProposal) {
        let mut inner = self.lock();
        inner.block += 1;
        let block = BlockNumber::new(inner.block);
        let entry = LogEntry::proposal_created(
            proposal.id,
            proposal.proposer,
            proposal.description.clone(),
            block,
            0,
        );
        inner.logs.push(entry);
        inner.proposals.insert(proposal.id, proposal);
    }

    /// Append a second `ProposalCreated` log for an existing proposal, as a
    /// re-org or duplicate emission would.
    pub fn duplicate_log(&self, id: u128) {
        let mut inner = self.lock();
        let id = ProposalId::from_u128(id);
        if let Some(entry) = inner.logs.iter().find(|e| e.proposal_id == id).cloned() {
            inner.block += 1;
            let block = BlockNumber::new(inner.block);
            inner.logs.push(LogEntry {
                block_number: block,
                ..entry
            });
        }
    }

    pub fn set_state(&self, id: u128, state: ProposalState) {
        if let Some(p) = self.lock().proposals.get_mut(&ProposalId::from_u128(id)) {
            p.state = state;
        }
    }

    pub fn set_votes(&self, id: u128, for_votes: u128, against: u128, abstain: u128) {
        if let Some(p) = self.lock().proposals.get_mut(&ProposalId::from_u128(id)) {
            p.votes = ProposalVotes {
                against: VoteAmount::from_tokens(against),
                for_votes: VoteAmount::from_tokens(for_votes),
                abstain: VoteAmount::from_tokens(abstain),
            };
        }
    }

    /// Make every log query fail with `error` until [`NullLedger::clear_failures`].
    pub fn fail_log_queries(&self, error: LedgerError) {
        self.lock().log_failure = Some(error);
    }

    /// Make the tally/state/marker reads for one proposal fail.
    pub fn fail_reads_for(&self, id: u128) {
        self.lock().failing_reads.insert(ProposalId::from_u128(id));
    }

    pub fn clear_failures(&self) {
        let mut inner = self.lock();
        inner.log_failure = None;
        inner.failing_reads.clear();
    }

    /// Delay every read for one proposal.
    pub fn delay_reads_for(&self, id: u128, delay: Duration) {
        self.lock().delays.insert(ProposalId::from_u128(id), delay);
    }

    /// Delay every read for every proposal.
    pub fn delay_all_reads(&self, delay: Duration) {
        let mut inner = self.lock();
        let ids: Vec<ProposalId> = inner.proposals.keys().copied().collect();
        for id in ids {
            inner.delays.insert(id, delay);
        }
    }

    pub fn clear_delays(&self) {
        self.lock().delays.clear();
    }

    /// Push a notification to every open subscription.
    pub fn emit(&self, event: GovernanceEvent, id: Option<u128>) {
        let block = {
            let mut inner = self.lock();
            inner.block += 1;
            BlockNumber::new(inner.block)
        };
        let _ = self.notifications.send(LedgerNotification::new(
            event,
            id.map(ProposalId::from_u128),
            block,
        ));
    }

    pub fn subscriber_count(&self) -> usize {
        self.notifications.receiver_count()
    }

    pub fn call_counts(&self) -> CallCounts {
        self.lock().calls
    }

    /// Shared preamble of every per-proposal read: count, delay, fail.
    async fn read<T>(
        &self,
        id: ProposalId,
        count: impl FnOnce(&mut CallCounts),
        read: impl FnOnce(&NullProposal) -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        let delay = {
            let mut inner = self.lock();
            count(&mut inner.calls);
            inner.delays.get(&id).copied()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let inner = self.lock();
        let proposal = inner
            .proposals
            .get(&id)
            .ok_or_else(|| LedgerError::Reverted(format!("unknown proposal id {id}")))?;
        read(proposal)
    }

    fn check_reads(&self, id: ProposalId) -> Result<(), LedgerError> {
        if self.lock().failing_reads.contains(&id) {
            return Err(LedgerError::Transport(format!("connection reset reading {id}")));
        }
        Ok(())
    }
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GovernanceLedger for NullLedger {
    async fn query_logs(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, LedgerError> {
        let mut inner = self.lock();
        inner.calls.log_queries += 1;
        if let Some(err) = inner.log_failure.clone() {
            return Err(err);
        }
        Ok(inner
            .logs
            .iter()
            .filter(|entry| entry.event == filter.event)
            .cloned()
            .collect())
    }

    async fn proposal_votes(&self, id: ProposalId) -> Result<ProposalVotes, LedgerError> {
        self.check_reads(id)?;
        self.read(id, |c| c.votes += 1, |p| Ok(p.votes)).await
    }

    async fn proposal_state(&self, id: ProposalId) -> Result<ProposalState, LedgerError> {
        self.check_reads(id)?;
        self.read(id, |c| c.state += 1, |p| Ok(p.state)).await
    }

    async fn proposal_snapshot(&self, id: ProposalId) -> Result<BlockNumber, LedgerError> {
        self.check_reads(id)?;
        self.read(id, |c| c.snapshot += 1, |p| Ok(p.snapshot)).await
    }

    async fn proposal_deadline(&self, id: ProposalId) -> Result<BlockNumber, LedgerError> {
        self.check_reads(id)?;
        self.read(id, |c| c.deadline += 1, |p| Ok(p.deadline)).await
    }

    async fn proposal_metadata(&self, id: ProposalId) -> Result<RawProposalMetadata, LedgerError> {
        self.read(
            id,
            |c| c.metadata += 1,
            |p| {
                p.metadata
                    .clone()
                    .ok_or_else(|| LedgerError::Reverted("metadata not set".to_string()))
            },
        )
        .await
    }

    async fn subscribe(&self) -> Result<broadcast::Receiver<LedgerNotification>, LedgerError> {
        Ok(self.notifications.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn logs_follow_creation_order() {
        let ledger = NullLedger::with_proposals([
            NullProposal::new(1, "first"),
            NullProposal::new(2, "second"),
        ]);
        let logs = ledger
            .query_logs(&LogFilter::full_history(GovernanceEvent::ProposalCreated))
            .await
            .unwrap();
        let ids: Vec<ProposalId> = logs.iter().map(|l| l.proposal_id).collect();
        assert_eq!(ids, vec![ProposalId::from_u128(1), ProposalId::from_u128(2)]);
        assert!(logs[0].block_number < logs[1].block_number);
    }

    #[tokio::test]
    async fn other_event_kinds_are_filtered_out() {
        let ledger = NullLedger::with_proposals([NullProposal::new(1, "first")]);
        let logs = ledger
            .query_logs(&LogFilter::full_history(GovernanceEvent::VoteCast))
            .await
            .unwrap();
        assert!(logs.is_empty());
    }

    #[tokio::test]
    async fn missing_metadata_reverts() {
        let ledger = NullLedger::with_proposals([NullProposal::new(1, "first")]);
        let err = ledger
            .proposal_metadata(ProposalId::from_u128(1))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Reverted(_)));
    }

    #[tokio::test]
    async fn injected_failures_hit_reads_but_not_metadata_counting() {
        let ledger = NullLedger::with_proposals([NullProposal::new(1, "first")]);
        ledger.fail_reads_for(1);
        assert!(ledger.proposal_state(ProposalId::from_u128(1)).await.is_err());
        ledger.clear_failures();
        assert_eq!(
            ledger.proposal_state(ProposalId::from_u128(1)).await.unwrap(),
            ProposalState::Pending
        );
        assert_eq!(ledger.call_counts().state, 1);
    }

    #[tokio::test]
    async fn emit_reaches_subscribers() {
        let ledger = NullLedger::new();
        let mut rx = ledger.subscribe().await.unwrap();
        assert_eq!(ledger.subscriber_count(), 1);
        ledger.emit(GovernanceEvent::VoteCast, Some(9));
        let n = rx.recv().await.unwrap();
        assert_eq!(n.event, GovernanceEvent::VoteCast);
        assert_eq!(n.proposal_id, Some(ProposalId::from_u128(9)));
    }
}
