//! Full reconstruction passes and the generation-tracking driver around them.
//!
//! [`reconstruct`] runs one pass: read the log, fetch and aggregate every
//! proposal. [`Reconstructor`] owns the shared ledger handle and numbers each
//! pass. Starting a pass aborts the one in flight, and a pass only publishes
//! its snapshot while its generation is still the newest, so results never
//! land out of order.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use agora_ledger::{GovernanceLedger, LedgerError};
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};

use crate::aggregator::aggregate;
use crate::analytics::{summarize, AnalyticsSummary};
use crate::error::GovernanceError;
use crate::proposal::ProposalRecord;
use crate::reader::read_proposal_log;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Upper bound on per-proposal fetches in flight at once.
    pub max_concurrent_fetches: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 16,
        }
    }
}

/// One complete pass: log → fetch → aggregate. Records come back newest first.
pub async fn reconstruct<L>(
    ledger: &L,
    options: &PipelineOptions,
) -> Result<Vec<ProposalRecord>, LedgerError>
where
    L: GovernanceLedger + ?Sized,
{
    let entries = read_proposal_log(ledger).await?;
    aggregate(ledger, &entries, options.max_concurrent_fetches).await
}

/// The published result of a finished pass.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProposalSnapshot {
    pub generation: u64,
    pub proposals: Vec<ProposalRecord>,
    pub analytics: AnalyticsSummary,
}

#[derive(Default)]
struct InFlight {
    generation: u64,
    abort: Option<AbortHandle>,
}

pub struct Reconstructor {
    ledger: Arc<dyn GovernanceLedger>,
    options: PipelineOptions,
    in_flight: Mutex<InFlight>,
    snapshots: watch::Sender<Option<Arc<ProposalSnapshot>>>,
}

impl Reconstructor {
    pub fn new(ledger: Arc<dyn GovernanceLedger>, options: PipelineOptions) -> Self {
        let (snapshots, _) = watch::channel(None);
        Self {
            ledger,
            options,
            in_flight: Mutex::new(InFlight::default()),
            snapshots,
        }
    }

    fn lock(&self) -> MutexGuard<'_, InFlight> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Receiver that sees every published snapshot, newest generation only.
    pub fn snapshots(&self) -> watch::Receiver<Option<Arc<ProposalSnapshot>>> {
        self.snapshots.subscribe()
    }

    pub fn latest(&self) -> Option<Arc<ProposalSnapshot>> {
        self.snapshots.borrow().clone()
    }

    /// Generation of the most recently started pass (0 before the first).
    pub fn current_generation(&self) -> u64 {
        self.lock().generation
    }

    /// Abort the in-flight pass, if any.
    pub fn cancel_in_flight(&self) {
        if let Some(handle) = self.lock().abort.take() {
            handle.abort();
        }
    }

    /// Run a new pass, superseding any pass still in flight.
    ///
    /// Returns [`GovernanceError::Superseded`] when a newer pass started
    /// before this one could publish.
    pub async fn refresh(&self) -> Result<Arc<ProposalSnapshot>, GovernanceError> {
        let (generation, task) = self.start_pass();

        let outcome = match task.await {
            Ok(result) => result,
            Err(err) if err.is_cancelled() => {
                debug!(generation, "reconstruction pass aborted");
                return Err(GovernanceError::Superseded { generation });
            }
            Err(err) => return Err(GovernanceError::TaskFailed(err.to_string())),
        };

        let mut in_flight = self.lock();
        if in_flight.generation != generation {
            warn!(
                generation,
                latest = in_flight.generation,
                "discarding superseded reconstruction"
            );
            return Err(GovernanceError::Superseded { generation });
        }
        in_flight.abort = None;

        let proposals = outcome?;
        let analytics = summarize(&proposals);
        info!(
            generation,
            proposals = analytics.total_proposals,
            active = analytics.active_proposals,
            "reconstruction complete"
        );
        let snapshot = Arc::new(ProposalSnapshot {
            generation,
            proposals,
            analytics,
        });
        self.snapshots.send_replace(Some(snapshot.clone()));
        Ok(snapshot)
    }

    fn start_pass(&self) -> (u64, JoinHandle<Result<Vec<ProposalRecord>, LedgerError>>) {
        let ledger = self.ledger.clone();
        let options = self.options;

        let mut in_flight = self.lock();
        in_flight.generation += 1;
        let generation = in_flight.generation;
        if let Some(previous) = in_flight.abort.take() {
            debug!(generation, "aborting previous reconstruction pass");
            previous.abort();
        }
        let task = tokio::spawn(async move { reconstruct(ledger.as_ref(), &options).await });
        in_flight.abort = Some(task.abort_handle());
        (generation, task)
    }

    /// Start a pass in the background, logging its outcome.
    pub fn spawn_refresh(self: &Arc<Self>) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            match this.refresh().await {
                Ok(_) | Err(GovernanceError::Superseded { .. }) => {}
                Err(err) => warn!(%err, "reconstruction pass failed"),
            }
        })
    }

    /// Reconstruct now and again on every ledger notification until
    /// `shutdown` fires or the ledger closes the subscription.
    pub async fn watch(
        self: Arc<Self>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), GovernanceError> {
        let mut events = self.ledger.subscribe().await?;
        self.spawn_refresh();

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    info!("watch loop shutting down");
                    break;
                }
                event = events.recv() => match event {
                    Ok(notification) => {
                        debug!(
                            event = notification.event.name(),
                            block = %notification.block_number,
                            "ledger notification, refreshing"
                        );
                        self.spawn_refresh();
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "missed ledger notifications, refreshing");
                        self.spawn_refresh();
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("ledger subscription closed");
                        break;
                    }
                },
            }
        }

        self.cancel_in_flight();
        Ok(())
    }
}
