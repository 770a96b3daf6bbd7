//! Block-polling notification source.
//!
//! Plain HTTP endpoints cannot push logs, so new governance events are found
//! by polling `eth_blockNumber` and fetching the logs of each new range.

use std::time::Duration;

use agora_ledger::{BlockTag, GovernanceEvent, LedgerNotification};
use agora_types::{Address, BlockNumber};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::abi;
use crate::client::{block_number, get_logs};
use crate::transport::HttpTransport;

pub(crate) const NOTIFICATION_CAPACITY: usize = 256;

/// Events that change some proposal's reconstructed view.
pub const WATCHED_EVENTS: [GovernanceEvent; 7] = [
    GovernanceEvent::ProposalCreated,
    GovernanceEvent::VoteCast,
    GovernanceEvent::ProposalQueued,
    GovernanceEvent::ProposalExecuted,
    GovernanceEvent::ProposalCanceled,
    GovernanceEvent::ProposalCanceledByGuardian,
    GovernanceEvent::ProposalMetadataSet,
];

pub(crate) fn spawn_poller(
    transport: HttpTransport,
    governor: Address,
    head: BlockNumber,
    interval: Duration,
    tx: broadcast::Sender<LedgerNotification>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(url = transport.url(), from = %head, "polling for governance events");
        let topics: Vec<&'static str> = WATCHED_EVENTS.iter().map(|e| abi::event_topic(*e)).collect();
        let mut last_seen = head;
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if tx.receiver_count() == 0 {
                debug!("no subscribers left, stopping poller");
                break;
            }

            let latest = match block_number(&transport).await {
                Ok(latest) => latest,
                Err(err) => {
                    warn!(%err, "polling eth_blockNumber failed");
                    continue;
                }
            };
            if latest <= last_seen {
                continue;
            }

            let from = BlockNumber::new(last_seen.as_u64() + 1);
            let logs = match get_logs(
                &transport,
                governor,
                topics.clone(),
                BlockTag::Number(from),
                BlockTag::Number(latest),
            )
            .await
            {
                Ok(logs) => logs,
                Err(err) => {
                    warn!(%err, %from, to = %latest, "polling eth_getLogs failed");
                    continue;
                }
            };

            for log in logs.into_iter().filter(|log| !log.removed) {
                let Some(event) = log.event() else { continue };
                let block = log.block().unwrap_or(latest);
                let proposal_id = log.decoded_topics().ok().and_then(|topics| {
                    let data = abi::decode_hex(&log.data).ok()?;
                    if event == GovernanceEvent::ProposalCreated {
                        abi::decode_proposal_created(&topics, &data)
                            .ok()
                            .map(|c| c.proposal_id)
                    } else {
                        abi::event_proposal_id(event, &topics, &data)
                    }
                });
                // A send error means every receiver is gone; the next tick exits.
                let _ = tx.send(LedgerNotification::new(event, proposal_id, block));
            }
            last_seen = latest;
        }
    })
}
