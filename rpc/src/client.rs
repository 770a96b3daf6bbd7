//! [`GovernanceLedger`] over an Ethereum JSON-RPC node.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use agora_ledger::{
    BlockTag, GovernanceEvent, GovernanceLedger, LedgerError, LedgerNotification, LogEntry,
    LogFilter, ProposalVotes, RawProposalMetadata,
};
use agora_types::{Address, BlockNumber, ProposalId, ProposalState};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tracing::debug;

use crate::abi::{self, Selector};
use crate::subscription::{spawn_poller, NOTIFICATION_CAPACITY};
use crate::transport::HttpTransport;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RpcLedgerOptions {
    pub request_timeout: Duration,
    /// How often the notification poller asks for new blocks.
    pub poll_interval: Duration,
}

impl Default for RpcLedgerOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(2000),
        }
    }
}

/// A log as returned by `eth_getLogs`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawLog {
    pub topics: Vec<String>,
    pub data: String,
    #[serde(default)]
    pub block_number: Option<String>,
    #[serde(default)]
    pub log_index: Option<String>,
    #[serde(default)]
    pub removed: bool,
}

impl RawLog {
    pub(crate) fn event(&self) -> Option<GovernanceEvent> {
        self.topics.first().and_then(|t| abi::event_for_topic(t))
    }

    pub(crate) fn decoded_topics(&self) -> Result<Vec<[u8; abi::WORD]>, LedgerError> {
        Ok(self
            .topics
            .iter()
            .map(|t| abi::topic_word(t))
            .collect::<Result<Vec<_>, _>>()?)
    }

    pub(crate) fn block(&self) -> Result<BlockNumber, LedgerError> {
        let quantity = self
            .block_number
            .as_deref()
            .ok_or_else(|| LedgerError::Decode("log is still pending".into()))?;
        Ok(BlockNumber::new(abi::parse_quantity(quantity)?))
    }

    fn into_entry(self, event: GovernanceEvent) -> Result<LogEntry, LedgerError> {
        let topics = self.decoded_topics()?;
        let data = abi::decode_hex(&self.data)?;
        let block_number = self.block()?;
        let log_index = match self.log_index.as_deref() {
            Some(q) => abi::parse_quantity(q)?,
            None => 0,
        };

        if event == GovernanceEvent::ProposalCreated {
            let created = abi::decode_proposal_created(&topics, &data)?;
            return Ok(LogEntry::proposal_created(
                created.proposal_id,
                created.proposer,
                created.description,
                block_number,
                log_index,
            ));
        }

        let proposal_id = abi::event_proposal_id(event, &topics, &data)
            .ok_or_else(|| LedgerError::Decode(format!("{} log without a proposal id", event.name())))?;
        Ok(LogEntry {
            event,
            proposal_id,
            block_number,
            log_index,
            proposer: None,
            description: None,
        })
    }
}

fn block_param(tag: BlockTag) -> Value {
    match tag {
        BlockTag::Number(n) => Value::String(n.to_quantity()),
        BlockTag::Latest => Value::String("latest".into()),
    }
}

/// Reads governance state from one governor contract through a JSON-RPC node.
pub struct EthRpcLedger {
    transport: HttpTransport,
    governor: Address,
    options: RpcLedgerOptions,
    notifications: Mutex<Option<broadcast::Sender<LedgerNotification>>>,
}

impl EthRpcLedger {
    pub fn new(url: impl Into<String>, governor: Address, options: RpcLedgerOptions) -> Result<Self, LedgerError> {
        Ok(Self {
            transport: HttpTransport::new(url, options.request_timeout)?,
            governor,
            options,
            notifications: Mutex::new(None),
        })
    }

    pub async fn block_number(&self) -> Result<BlockNumber, LedgerError> {
        block_number(&self.transport).await
    }

    async fn eth_call(&self, selector: Selector, id: ProposalId) -> Result<Vec<u8>, LedgerError> {
        let data: String = self
            .transport
            .call(
                "eth_call",
                json!([
                    { "to": self.governor.to_string(), "data": abi::encode_call(selector, id) },
                    "latest"
                ]),
            )
            .await?;
        Ok(abi::decode_hex(&data)?)
    }

    /// The live sender, if a poller is still feeding it.
    fn live_sender(&self) -> Option<broadcast::Sender<LedgerNotification>> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|tx| tx.receiver_count() > 0)
            .cloned()
    }
}

pub(crate) async fn block_number(transport: &HttpTransport) -> Result<BlockNumber, LedgerError> {
    let quantity: String = transport.call("eth_blockNumber", json!([])).await?;
    Ok(BlockNumber::new(abi::parse_quantity(&quantity)?))
}

pub(crate) async fn get_logs(
    transport: &HttpTransport,
    governor: Address,
    topics: Vec<&'static str>,
    from: BlockTag,
    to: BlockTag,
) -> Result<Vec<RawLog>, LedgerError> {
    transport
        .call(
            "eth_getLogs",
            json!([{
                "address": governor.to_string(),
                "fromBlock": block_param(from),
                "toBlock": block_param(to),
                "topics": [topics],
            }]),
        )
        .await
}

#[async_trait]
impl GovernanceLedger for EthRpcLedger {
    async fn query_logs(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, LedgerError> {
        let raw = get_logs(
            &self.transport,
            self.governor,
            vec![abi::event_topic(filter.event)],
            filter.from_block,
            filter.to_block,
        )
        .await?;
        debug!(event = filter.event.name(), count = raw.len(), "eth_getLogs");

        raw.into_iter()
            .filter(|log| !log.removed)
            .map(|log| log.into_entry(filter.event))
            .collect()
    }

    async fn proposal_votes(&self, id: ProposalId) -> Result<ProposalVotes, LedgerError> {
        let data = self.eth_call(abi::PROPOSAL_VOTES, id).await?;
        Ok(abi::decode_votes(&data)?)
    }

    async fn proposal_state(&self, id: ProposalId) -> Result<ProposalState, LedgerError> {
        let data = self.eth_call(abi::STATE, id).await?;
        let code = abi::decode_u8(&abi::word(&data, 0)?)?;
        Ok(ProposalState::from_code(code)?)
    }

    async fn proposal_snapshot(&self, id: ProposalId) -> Result<BlockNumber, LedgerError> {
        let data = self.eth_call(abi::PROPOSAL_SNAPSHOT, id).await?;
        Ok(BlockNumber::new(abi::decode_u64(&abi::word(&data, 0)?)?))
    }

    async fn proposal_deadline(&self, id: ProposalId) -> Result<BlockNumber, LedgerError> {
        let data = self.eth_call(abi::PROPOSAL_DEADLINE, id).await?;
        Ok(BlockNumber::new(abi::decode_u64(&abi::word(&data, 0)?)?))
    }

    async fn proposal_metadata(&self, id: ProposalId) -> Result<RawProposalMetadata, LedgerError> {
        let data = self.eth_call(abi::GET_PROPOSAL_METADATA, id).await?;
        Ok(abi::decode_metadata(&data)?)
    }

    /// Open a notification stream backed by block polling.
    ///
    /// All receivers share one poller. It starts at the current head and
    /// stops once every receiver has been dropped.
    async fn subscribe(&self) -> Result<broadcast::Receiver<LedgerNotification>, LedgerError> {
        if let Some(tx) = self.live_sender() {
            return Ok(tx.subscribe());
        }

        let head = self.block_number().await?;

        let mut slot = self.notifications.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(tx) = slot.as_ref().filter(|tx| tx.receiver_count() > 0) {
            return Ok(tx.subscribe());
        }
        let (tx, rx) = broadcast::channel(NOTIFICATION_CAPACITY);
        spawn_poller(
            self.transport.clone(),
            self.governor,
            head,
            self.options.poll_interval,
            tx.clone(),
        );
        *slot = Some(tx);
        Ok(rx)
    }
}
