//! The adapter against an in-process JSON-RPC node serving canned governor data.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use agora_governance::{reconstruct, PipelineOptions};
use agora_ledger::{GovernanceEvent, GovernanceLedger, LedgerError, LogFilter};
use agora_rpc::abi::{self, event_topic, WORD};
use agora_rpc::{EthRpcLedger, RpcLedgerOptions};
use agora_types::{Address, BlockNumber, ProposalCategory, ProposalId, ProposalState};

const GOVERNOR: &str = "0x59b670e9fa9d0a427751af201d676719a970857b";
const TOKENS: u128 = 1_000_000_000_000_000_000;

fn uint(value: u128) -> [u8; WORD] {
    let mut w = [0u8; WORD];
    w[16..].copy_from_slice(&value.to_be_bytes());
    w
}

fn encode(mut head: Vec<[u8; WORD]>, strings: &[(usize, &str)]) -> String {
    let head_len = head.len() * WORD;
    let mut tail = Vec::new();
    for (slot, s) in strings {
        head[*slot] = uint((head_len + tail.len()) as u128);
        tail.extend_from_slice(&uint(s.len() as u128));
        let mut bytes = s.as_bytes().to_vec();
        bytes.resize(s.len().div_ceil(WORD) * WORD, 0);
        tail.extend_from_slice(&bytes);
    }
    let mut out = head.concat();
    out.extend_from_slice(&tail);
    format!("0x{}", hex::encode(out))
}

fn word_hex(w: [u8; WORD]) -> String {
    format!("0x{}", hex::encode(w))
}

enum Reply {
    Data(String),
    Error(i64, &'static str),
}

#[derive(Default)]
struct Chain {
    block: u64,
    logs: Vec<(u64, Value)>,
    calls: HashMap<String, Reply>,
}

struct Meta {
    title: &'static str,
    category: u8,
    created_at: u64,
}

impl Chain {
    fn push_log(&mut self, topics: Vec<String>, data: String) {
        self.block += 1;
        let log = json!({
            "address": GOVERNOR,
            "topics": topics,
            "data": data,
            "blockNumber": format!("{:#x}", self.block),
            "logIndex": "0x0",
            "removed": false,
        });
        self.logs.push((self.block, log));
    }

    fn reply(&mut self, selector: abi::Selector, id: u128, reply: Reply) {
        self.calls
            .insert(abi::encode_call(selector, ProposalId::from_u128(id)), reply);
    }

    fn propose(
        &mut self,
        id: u128,
        description: &str,
        state: ProposalState,
        votes: [u128; 3],
        window: (u64, u64),
        meta: Option<Meta>,
    ) {
        let mut head = vec![uint(id), uint(0xab)];
        head.extend([[0u8; WORD]; 4]);
        head.extend([uint(window.0.into()), uint(window.1.into()), [0u8; WORD]]);
        self.push_log(
            vec![event_topic(GovernanceEvent::ProposalCreated).to_string()],
            encode(head, &[(8, description)]),
        );

        let [for_votes, against, abstain] = votes;
        self.reply(
            abi::PROPOSAL_VOTES,
            id,
            Reply::Data(encode(
                vec![uint(against * TOKENS), uint(for_votes * TOKENS), uint(abstain * TOKENS)],
                &[],
            )),
        );
        self.reply(abi::STATE, id, Reply::Data(encode(vec![uint(state.code().into())], &[])));
        self.reply(abi::PROPOSAL_SNAPSHOT, id, Reply::Data(encode(vec![uint(window.0.into())], &[])));
        self.reply(abi::PROPOSAL_DEADLINE, id, Reply::Data(encode(vec![uint(window.1.into())], &[])));
        if let Some(meta) = meta {
            let mut head = vec![[0u8; WORD]; 3];
            head.extend([
                uint(meta.category.into()),
                uint(meta.created_at.into()),
                uint(0),
                uint(0),
            ]);
            self.reply(
                abi::GET_PROPOSAL_METADATA,
                id,
                Reply::Data(encode(head, &[(0, meta.title), (1, ""), (2, "bafy")])),
            );
        }
    }
}

type Shared = Arc<Mutex<Chain>>;

fn parse_block(value: &Value, latest: u64) -> u64 {
    match value.as_str() {
        Some("latest") | None => latest,
        Some(q) => u64::from_str_radix(q.trim_start_matches("0x"), 16).unwrap_or(0),
    }
}

async fn handle(State(chain): State<Shared>, Json(req): Json<Value>) -> Json<Value> {
    let id = req["id"].clone();
    let params = &req["params"];
    let chain = chain.lock().unwrap();

    let outcome: Result<Value, (i64, &str)> = match req["method"].as_str() {
        Some("eth_blockNumber") => Ok(json!(format!("{:#x}", chain.block))),
        Some("eth_getLogs") => {
            let filter = &params[0];
            let from = parse_block(&filter["fromBlock"], chain.block);
            let to = parse_block(&filter["toBlock"], chain.block);
            let wanted: Vec<&str> = filter["topics"][0]
                .as_array()
                .map(|a| a.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();
            let logs: Vec<Value> = chain
                .logs
                .iter()
                .filter(|(block, log)| {
                    (from..=to).contains(block)
                        && log["topics"][0]
                            .as_str()
                            .is_some_and(|t| wanted.contains(&t))
                })
                .map(|(_, log)| log.clone())
                .collect();
            Ok(Value::Array(logs))
        }
        Some("eth_call") => {
            let data = params[0]["data"].as_str().unwrap_or_default();
            match chain.calls.get(data) {
                Some(Reply::Data(d)) => Ok(json!(d)),
                Some(Reply::Error(code, msg)) => Err((*code, *msg)),
                None => Err((3, "execution reverted")),
            }
        }
        _ => Err((-32601, "method not found")),
    };

    Json(match outcome {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err((code, message)) => {
            json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code, "message": message } })
        }
    })
}

async fn start(chain: Shared) -> SocketAddr {
    let app = Router::new().route("/", post(handle)).with_state(chain);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn ledger(addr: SocketAddr, poll_interval: Duration) -> EthRpcLedger {
    EthRpcLedger::new(
        format!("http://{addr}"),
        GOVERNOR.parse::<Address>().unwrap(),
        RpcLedgerOptions {
            request_timeout: Duration::from_secs(5),
            poll_interval,
        },
    )
    .unwrap()
}

fn demo_chain() -> Shared {
    let mut chain = Chain::default();
    chain.propose(
        1,
        "Release ETH from Treasury",
        ProposalState::Executed,
        [10, 1, 0],
        (10, 30),
        Some(Meta {
            title: "Treasury release",
            category: 3,
            created_at: 1_700_000_000,
        }),
    );
    chain.propose(2, "Mint tokens", ProposalState::Active, [5, 0, 2], (40, 60), None);
    Arc::new(Mutex::new(chain))
}

#[tokio::test]
async fn reconstructs_proposals_over_json_rpc() {
    let addr = start(demo_chain()).await;
    let ledger = ledger(addr, Duration::from_secs(1));

    let records = reconstruct(&ledger, &PipelineOptions::default()).await.unwrap();
    assert_eq!(records.len(), 2);

    let newest = &records[0];
    assert_eq!(newest.id, ProposalId::from_u128(2));
    assert_eq!(newest.title, "Proposal 2");
    assert_eq!(newest.category, ProposalCategory::Finance);
    assert_eq!(newest.state, ProposalState::Active);
    assert_eq!(newest.for_votes, "5.0");
    assert_eq!(newest.abstain_votes, "2.0");
    assert!(newest.created_at.is_unknown());
    assert_eq!(newest.start, BlockNumber::new(40));
    assert_eq!(newest.end, BlockNumber::new(60));

    let oldest = &records[1];
    assert_eq!(oldest.title, "Treasury release");
    assert_eq!(oldest.description, "Release ETH from Treasury");
    assert_eq!(oldest.category, ProposalCategory::Emergency);
    assert_eq!(oldest.state, ProposalState::Executed);
    assert_eq!(oldest.against_votes, "1.0");
    assert_eq!(oldest.ipfs_cid.as_deref(), Some("bafy"));
    assert_eq!(
        oldest.proposer,
        Some(Address::from_word(&uint(0xab)))
    );
}

#[tokio::test]
async fn indexed_proposal_created_layout_is_read() {
    let mut chain = Chain::default();
    let mut head = vec![[0u8; WORD]; 4];
    head.extend([uint(3), uint(9), [0u8; WORD]]);
    chain.push_log(
        vec![
            event_topic(GovernanceEvent::ProposalCreated).to_string(),
            word_hex(uint(55)),
            word_hex(uint(0xcd)),
        ],
        encode(head, &[(6, "Indexed layout")]),
    );
    let addr = start(Arc::new(Mutex::new(chain))).await;
    let ledger = ledger(addr, Duration::from_secs(1));

    let logs = ledger
        .query_logs(&LogFilter::full_history(GovernanceEvent::ProposalCreated))
        .await
        .unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].proposal_id, ProposalId::from_u128(55));
    assert_eq!(logs[0].description.as_deref(), Some("Indexed layout"));
    assert_eq!(logs[0].block_number, BlockNumber::new(1));
}

#[tokio::test]
async fn node_errors_fail_the_pass() {
    let chain = demo_chain();
    chain
        .lock()
        .unwrap()
        .reply(abi::PROPOSAL_VOTES, 1, Reply::Error(-32000, "header not found"));
    let addr = start(chain).await;
    let ledger = ledger(addr, Duration::from_secs(1));

    let err = reconstruct(&ledger, &PipelineOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Rpc { code: -32000, .. }));
}

#[tokio::test]
async fn oversized_tally_is_a_decode_error() {
    let chain = demo_chain();
    let mut huge = [0xffu8; WORD];
    huge[0] = 0x01;
    chain.lock().unwrap().reply(
        abi::PROPOSAL_VOTES,
        2,
        Reply::Data(encode(vec![uint(0), huge, uint(0)], &[])),
    );
    let addr = start(chain).await;
    let ledger = ledger(addr, Duration::from_secs(1));

    let err = ledger
        .proposal_votes(ProposalId::from_u128(2))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Decode(_)));
}

#[tokio::test]
async fn out_of_range_state_is_rejected() {
    let chain = demo_chain();
    chain
        .lock()
        .unwrap()
        .reply(abi::STATE, 2, Reply::Data(encode(vec![uint(9)], &[])));
    let addr = start(chain).await;
    let ledger = ledger(addr, Duration::from_secs(1));

    assert!(matches!(
        ledger.proposal_state(ProposalId::from_u128(2)).await,
        Err(LedgerError::Types(_))
    ));
}

#[tokio::test]
async fn unreachable_node_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let ledger = ledger(addr, Duration::from_secs(1));

    let err = ledger
        .query_logs(&LogFilter::full_history(GovernanceEvent::ProposalCreated))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Transport(_)));
}

#[tokio::test]
async fn subscription_reports_new_events() {
    let chain = demo_chain();
    let addr = start(chain.clone()).await;
    let ledger = ledger(addr, Duration::from_millis(20));

    let mut rx = ledger.subscribe().await.unwrap();
    let mut second = ledger.subscribe().await.unwrap();

    {
        let mut c = chain.lock().unwrap();
        let voter = word_hex(uint(0xee));
        c.push_log(
            vec![event_topic(GovernanceEvent::VoteCast).to_string(), voter],
            encode(vec![uint(2), uint(1), uint(TOKENS), [0u8; WORD]], &[(3, "")]),
        );
        c.push_log(
            vec![event_topic(GovernanceEvent::ProposalQueued).to_string()],
            encode(vec![uint(1)], &[]),
        );
        c.push_log(
            vec![event_topic(GovernanceEvent::ProposalMetadataSet).to_string()],
            encode(
                vec![uint(2), [0u8; WORD], [0u8; WORD], [0u8; WORD], uint(1)],
                &[(1, "Renamed"), (2, ""), (3, "")],
            ),
        );
    }

    let first = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.event, GovernanceEvent::VoteCast);
    assert_eq!(first.proposal_id, Some(ProposalId::from_u128(2)));

    let next = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(next.event, GovernanceEvent::ProposalQueued);
    assert_eq!(next.proposal_id, Some(ProposalId::from_u128(1)));

    let metadata = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(metadata.event, GovernanceEvent::ProposalMetadataSet);
    assert_eq!(metadata.proposal_id, Some(ProposalId::from_u128(2)));

    let shared = tokio::time::timeout(Duration::from_secs(5), second.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(shared.event, GovernanceEvent::VoteCast);
}
