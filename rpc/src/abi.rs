//! Just enough Solidity ABI for the governor's views and events.
//!
//! Calls take a single `uint256` argument. Return data and log data are
//! sequences of 32-byte words; dynamic `string` values are an offset word
//! pointing at a length word followed by the padded bytes.

use agora_ledger::{GovernanceEvent, ProposalVotes, RawProposalMetadata};
use agora_types::{Address, BlockNumber, ProposalId, VoteAmount};

use crate::error::AbiError;

pub const WORD: usize = 32;

pub type Selector = [u8; 4];

pub const STATE: Selector = [0x3e, 0x4f, 0x49, 0xe6];
pub const PROPOSAL_VOTES: Selector = [0x54, 0x4f, 0xfc, 0x9c];
pub const PROPOSAL_SNAPSHOT: Selector = [0x2d, 0x63, 0xf6, 0x93];
pub const PROPOSAL_DEADLINE: Selector = [0xc0, 0x1f, 0x9e, 0x37];
pub const GET_PROPOSAL_METADATA: Selector = [0xeb, 0x9b, 0x98, 0x38];

/// `topic0` of each governor event (keccak256 of the canonical signature).
pub fn event_topic(event: GovernanceEvent) -> &'static str {
    match event {
        // ProposalCreated(uint256,address,address[],uint256[],string[],bytes[],uint256,uint256,string)
        GovernanceEvent::ProposalCreated => {
            "0x7d84a6263ae0d98d3329bd7b46bb4e8d6f98cd35a7adb45c274c8b7fd5ebd5e0"
        }
        // VoteCast(address,uint256,uint8,uint256,string)
        GovernanceEvent::VoteCast => {
            "0xb8e138887d0aa13bab447e82de9d5c1777041ecd21ca36ba824ff1e6c07ddda4"
        }
        GovernanceEvent::ProposalQueued => {
            "0x3358bd34aca93e3ad9a243de48c96b8a820ec804097b77ee85179c1bcdfe9e9f"
        }
        GovernanceEvent::ProposalExecuted => {
            "0x712ae1383f79ac853f8d882153778e0260ef8f03b504e2866e0593e04d2b291f"
        }
        GovernanceEvent::ProposalCanceled => {
            "0x789cf55be980739dad1d0699b93b58e806b51c9d96619bfa8fe0a28abaa7b30c"
        }
        // ProposalCanceledByGuardian(uint256,address,string)
        GovernanceEvent::ProposalCanceledByGuardian => {
            "0x414976aef5354366ced1b5ba946f57ec26c6e4a79bc1ae455a05e59fdfa24d99"
        }
        // ProposalMetadataSet(uint256,string,string,string,uint8)
        GovernanceEvent::ProposalMetadataSet => {
            "0xf2eb43222178382f9b8896cd77ad6470ecbd673c59c8d0e25b1a7972665057af"
        }
    }
}

pub fn event_for_topic(topic: &str) -> Option<GovernanceEvent> {
    GovernanceEvent::ALL
        .into_iter()
        .find(|event| event_topic(*event).eq_ignore_ascii_case(topic))
}

/// Calldata for `selector(uint256 id)` as a `0x` hex string.
pub fn encode_call(selector: Selector, id: ProposalId) -> String {
    let mut data = Vec::with_capacity(4 + WORD);
    data.extend_from_slice(&selector);
    data.extend_from_slice(id.as_be_bytes());
    format!("0x{}", hex::encode(data))
}

/// Decode `0x`-prefixed hex data.
pub fn decode_hex(data: &str) -> Result<Vec<u8>, AbiError> {
    let digits = data.strip_prefix("0x").unwrap_or(data);
    Ok(hex::decode(digits)?)
}

/// Parse a JSON-RPC quantity (`0x1a`).
pub fn parse_quantity(quantity: &str) -> Result<u64, AbiError> {
    let digits = quantity
        .strip_prefix("0x")
        .ok_or_else(|| AbiError::InvalidQuantity(quantity.to_string()))?;
    u64::from_str_radix(digits, 16).map_err(|_| AbiError::InvalidQuantity(quantity.to_string()))
}

pub fn word(data: &[u8], index: usize) -> Result<[u8; WORD], AbiError> {
    let start = index * WORD;
    data.get(start..start + WORD)
        .and_then(|slice| slice.try_into().ok())
        .ok_or(AbiError::ShortData {
            needed: start + WORD,
            got: data.len(),
        })
}

/// Decode a 32-byte topic (`0x` + 64 hex digits).
pub fn topic_word(topic: &str) -> Result<[u8; WORD], AbiError> {
    let bytes = decode_hex(topic)?;
    word(&bytes, 0)
}

fn high_bytes_zero(word: &[u8; WORD], keep: usize) -> bool {
    word[..WORD - keep].iter().all(|&b| b == 0)
}

pub fn decode_u128(word: &[u8; WORD]) -> Result<u128, AbiError> {
    if !high_bytes_zero(word, 16) {
        return Err(AbiError::Overflow("u128"));
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&word[16..]);
    Ok(u128::from_be_bytes(low))
}

pub fn decode_u64(word: &[u8; WORD]) -> Result<u64, AbiError> {
    if !high_bytes_zero(word, 8) {
        return Err(AbiError::Overflow("u64"));
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&word[24..]);
    Ok(u64::from_be_bytes(low))
}

pub fn decode_u8(word: &[u8; WORD]) -> Result<u8, AbiError> {
    if !high_bytes_zero(word, 1) {
        return Err(AbiError::Overflow("u8"));
    }
    Ok(word[WORD - 1])
}

pub fn decode_bool(word: &[u8; WORD]) -> Result<bool, AbiError> {
    match decode_u8(word) {
        Ok(0) => Ok(false),
        Ok(1) => Ok(true),
        _ => Err(AbiError::InvalidBool),
    }
}

/// Decode the dynamic `string` whose offset sits in head word `index`.
pub fn decode_string(data: &[u8], index: usize) -> Result<String, AbiError> {
    let offset = usize::try_from(decode_u64(&word(data, index)?)?)
        .map_err(|_| AbiError::Overflow("usize"))?;
    if offset % WORD != 0 {
        return Err(AbiError::MisalignedOffset(offset));
    }
    let len_index = offset / WORD;
    let len = usize::try_from(decode_u64(&word(data, len_index)?)?)
        .map_err(|_| AbiError::Overflow("usize"))?;
    let start = offset + WORD;
    let bytes = start
        .checked_add(len)
        .and_then(|end| data.get(start..end))
        .ok_or(AbiError::ShortData {
            needed: start.saturating_add(len),
            got: data.len(),
        })?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

/// The fields of a `ProposalCreated` log the pipeline keeps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalCreated {
    pub proposal_id: ProposalId,
    pub proposer: Address,
    pub vote_start: BlockNumber,
    pub vote_end: BlockNumber,
    pub description: String,
}

/// Decode `ProposalCreated` from either layout: the stock governor puts every
/// field in the data, the extended governor indexes `proposalId` and
/// `proposer` into topics 1 and 2.
pub fn decode_proposal_created(topics: &[[u8; WORD]], data: &[u8]) -> Result<ProposalCreated, AbiError> {
    match topics {
        [_, id, proposer, ..] => Ok(ProposalCreated {
            proposal_id: ProposalId::from_be_bytes(*id),
            proposer: Address::from_word(proposer),
            vote_start: BlockNumber::new(decode_u64(&word(data, 4)?)?),
            vote_end: BlockNumber::new(decode_u64(&word(data, 5)?)?),
            description: decode_string(data, 6)?,
        }),
        [_] => Ok(ProposalCreated {
            proposal_id: ProposalId::from_be_bytes(word(data, 0)?),
            proposer: Address::from_word(&word(data, 1)?),
            vote_start: BlockNumber::new(decode_u64(&word(data, 6)?)?),
            vote_end: BlockNumber::new(decode_u64(&word(data, 7)?)?),
            description: decode_string(data, 8)?,
        }),
        _ => Err(AbiError::UnexpectedTopics(topics.len())),
    }
}

/// Best-effort proposal id for a non-creation governor event.
///
/// `VoteCast` indexes the voter, so its id is the first data word. The other
/// events carry the id either as topic 1 (when indexed) or as data word 0.
pub fn event_proposal_id(event: GovernanceEvent, topics: &[[u8; WORD]], data: &[u8]) -> Option<ProposalId> {
    let from_data = || word(data, 0).ok().map(ProposalId::from_be_bytes);
    match (event, topics) {
        (GovernanceEvent::VoteCast, _) => from_data(),
        (_, [_, id, ..]) => Some(ProposalId::from_be_bytes(*id)),
        _ => from_data(),
    }
}

/// `proposalVotes(uint256)` returns `(against, for, abstain)`.
pub fn decode_votes(data: &[u8]) -> Result<ProposalVotes, AbiError> {
    Ok(ProposalVotes {
        against: VoteAmount::new(decode_u128(&word(data, 0)?)?),
        for_votes: VoteAmount::new(decode_u128(&word(data, 1)?)?),
        abstain: VoteAmount::new(decode_u128(&word(data, 2)?)?),
    })
}

/// `getProposalMetadata(uint256)` returns
/// `(title, description, ipfsCID, category, createdAt, executed, canceled)`.
pub fn decode_metadata(data: &[u8]) -> Result<RawProposalMetadata, AbiError> {
    Ok(RawProposalMetadata {
        title: decode_string(data, 0)?,
        description: decode_string(data, 1)?,
        ipfs_cid: decode_string(data, 2)?,
        category: decode_u8(&word(data, 3)?)?,
        created_at: decode_u64(&word(data, 4)?)?,
        executed: decode_bool(&word(data, 5)?)?,
        canceled: decode_bool(&word(data, 6)?)?,
    })
}
