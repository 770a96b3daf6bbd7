//! Ethereum JSON-RPC adapter for the governance ledger interface.
//!
//! [`EthRpcLedger`] answers every [`agora_ledger::GovernanceLedger`] query
//! with `eth_getLogs` and `eth_call` against one governor contract, and
//! serves notifications by polling for new blocks.

pub mod abi;
pub mod client;
pub mod error;
pub mod subscription;
pub mod transport;

pub use client::{EthRpcLedger, RpcLedgerOptions};
pub use error::AbiError;
pub use subscription::WATCHED_EVENTS;
pub use transport::HttpTransport;
