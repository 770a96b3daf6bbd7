//! Nullable infrastructure for deterministic testing.
//!
//! The ledger is the only external dependency of the proposal pipeline, and
//! it sits behind the `GovernanceLedger` trait. This crate provides an
//! in-memory implementation that:
//! - Returns deterministic values configured by the test
//! - Can inject latency, read failures and notification events on demand
//! - Never touches the network
//!
//! Usage: swap the JSON-RPC ledger for a [`NullLedger`] in tests.

pub mod ledger;

pub use ledger::{CallCounts, NullLedger, NullProposal};
