//! Fundamental types for the Agora governance client.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! proposal identifiers, contract addresses, vote amounts, block markers, timestamps,
//! and the lifecycle / category enums read from the governor contract.

pub mod address;
pub mod amount;
pub mod block;
pub mod error;
pub mod id;
pub mod state;
pub mod time;

pub use address::Address;
pub use amount::{VoteAmount, VOTE_DECIMALS};
pub use block::BlockNumber;
pub use error::TypesError;
pub use id::ProposalId;
pub use state::{ProposalAction, ProposalCategory, ProposalState};
pub use time::Timestamp;
