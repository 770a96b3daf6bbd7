//! Client-side reconstruction of on-chain governance state.
//!
//! Pipeline: ledger → [`reader`] → [`fetcher`] → [`aggregator`] → [`filter`] → render,
//! with [`analytics`] folding the same aggregate into summary counts.
//!
//! The governor contract owns every lifecycle transition, quorum check and
//! timelock delay. This crate only reads: each pass re-reads the whole log and
//! re-fetches every proposal, and nothing is cached between passes.
//! [`Reconstructor`] adds generation tokens so a stale pass can never
//! overwrite a newer one.

pub mod aggregator;
pub mod analytics;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod proposal;
pub mod reader;
pub mod reconstruct;

pub use aggregator::aggregate;
pub use analytics::{summarize, AnalyticsSummary};
pub use error::GovernanceError;
pub use fetcher::fetch_proposal;
pub use filter::{apply_filters, FilterCriteria, SortField, SortOrder};
pub use proposal::{vote_magnitude, ProposalMetadata, ProposalRecord};
pub use reader::read_proposal_log;
pub use reconstruct::{reconstruct, PipelineOptions, ProposalSnapshot, Reconstructor};
