//! Block-number markers bounding a proposal's voting window.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A block height on the governed chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockNumber(u64);

impl BlockNumber {
    pub const GENESIS: Self = Self(0);

    pub fn new(height: u64) -> Self {
        Self(height)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Blocks from `self` up to `later` (saturating).
    pub fn blocks_until(&self, later: BlockNumber) -> u64 {
        later.0.saturating_sub(self.0)
    }

    /// The JSON-RPC quantity encoding (`0x`-prefixed, no leading zeros).
    pub fn to_quantity(&self) -> String {
        format!("{:#x}", self.0)
    }
}

impl fmt::Display for BlockNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for BlockNumber {
    fn from(height: u64) -> Self {
        Self(height)
    }
}
