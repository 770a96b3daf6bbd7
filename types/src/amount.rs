//! Vote amount type.
//!
//! Vote tallies are weighted by governance-token balance and arrive as
//! fixed-point integers with 18 decimals. They are kept as raw integers and
//! only converted to a human-scaled decimal string for display.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of decimal places in the governance token's fixed-point encoding.
pub const VOTE_DECIMALS: u32 = 18;

const RAW_PER_TOKEN: u128 = 1_000_000_000_000_000_000;

/// A vote weight in raw token units (1 token = 10^18 raw).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VoteAmount(u128);

impl VoteAmount {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// Whole tokens, scaled to raw units.
    pub fn from_tokens(tokens: u128) -> Self {
        Self(tokens.saturating_mul(RAW_PER_TOKEN))
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    /// Human-scaled decimal string: at least one fractional digit, trailing
    /// zeros trimmed (`"10.0"`, `"0.5"`, `"1.000000000000000001"`).
    pub fn to_decimal_string(&self) -> String {
        let whole = self.0 / RAW_PER_TOKEN;
        let frac = self.0 % RAW_PER_TOKEN;
        let mut frac_digits = format!("{:0width$}", frac, width = VOTE_DECIMALS as usize);
        while frac_digits.len() > 1 && frac_digits.ends_with('0') {
            frac_digits.pop();
        }
        format!("{whole}.{frac_digits}")
    }

    /// Floating-point approximation in whole tokens. Display only.
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / RAW_PER_TOKEN as f64
    }
}

impl fmt::Display for VoteAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}
