//! Proposal identifiers.
//!
//! The governor assigns every proposal a 256-bit unsigned integer (the hash of
//! its actions and description). The client never derives ids itself; it only
//! carries them from log entries into queries and displays them in decimal.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// A 256-bit proposal identifier, stored big-endian.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProposalId([u8; 32]);

impl ProposalId {
    pub const ZERO: Self = Self([0u8; 32]);

    /// Build an id from its big-endian 32-byte representation (an ABI word).
    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn from_u128(value: u128) -> Self {
        let mut bytes = [0u8; 32];
        bytes[16..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    pub fn as_be_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Decimal rendering, the form the governor UI shows.
    pub fn to_decimal(&self) -> String {
        let mut n = self.0;
        let mut digits = Vec::new();
        while n.iter().any(|&b| b != 0) {
            let mut rem: u32 = 0;
            for byte in n.iter_mut() {
                let acc = (rem << 8) | u32::from(*byte);
                *byte = (acc / 10) as u8;
                rem = acc % 10;
            }
            digits.push(b'0' + rem as u8);
        }
        if digits.is_empty() {
            return "0".to_string();
        }
        digits.iter().rev().map(|&d| char::from(d)).collect()
    }

    fn parse_decimal(s: &str) -> Result<Self, TypesError> {
        let mut out = [0u8; 32];
        for c in s.bytes() {
            if !c.is_ascii_digit() {
                return Err(TypesError::InvalidProposalId(s.to_string()));
            }
            let mut carry = u32::from(c - b'0');
            for byte in out.iter_mut().rev() {
                let acc = u32::from(*byte) * 10 + carry;
                *byte = (acc & 0xff) as u8;
                carry = acc >> 8;
            }
            if carry != 0 {
                return Err(TypesError::ProposalIdOverflow(s.to_string()));
            }
        }
        Ok(Self(out))
    }

    fn parse_hex(digits: &str, original: &str) -> Result<Self, TypesError> {
        if digits.is_empty() || digits.len() > 64 {
            return Err(TypesError::InvalidProposalId(original.to_string()));
        }
        let padded = format!("{digits:0>64}");
        let mut out = [0u8; 32];
        hex::decode_to_slice(&padded, &mut out)
            .map_err(|_| TypesError::InvalidProposalId(original.to_string()))?;
        Ok(Self(out))
    }
}

impl FromStr for ProposalId {
    type Err = TypesError;

    /// Accepts decimal (`"42"`) or `0x`-prefixed hex (`"0x2a"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(digits) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            return Self::parse_hex(digits, s);
        }
        if s.is_empty() {
            return Err(TypesError::InvalidProposalId(s.to_string()));
        }
        Self::parse_decimal(s)
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal())
    }
}

impl fmt::Debug for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProposalId({})", self.to_decimal())
    }
}

impl From<u128> for ProposalId {
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}

impl Serialize for ProposalId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ProposalId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
