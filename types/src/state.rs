//! Enums read from the governor contract: lifecycle state, category, vote support.
//!
//! The client only observes these values. Transitions, quorum and timelock
//! enforcement happen in the contract.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// Lifecycle state of a proposal, as returned by `state(uint256)`.
///
/// `Pending → Active → {Canceled | Defeated | Succeeded} → Queued → {Expired | Executed}`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalState {
    Pending,
    Active,
    Canceled,
    Defeated,
    Succeeded,
    Queued,
    Expired,
    Executed,
}

impl ProposalState {
    pub const ALL: [ProposalState; 8] = [
        Self::Pending,
        Self::Active,
        Self::Canceled,
        Self::Defeated,
        Self::Succeeded,
        Self::Queued,
        Self::Expired,
        Self::Executed,
    ];

    /// Decode the contract's `uint8` state code.
    pub fn from_code(code: u8) -> Result<Self, TypesError> {
        Self::ALL
            .get(usize::from(code))
            .copied()
            .ok_or(TypesError::UnknownState(code))
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Active => "Active",
            Self::Canceled => "Canceled",
            Self::Defeated => "Defeated",
            Self::Succeeded => "Succeeded",
            Self::Queued => "Queued",
            Self::Expired => "Expired",
            Self::Executed => "Executed",
        }
    }

    /// Transactions a member may submit against a proposal in this state.
    pub fn available_actions(&self) -> &'static [ProposalAction] {
        match self {
            Self::Active => &[ProposalAction::Vote],
            Self::Succeeded => &[ProposalAction::Queue],
            Self::Queued => &[ProposalAction::Execute],
            _ => &[],
        }
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProposalState {
    type Err = TypesError;

    /// Accepts a label (case-insensitive) or the numeric code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u8>() {
            return Self::from_code(code);
        }
        Self::ALL
            .iter()
            .find(|state| state.label().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| TypesError::UnknownStateName(s.to_string()))
    }
}

/// Proposal category recorded in the governor's metadata extension.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalCategory {
    #[default]
    Finance,
    Protocol,
    Community,
    Emergency,
}

impl ProposalCategory {
    pub const ALL: [ProposalCategory; 4] = [
        Self::Finance,
        Self::Protocol,
        Self::Community,
        Self::Emergency,
    ];

    pub fn from_code(code: u8) -> Result<Self, TypesError> {
        Self::ALL
            .get(usize::from(code))
            .copied()
            .ok_or(TypesError::UnknownCategory(code))
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Finance => "Finance",
            Self::Protocol => "Protocol",
            Self::Community => "Community",
            Self::Emergency => "Emergency",
        }
    }
}

impl fmt::Display for ProposalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProposalCategory {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u8>() {
            return Self::from_code(code);
        }
        Self::ALL
            .iter()
            .find(|category| category.label().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| TypesError::UnknownCategoryName(s.to_string()))
    }
}

/// Transactions the UI may offer for a proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalAction {
    Vote,
    Queue,
    Execute,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_codes_match_governor_enum() {
        assert_eq!(ProposalState::from_code(0), Ok(ProposalState::Pending));
        assert_eq!(ProposalState::from_code(3), Ok(ProposalState::Defeated));
        assert_eq!(ProposalState::from_code(7), Ok(ProposalState::Executed));
        assert_eq!(ProposalState::from_code(8), Err(TypesError::UnknownState(8)));
        for state in ProposalState::ALL {
            assert_eq!(ProposalState::from_code(state.code()), Ok(state));
        }
    }

    #[test]
    fn state_parses_label_or_code() {
        assert_eq!("active".parse(), Ok(ProposalState::Active));
        assert_eq!("Queued".parse(), Ok(ProposalState::Queued));
        assert_eq!("5".parse(), Ok(ProposalState::Queued));
        assert!("finished".parse::<ProposalState>().is_err());
    }

    #[test]
    fn actions_follow_lifecycle() {
        assert_eq!(ProposalState::Succeeded.available_actions(), &[ProposalAction::Queue]);
        assert_eq!(ProposalState::Queued.available_actions(), &[ProposalAction::Execute]);
        assert_eq!(ProposalState::Active.available_actions(), &[ProposalAction::Vote]);
        assert!(ProposalState::Executed.available_actions().is_empty());
    }

    #[test]
    fn category_labels() {
        assert_eq!(ProposalCategory::default(), ProposalCategory::Finance);
        assert_eq!(ProposalCategory::Emergency.label(), "Emergency");
        assert_eq!(ProposalCategory::from_code(9), Err(TypesError::UnknownCategory(9)));
        assert_eq!("community".parse(), Ok(ProposalCategory::Community));
    }
}
