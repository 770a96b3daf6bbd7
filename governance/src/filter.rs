//! Filter/sort stage: a pure view over the aggregated list.

use std::cmp::Ordering;

use agora_types::{ProposalCategory, ProposalState};
use serde::{Deserialize, Serialize};

use crate::proposal::{vote_magnitude, ProposalRecord};

/// Deserializes through [`SortField::from_name`], so unknown names fall back
/// to `CreatedAt` instead of failing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "String")]
pub enum SortField {
    #[default]
    CreatedAt,
    ForVotes,
    AgainstVotes,
    Title,
}

impl SortField {
    /// Resolve a field name, falling back to `CreatedAt` for anything
    /// unrecognized.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().replace(['_', '-'], "").as_str() {
            "forvotes" => Self::ForVotes,
            "againstvotes" => Self::AgainstVotes,
            "title" => Self::Title,
            _ => Self::CreatedAt,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("asc") {
            Self::Asc
        } else {
            Self::Desc
        }
    }
}

impl From<String> for SortField {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<String> for SortOrder {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

/// User-supplied view constraints. `None` and an empty search mean no
/// constraint on that dimension.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub category: Option<ProposalCategory>,
    pub status: Option<ProposalState>,
    pub search: String,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl FilterCriteria {
    fn matches(&self, record: &ProposalRecord, needle: Option<&str>) -> bool {
        if self.category.is_some_and(|c| c != record.category) {
            return false;
        }
        if self.status.is_some_and(|s| s != record.state) {
            return false;
        }
        match needle {
            Some(needle) => {
                record.title.to_lowercase().contains(needle)
                    || record.description.to_lowercase().contains(needle)
            }
            None => true,
        }
    }
}

/// Filter `records` by `criteria`, then stable-sort the survivors.
pub fn apply_filters(records: &[ProposalRecord], criteria: &FilterCriteria) -> Vec<ProposalRecord> {
    let needle = criteria.search.to_lowercase();
    let needle = (!needle.is_empty()).then_some(needle.as_str());

    let mut view: Vec<ProposalRecord> = records
        .iter()
        .filter(|r| criteria.matches(r, needle))
        .cloned()
        .collect();

    view.sort_by(|a, b| {
        let ord = compare(a, b, criteria.sort_by);
        match criteria.sort_order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
    view
}

fn compare(a: &ProposalRecord, b: &ProposalRecord, field: SortField) -> Ordering {
    match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::ForVotes => cmp_f64(vote_magnitude(&a.for_votes), vote_magnitude(&b.for_votes)),
        SortField::AgainstVotes => cmp_f64(
            vote_magnitude(&a.against_votes),
            vote_magnitude(&b.against_votes),
        ),
        SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
    }
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
