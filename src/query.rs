// Query/filter engine
// Filters enriched records per a user query and splits the matches into the
// list view and the map-eligible subset.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::enrich::EnrichedRecord;
use crate::normalize::is_office;

/// Reserved holder prefix marking wholesale records, which are excluded
/// from the map view. Matched against the raw holder text: the prefix is a
/// raw-data convention.
pub const WHOLESALE_PREFIX: &str = "도매-";

/// Pseudo-region selecting office records regardless of their computed
/// region bucket.
pub const OFFICE_REGION: &str = "사무실";

// ============================================================================
// SELECTION
// ============================================================================

/// One filterable dimension: everything, or an explicit value set.
///
/// Replaces the "전체" sentinel strings of the source data with a tagged
/// variant, so "all" can never collide with a real value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Selection {
    All,
    Specific(BTreeSet<String>),
}

impl Selection {
    pub fn specific<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection::Specific(values.into_iter().map(Into::into).collect())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Specific(set) => set.contains(value),
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Selection::All
    }
}

// ============================================================================
// FILTER SPEC
// ============================================================================

/// One user query. Constructed per submission, consumed once, not persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub models: Selection,
    pub colors: Selection,
    /// Matched against the normalized holder name, which is also what the
    /// owner picker displays.
    pub owners: Selection,
    pub regions: Selection,
}

// ============================================================================
// ERRORS
// ============================================================================

/// Query failures surfaced to the hosting shell.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// The query would scan the whole dataset: no model selected and no
    /// specific owner selected.
    #[error("query too broad: select at least one model, or select a specific owner")]
    UnderspecifiedQuery,

    /// No dataset has been loaded yet. Distinct from an empty result.
    #[error("no dataset loaded")]
    SourceDataUnavailable,
}

// ============================================================================
// QUERY RESULT
// ============================================================================

/// Matches of one query. `map_view` is always a subset of `list_view`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// All matches, sorted by normalized holder ascending.
    pub list_view: Vec<EnrichedRecord>,

    /// Matches minus wholesale-flagged holders.
    pub map_view: Vec<EnrichedRecord>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.list_view.is_empty()
    }

    pub fn len(&self) -> usize {
        self.list_view.len()
    }
}

// ============================================================================
// QUERY ENGINE
// ============================================================================

/// Run one filter query over enriched records.
///
/// Precondition: the query must name at least one model or a specific owner
/// set, otherwise it is rejected as underspecified. An empty match set is a
/// valid, empty result.
pub fn query(records: &[EnrichedRecord], spec: &FilterSpec) -> Result<QueryResult, QueryError> {
    if spec.models.is_all() && spec.owners.is_all() {
        return Err(QueryError::UnderspecifiedQuery);
    }

    let mut matches: Vec<EnrichedRecord> = records
        .iter()
        .filter(|r| spec.models.matches(r.model.as_deref().unwrap_or("")))
        .filter(|r| spec.colors.matches(r.color.as_deref().unwrap_or("")))
        .filter(|r| spec.owners.matches(&r.holder_normalized))
        .filter(|r| region_matches(&spec.regions, r))
        .cloned()
        .collect();

    // Stable sort keeps source order among equal holders
    matches.sort_by(|a, b| a.holder_normalized.cmp(&b.holder_normalized));

    let map_view = matches
        .iter()
        .filter(|r| !r.holder_raw.starts_with(WHOLESALE_PREFIX))
        .cloned()
        .collect();

    Ok(QueryResult {
        list_view: matches,
        map_view,
    })
}

/// Region matching with the office pseudo-region rule: selecting "사무실"
/// admits office holders regardless of their computed region, unioned with
/// any literally selected regions.
fn region_matches(selection: &Selection, record: &EnrichedRecord) -> bool {
    match selection {
        Selection::All => true,
        Selection::Specific(set) => {
            if set.contains(OFFICE_REGION) && is_office(&record.holder_normalized) {
                return true;
            }
            set.iter()
                .filter(|r| r.as_str() != OFFICE_REGION)
                .any(|r| r == &record.region)
        }
    }
}

// ============================================================================
// MODEL GROUPS
// ============================================================================

/// One display label covering several concrete model codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelGroup {
    pub label: String,
    pub members: Vec<String>,
}

/// Display-level grouping of model codes that sell as one device
/// ("SM-F766N0"/"SM-F766NK" are one phone in two carrier variants). The
/// picker shows the group label; the filter needs the member codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelGroups {
    groups: Vec<ModelGroup>,
}

const MODEL_GROUPS: &[(&str, &[&str])] = &[
    ("SM-F766 (N0/NK 통합)", &["SM-F766N0", "SM-F766NK"]),
    ("SM-S937 (N0/NK 통합)", &["SM-S937N0", "SM-S937NK"]),
];

impl ModelGroups {
    pub fn builtin() -> Self {
        ModelGroups {
            groups: MODEL_GROUPS
                .iter()
                .map(|&(label, members)| ModelGroup {
                    label: label.to_string(),
                    members: members.iter().map(|s| s.to_string()).collect(),
                })
                .collect(),
        }
    }

    /// Expand display selections (group labels or plain model codes) into
    /// the concrete model code set for a `FilterSpec`.
    pub fn expand<'a, I>(&self, selections: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut out = BTreeSet::new();
        for sel in selections {
            match self.groups.iter().find(|g| g.label == sel) {
                Some(group) => out.extend(group.members.iter().cloned()),
                None => {
                    out.insert(sel.to_string());
                }
            }
        }
        out
    }

    /// Build the picker option list for the models present in a dataset:
    /// group labels for covered models, the rest as-is, sorted.
    pub fn display_options<'a, I>(&self, raw_models: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let present: BTreeSet<&str> = raw_models.into_iter().collect();
        let mut grouped: BTreeSet<&str> = BTreeSet::new();
        let mut options = Vec::new();

        for group in &self.groups {
            if group.members.iter().any(|m| present.contains(m.as_str())) {
                options.push(group.label.clone());
                grouped.extend(group.members.iter().map(String::as_str));
            }
        }
        for model in present {
            if !grouped.contains(model) {
                options.push(model.to_string());
            }
        }

        options.sort();
        options
    }
}

impl Default for ModelGroups {
    fn default() -> Self {
        Self::builtin()
    }
}

// ============================================================================
// TESTS
// ============================================================================
