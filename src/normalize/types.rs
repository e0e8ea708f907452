use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What the driver still has to do with a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    /// Only scalars or nulls; nothing left to do
    Scalar,
    /// At least one cell holds a list, so rows must be exploded
    ListValued,
    /// At least one cell holds an object, so keys must be lifted into columns
    DictValued,
}

/// Shapes of the columns that still need expanding, in table column order.
///
/// Scalar columns are never stored here.
pub type Classification = Vec<(String, Shape)>;

/// The final column names a caller asked for.
///
/// Duplicates are dropped while the first-seen order is kept, which is the
/// order unmatched names are reported in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetColumns {
    names: Vec<String>,
}

impl TargetColumns {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let names = names
            .into_iter()
            .map(Into::into)
            .filter(|name: &String| seen.insert(name.clone()))
            .collect();
        TargetColumns { names }
    }

    /// Parse a comma separated list such as `id,meta_a,tags`
    pub fn parse_list(list: &str) -> Self {
        Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty()),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Every separator-joined prefix of every target, e.g. `a_b_c` yields
    /// `a`, `a_b` and `a_b_c`.
    pub fn prefixes(&self, separator: &str) -> HashSet<String> {
        let mut prefixes = HashSet::new();
        for name in &self.names {
            let segments: Vec<&str> = name.split(separator).collect();
            for len in 1..=segments.len() {
                prefixes.insert(segments[..len].join(separator));
            }
        }
        prefixes
    }
}

impl<S: Into<String>> FromIterator<S> for TargetColumns {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        TargetColumns::new(iter)
    }
}

/// Configuration for the normalization process
#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    /// Separator joining parent and child column names
    pub separator: String,

    /// Characters in top-level record keys that are rewritten to `separator`
    pub key_delimiters: Vec<char>,

    /// Column that receives a top-level record which is not an object
    pub placeholder_column: String,

    /// Maximum number of expansion passes (None = run to the fixed point)
    pub max_depth: Option<usize>,

    /// Drop rows whose cells are all null once expansion is finished
    pub drop_null_rows: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        NormalizeConfig {
            separator: String::from("_"),
            key_delimiters: vec!['.'],
            placeholder_column: String::from("value"),
            max_depth: None,
            drop_null_rows: false,
        }
    }
}

/// What happened during a normalization call, returned alongside the table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeReport {
    /// Requested target columns that never materialized, in request order
    pub unmatched_targets: Vec<String>,

    /// Number of passes that expanded at least one column
    pub passes: usize,

    /// Top-level records that were not objects
    pub malformed_records: usize,

    /// Cells treated as null because their value did not fit the column's shape
    pub degraded_cells: usize,

    /// True when `max_depth` stopped the driver before the fixed point
    pub truncated: bool,
}
