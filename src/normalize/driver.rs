//! Fixed-point driver: select, classify, expand, repeat
//!
//! Each pass prunes columns toward the targets, classifies what is left and
//! expands every nested column once. Lifting an object turns its values into
//! columns one level shallower, and exploding a list only moves elements up a
//! level, so the nesting depth along every column lineage drops by one per
//! pass. The driver therefore stops after at most `d` expanding passes for
//! input nested `d` levels deep.

use crate::normalize::classifier::classify;
use crate::normalize::expander::{expand_dict, expand_list};
use crate::normalize::loader::load_with_stats;
use crate::normalize::selector::select;
use crate::normalize::table::Table;
use crate::normalize::types::{NormalizeConfig, NormalizeReport, Shape, TargetColumns};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Turns nested records into a flat table
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizeConfig,
}

impl Normalizer {
    pub fn new(config: NormalizeConfig) -> Self {
        Normalizer { config }
    }

    pub fn config(&self) -> &NormalizeConfig {
        &self.config
    }

    /// Normalize records into a table.
    ///
    /// With `targets`, only columns on the way to a target survive and
    /// targets that never appear are listed in the report. Never fails.
    pub fn normalize(
        &self,
        records: Vec<Value>,
        targets: Option<&TargetColumns>,
    ) -> (Table, NormalizeReport) {
        let (mut table, malformed) = load_with_stats(records, &self.config);
        let mut report = NormalizeReport {
            malformed_records: malformed,
            ..NormalizeReport::default()
        };

        self.run_to_fixed_point(&mut table, targets, &mut report);

        if self.config.drop_null_rows {
            let dropped = table.drop_null_rows();
            if dropped > 0 {
                debug!(dropped, "dropped all-null rows");
            }
        }

        report.unmatched_targets = unmatched_targets(&table, targets);
        if !report.unmatched_targets.is_empty() {
            info!(
                "Columns not found in the object: {}",
                report.unmatched_targets.join(", ")
            );
        }

        (table, report)
    }

    /// Expand an already loaded table in place until nothing nested remains
    pub fn flatten(&self, table: &mut Table, targets: Option<&TargetColumns>) -> NormalizeReport {
        let mut report = NormalizeReport::default();
        self.run_to_fixed_point(table, targets, &mut report);
        report.unmatched_targets = unmatched_targets(table, targets);
        report
    }

    fn run_to_fixed_point(
        &self,
        table: &mut Table,
        targets: Option<&TargetColumns>,
        report: &mut NormalizeReport,
    ) {
        let separator = self.config.separator.as_str();

        loop {
            select(table, targets, separator);
            let shapes = classify(table, targets);
            if shapes.is_empty() {
                break;
            }

            if let Some(max_depth) = self.config.max_depth {
                if report.passes >= max_depth {
                    warn!(
                        max_depth,
                        remaining = shapes.len(),
                        "stopping before the fixed point, nested columns left as-is"
                    );
                    report.truncated = true;
                    break;
                }
            }

            // Lists first: a dict inside a list element only becomes a
            // column value once its row has been exploded.
            let lists = shapes.iter().filter(|(_, s)| *s == Shape::ListValued);
            let dicts = shapes.iter().filter(|(_, s)| *s == Shape::DictValued);

            for (column, _) in lists {
                debug!("Splitting {} into separate rows", column);
                report.degraded_cells += expand_list(table, column);
            }
            for (column, _) in dicts {
                debug!("Splitting {} into separate columns", column);
                report.degraded_cells += expand_dict(table, column, separator);
            }

            report.passes += 1;
            debug!(
                pass = report.passes,
                rows = table.num_rows(),
                columns = table.num_columns(),
                "pass complete"
            );
        }
    }
}

/// Normalize with the default configuration
pub fn normalize(records: Vec<Value>, targets: Option<&TargetColumns>) -> (Table, NormalizeReport) {
    Normalizer::default().normalize(records, targets)
}

fn unmatched_targets(table: &Table, targets: Option<&TargetColumns>) -> Vec<String> {
    targets
        .map(|t| {
            t.iter()
                .filter(|name| !table.contains_column(name))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
