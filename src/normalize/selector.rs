//! Prune columns that cannot lead to a requested target

use crate::normalize::table::Table;
use crate::normalize::types::TargetColumns;
use tracing::debug;

/// Keep only columns that are a separator-joined prefix of some target.
///
/// With no targets every column is kept. Must be re-run after each pass:
/// lifting a dict creates names that can match deeper prefixes.
pub fn select(table: &mut Table, targets: Option<&TargetColumns>, separator: &str) {
    let Some(targets) = targets.filter(|t| !t.is_empty()) else {
        return;
    };

    let required = targets.prefixes(separator);
    table.retain_columns(|column| {
        let keep = required.contains(&column.name);
        debug!(
            column = %column.name,
            "{} - {}",
            column.name,
            if keep { "Keep" } else { "Remove" }
        );
        keep
    });
}
