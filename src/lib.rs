//! # Unnest - flatten nested records into a table
//!
//! Takes records as returned by paginated REST APIs (objects holding nested
//! objects and lists) and produces one flat table whose cells are scalars.
//!
//! - lists become extra rows, one per element
//! - objects become extra columns named `<parent>_<key>`
//! - an optional list of target columns prunes everything not needed to reach them
//!
//! ## Quick Start
//!
//! ```rust
//! use unnest::{normalize, TargetColumns};
//! use serde_json::json;
//!
//! let records = vec![
//!     json!({"id": 1, "meta": {"a": 5, "b": 6}, "tags": ["x", "y"]}),
//! ];
//!
//! let (table, _report) = normalize(records.clone(), None);
//! assert_eq!(table.num_rows(), 2);
//! assert_eq!(table.column_names(), vec!["id", "tags", "meta_a", "meta_b"]);
//!
//! let targets = TargetColumns::new(["id", "meta_a", "missing"]);
//! let (table, report) = normalize(records, Some(&targets));
//! assert_eq!(table.column_names(), vec!["id", "meta_a"]);
//! assert_eq!(report.unmatched_targets, vec!["missing"]);
//! ```

use serde_json::Value;
use std::io::{Read, Write};

pub mod error;
pub mod normalize;
pub mod source;

// Re-export commonly used types for convenience
pub use error::{Error, Result};
pub use normalize::{
    normalize, Column, NormalizeConfig, NormalizeReport, Normalizer, Shape, Table, TableWriter,
    TargetColumns,
};
pub use source::{backfill_missing_ids, JsonSource, NdjsonSource, RecordSource};

/// Main entry point: read records, normalize them and write one JSON object per row
pub fn unnest_json<R: Read, W: Write>(
    reader: R,
    writer: W,
    targets: Option<&TargetColumns>,
    config: NormalizeConfig,
) -> Result<NormalizeReport> {
    let records: Vec<Value> = JsonSource::new(reader).records()?;
    let (table, report) = Normalizer::new(config).normalize(records, targets);

    let mut writer = TableWriter::new(writer);
    writer.write_rows(&table)?;
    writer.flush()?;

    Ok(report)
}
