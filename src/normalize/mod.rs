//! Record normalization - flatten nested records into a single table
//!
//! Records are loaded into a columnar [`Table`], then the driver repeats
//! three steps until nothing nested is left:
//!
//! 1. prune columns that cannot reach a requested target
//! 2. classify the remaining columns as scalar, list-valued or dict-valued
//! 3. explode list columns into rows and lift dict columns into `<parent>_<key>` columns

pub mod types;
pub mod table;
pub mod loader;
pub mod selector;
pub mod classifier;
pub mod expander;
pub mod driver;
pub mod writer;

pub use types::{Classification, NormalizeConfig, NormalizeReport, Shape, TargetColumns};
pub use table::{Column, Table};
pub use loader::{load, KeyNormalizer};
pub use selector::select;
pub use classifier::{classify, column_shape};
pub use expander::{expand_dict, expand_list};
pub use driver::{normalize, Normalizer};
pub use writer::TableWriter;
