//! Decide which columns still hold lists or objects

use crate::normalize::table::{Column, Table};
use crate::normalize::types::{Classification, Shape, TargetColumns};
use serde_json::Value;

/// Shape of a single column, scanning every row.
///
/// Any list makes the column list-valued, otherwise any object makes it
/// dict-valued. Nulls and scalars are ignored.
pub fn column_shape(column: &Column) -> Shape {
    let mut shape = Shape::Scalar;
    for cell in &column.cells {
        match cell {
            Value::Array(_) => return Shape::ListValued,
            Value::Object(_) => shape = Shape::DictValued,
            _ => {}
        }
    }
    shape
}

/// Classify the table's current columns, keeping the table's column order.
///
/// Scalar columns are left out. A column whose name is exactly a target is
/// never lifted as a dict, so a target can ask for a raw object; lists are
/// still exploded. Without targets everything nested is classified.
pub fn classify(table: &Table, targets: Option<&TargetColumns>) -> Classification {
    let targets = targets.filter(|t| !t.is_empty());

    table
        .columns()
        .iter()
        .filter_map(|column| match column_shape(column) {
            Shape::Scalar => None,
            Shape::DictValued if targets.is_some_and(|t| t.contains(&column.name)) => None,
            shape => Some((column.name.clone(), shape)),
        })
        .collect()
}
