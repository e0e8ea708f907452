//! Row explosion for list columns and key lifting for object columns
//!
//! Both expanders degrade instead of failing: a cell that does not fit the
//! column's shape is treated as null for that row and counted.

use crate::normalize::table::Table;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Explode a list column into one row per element.
///
/// Other columns are repeated for each element. An empty list, a null or a
/// non-list cell yields exactly one row with a null, so no row is dropped.
/// Rows from one source row stay contiguous and in element order.
///
/// Returns the number of cells degraded to null.
pub fn expand_list(table: &mut Table, column: &str) -> usize {
    let Some(idx) = table.position(column) else {
        return 0;
    };

    let source = std::mem::take(&mut table.columns_mut()[idx].cells);
    let mut repeats = Vec::with_capacity(source.len());
    let mut exploded = Vec::with_capacity(source.len());
    let mut degraded = 0;

    for cell in source {
        match cell {
            Value::Array(items) if !items.is_empty() => {
                repeats.push(items.len());
                exploded.extend(items);
            }
            Value::Array(_) | Value::Null => {
                repeats.push(1);
                exploded.push(Value::Null);
            }
            _ => {
                degraded += 1;
                repeats.push(1);
                exploded.push(Value::Null);
            }
        }
    }

    let num_rows = exploded.len();
    let mut exploded = Some(exploded);
    for (pos, col) in table.columns_mut().iter_mut().enumerate() {
        if pos == idx {
            col.cells = exploded.take().unwrap_or_default();
        } else {
            col.cells = repeat_cells(std::mem::take(&mut col.cells), &repeats, num_rows);
        }
    }
    table.set_num_rows(num_rows);

    if degraded > 0 {
        debug!(column, degraded, "non-list cells treated as null");
    }
    degraded
}

fn repeat_cells(cells: Vec<Value>, repeats: &[usize], total: usize) -> Vec<Value> {
    let mut out = Vec::with_capacity(total);
    for (cell, &n) in cells.into_iter().zip(repeats) {
        for _ in 1..n {
            out.push(cell.clone());
        }
        out.push(cell);
    }
    out
}

/// Lift every key of an object column into its own `<column><sep><key>` column.
///
/// Keys come from all rows, in first-seen order; a row without the key gets
/// a null. The original column is dropped and the row count is unchanged.
/// If a lifted name already exists as a column, its cells are overwritten
/// only where the lifted value is non-null.
///
/// Returns the number of cells degraded to empty objects.
pub fn expand_dict(table: &mut Table, column: &str, separator: &str) -> usize {
    let Some(source) = table.take_column(column) else {
        return 0;
    };

    let mut degraded = 0;
    let maps: Vec<Map<String, Value>> = source
        .cells
        .into_iter()
        .map(|cell| match cell {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            _ => {
                degraded += 1;
                Map::new()
            }
        })
        .collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut keys: Vec<&str> = Vec::new();
    for map in &maps {
        for key in map.keys() {
            if seen.insert(key.as_str()) {
                keys.push(key.as_str());
            }
        }
    }

    // key -> (column position, whether the column already existed)
    let mut slots: HashMap<String, (usize, bool)> = HashMap::with_capacity(keys.len());
    for key in keys {
        let name = format!("{}{}{}", column, separator, key);
        let existed = table.contains_column(&name);
        if existed {
            debug!(column = %name, "lifted key merges into existing column");
        }
        table.column_or_insert(&name);
        let pos = table.position(&name).unwrap_or_default();
        slots.insert(key.to_string(), (pos, existed));
    }

    let columns = table.columns_mut();
    for (row, map) in maps.into_iter().enumerate() {
        for (key, value) in map {
            let Some(&(pos, existed)) = slots.get(&key) else {
                continue;
            };
            if existed && value.is_null() {
                continue;
            }
            columns[pos].cells[row] = value;
        }
    }

    if degraded > 0 {
        debug!(column, degraded, "non-object cells treated as null");
    }
    degraded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::table::Column;
    use serde_json::json;

    fn table(columns: Vec<(&str, Vec<Value>)>) -> Table {
        Table::from_columns(
            columns
                .into_iter()
                .map(|(name, cells)| Column::new(name, cells))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_expand_list_row_law() {
        let mut t = table(vec![
            ("id", vec![json!(1), json!(2), json!(3), json!(4)]),
            (
                "tags",
                vec![json!(["x", "y", "z"]), json!([]), Value::Null, json!(["w"])],
            ),
        ]);
        expand_list(&mut t, "tags");

        // 3 + max(1, 0) + max(1, 0) + 1
        assert_eq!(t.num_rows(), 6);
        assert_eq!(
            t.column("id").unwrap().cells,
            vec![json!(1), json!(1), json!(1), json!(2), json!(3), json!(4)]
        );
        assert_eq!(
            t.column("tags").unwrap().cells,
            vec![
                json!("x"),
                json!("y"),
                json!("z"),
                Value::Null,
                Value::Null,
                json!("w")
            ]
        );
    }

    #[test]
    fn test_expand_list_degrades_scalars() {
        let mut t = table(vec![("tags", vec![json!("loose"), json!([1, 2])])]);
        let degraded = expand_list(&mut t, "tags");

        assert_eq!(degraded, 1);
        assert_eq!(
            t.column("tags").unwrap().cells,
            vec![Value::Null, json!(1), json!(2)]
        );
    }

    #[test]
    fn test_expand_list_missing_column_is_noop() {
        let mut t = table(vec![("id", vec![json!(1)])]);
        assert_eq!(expand_list(&mut t, "nope"), 0);
        assert_eq!(t.num_rows(), 1);
    }

    #[test]
    fn test_expand_dict_keys_from_all_rows() {
        let mut t = table(vec![
            ("id", vec![json!(1), json!(2), json!(3)]),
            (
                "meta",
                vec![json!({"a": 1}), Value::Null, json!({"b": 2, "a": 3})],
            ),
        ]);
        let degraded = expand_dict(&mut t, "meta", "_");

        assert_eq!(degraded, 0);
        assert_eq!(t.num_rows(), 3);
        assert_eq!(t.column_names(), vec!["id", "meta_a", "meta_b"]);
        assert_eq!(
            t.column("meta_a").unwrap().cells,
            vec![json!(1), Value::Null, json!(3)]
        );
        assert_eq!(
            t.column("meta_b").unwrap().cells,
            vec![Value::Null, Value::Null, json!(2)]
        );
    }

    #[test]
    fn test_expand_dict_degrades_scalars() {
        let mut t = table(vec![("meta", vec![json!({"a": 1}), json!(7)])]);
        let degraded = expand_dict(&mut t, "meta", "_");

        assert_eq!(degraded, 1);
        assert_eq!(t.column("meta_a").unwrap().cells, vec![json!(1), Value::Null]);
    }

    #[test]
    fn test_expand_dict_merges_into_existing_column() {
        let mut t = table(vec![
            ("meta_a", vec![json!("top"), json!("top")]),
            ("meta", vec![json!({"a": "nested"}), json!({"a": null})]),
        ]);
        expand_dict(&mut t, "meta", "_");

        assert_eq!(t.column_names(), vec!["meta_a"]);
        assert_eq!(
            t.column("meta_a").unwrap().cells,
            vec![json!("nested"), json!("top")]
        );
    }
}
