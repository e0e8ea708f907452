//! Columnar table produced by normalization
//!
//! A `Table` is an ordered list of uniquely named columns whose cells are
//! aligned by row index. Rows carry no identity beyond their position.

use serde_json::{Map, Value};

/// One named column of cells
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Value>) -> Self {
        Column {
            name: name.into(),
            cells,
        }
    }

    /// A column of `len` nulls
    pub fn nulls(name: impl Into<String>, len: usize) -> Self {
        Column::new(name, vec![Value::Null; len])
    }
}

/// A flat, rectangular table of JSON cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    num_rows: usize,
}

impl Table {
    pub fn new() -> Self {
        Table::default()
    }

    /// A table with rows but no columns yet, e.g. records that were all `{}`
    pub fn with_rows(num_rows: usize) -> Self {
        Table {
            columns: Vec::new(),
            num_rows,
        }
    }

    /// Build a table from columns of equal length.
    ///
    /// Returns `None` if the lengths differ or a name repeats.
    pub fn from_columns(columns: Vec<Column>) -> Option<Self> {
        let num_rows = columns.first().map_or(0, |c| c.cells.len());
        if columns.iter().any(|c| c.cells.len() != num_rows) {
            return None;
        }
        for (idx, column) in columns.iter().enumerate() {
            if columns[..idx].iter().any(|c| c.name == column.name) {
                return None;
            }
        }
        Some(Table { columns, num_rows })
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Cell at `row` in column `name`
    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        self.column(name).and_then(|c| c.cells.get(row))
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub(crate) fn columns_mut(&mut self) -> &mut Vec<Column> {
        &mut self.columns
    }

    /// Get the named column, appending an all-null one if it does not exist
    pub(crate) fn column_or_insert(&mut self, name: &str) -> &mut Column {
        let idx = match self.position(name) {
            Some(idx) => idx,
            None => {
                self.columns.push(Column::nulls(name, self.num_rows));
                self.columns.len() - 1
            }
        };
        &mut self.columns[idx]
    }

    /// Remove and return a column
    pub(crate) fn take_column(&mut self, name: &str) -> Option<Column> {
        let idx = self.position(name)?;
        Some(self.columns.remove(idx))
    }

    pub(crate) fn set_num_rows(&mut self, num_rows: usize) {
        self.num_rows = num_rows;
    }

    /// Keep only the columns for which `keep` returns true, in their current order
    pub fn retain_columns<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Column) -> bool,
    {
        self.columns.retain(|c| keep(c));
    }

    /// Drop every row whose cells are all null. Returns how many were dropped.
    pub fn drop_null_rows(&mut self) -> usize {
        let keep: Vec<bool> = (0..self.num_rows)
            .map(|row| self.columns.iter().any(|c| !c.cells[row].is_null()))
            .collect();
        let kept = keep.iter().filter(|k| **k).count();
        if kept == self.num_rows {
            return 0;
        }

        for column in &mut self.columns {
            let mut flags = keep.iter();
            column.cells.retain(|_| *flags.next().unwrap_or(&false));
        }
        let dropped = self.num_rows - kept;
        self.num_rows = kept;
        dropped
    }

    /// A single row as an ordered object, keys in column order
    pub fn row(&self, row: usize) -> Option<Map<String, Value>> {
        if row >= self.num_rows {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|c| (c.name.clone(), c.cells[row].clone()))
                .collect(),
        )
    }

    /// Iterate rows as ordered objects
    pub fn rows(&self) -> impl Iterator<Item = Map<String, Value>> + '_ {
        (0..self.num_rows).filter_map(move |row| self.row(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Table {
        Table::from_columns(vec![
            Column::new("id", vec![json!(1), json!(2), Value::Null]),
            Column::new("name", vec![json!("a"), Value::Null, Value::Null]),
        ])
        .unwrap()
    }

    #[test]
    fn test_from_columns_rejects_ragged() {
        let ragged = Table::from_columns(vec![
            Column::new("a", vec![json!(1)]),
            Column::new("b", vec![]),
        ]);
        assert!(ragged.is_none());
    }

    #[test]
    fn test_from_columns_rejects_duplicate_names() {
        let dup = Table::from_columns(vec![
            Column::new("a", vec![json!(1)]),
            Column::new("a", vec![json!(2)]),
        ]);
        assert!(dup.is_none());
    }

    #[test]
    fn test_rows_follow_column_order() {
        let table = sample();
        let first = table.row(0).unwrap();
        let keys: Vec<&String> = first.keys().collect();
        assert_eq!(keys, vec!["id", "name"]);
        assert_eq!(table.rows().count(), 3);
        assert!(table.row(3).is_none());
    }

    #[test]
    fn test_drop_null_rows() {
        let mut table = sample();
        assert_eq!(table.drop_null_rows(), 1);
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.get(1, "id"), Some(&json!(2)));
    }

    #[test]
    fn test_column_or_insert_pads_with_nulls() {
        let mut table = sample();
        let column = table.column_or_insert("extra");
        assert_eq!(column.cells, vec![Value::Null; 3]);
        assert_eq!(table.num_columns(), 3);
    }
}
