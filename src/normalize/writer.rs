use crate::error::Result;
use crate::normalize::table::Table;
use serde_json::{Map, Value};
use std::io::Write;

/// Writes a normalized table to any output
pub struct TableWriter<W: Write> {
    writer: W,
}

impl<W: Write> TableWriter<W> {
    pub fn new(writer: W) -> Self {
        TableWriter { writer }
    }

    /// Write one JSON object per row, keys in column order
    pub fn write_rows(&mut self, table: &Table) -> Result<()> {
        for row in table.rows() {
            let json = serde_json::to_string(&row)?;
            writeln!(self.writer, "{}", json)?;
        }
        Ok(())
    }

    /// Write the table as one object mapping each column to its cells
    pub fn write_columnar(&mut self, table: &Table) -> Result<()> {
        let columns: Map<String, Value> = table
            .columns()
            .iter()
            .map(|c| (c.name.clone(), Value::Array(c.cells.clone())))
            .collect();
        let json = serde_json::to_string(&columns)?;
        writeln!(self.writer, "{}", json)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::table::Column;
    use serde_json::json;

    fn table() -> Table {
        Table::from_columns(vec![
            Column::new("id", vec![json!(1), json!(2)]),
            Column::new("tag", vec![json!("x"), Value::Null]),
        ])
        .unwrap()
    }

    #[test]
    fn test_write_rows() {
        let mut writer = TableWriter::new(Vec::new());
        writer.write_rows(&table()).unwrap();

        let output = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines, vec![r#"{"id":1,"tag":"x"}"#, r#"{"id":2,"tag":null}"#]);
    }

    #[test]
    fn test_write_columnar() {
        let mut writer = TableWriter::new(Vec::new());
        writer.write_columnar(&table()).unwrap();

        let output = String::from_utf8(writer.into_inner()).unwrap();
        let value: Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(value, json!({"id": [1, 2], "tag": ["x", null]}));
    }
}
