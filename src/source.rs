//! Record sources feeding the normalizer
//!
//! The normalizer works on an in-memory `Vec<Value>`; anything that pages,
//! retries or throttles has to finish before handing records over.

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::io::{BufRead, Read};
use tracing::debug;

/// Anything that can produce a finite sequence of records
pub trait RecordSource {
    fn records(self) -> Result<Vec<Value>>;
}

impl RecordSource for Vec<Value> {
    fn records(self) -> Result<Vec<Value>> {
        Ok(self)
    }
}

/// A whole JSON document. A top-level array is a stream of records, any
/// other value is one record. Concatenated values (NDJSON included) are
/// accepted too.
///
/// Arrays are parsed in place with simd-json; everything else goes through
/// serde_json's stream deserializer. Either way the input is buffered once.
pub struct JsonSource<R: Read> {
    reader: R,
}

impl<R: Read> JsonSource<R> {
    pub fn new(reader: R) -> Self {
        JsonSource { reader }
    }
}

impl<R: Read> RecordSource for JsonSource<R> {
    fn records(mut self) -> Result<Vec<Value>> {
        let mut content = Vec::new();
        self.reader.read_to_end(&mut content)?;

        let first = content.iter().copied().find(|b| !b.is_ascii_whitespace());
        match first {
            None => Ok(Vec::new()),
            Some(b'[') => {
                let value = simd_json::serde::from_slice::<Value>(&mut content)?;
                Ok(into_records(value))
            }
            Some(_) => {
                debug!("reading input as a value stream");
                let mut records = Vec::new();
                for value in serde_json::Deserializer::from_slice(&content).into_iter::<Value>() {
                    records.extend(into_records(value?));
                }
                Ok(records)
            }
        }
    }
}

/// Newline-delimited JSON, one record per non-blank line
pub struct NdjsonSource<R: BufRead> {
    reader: R,
}

impl<R: BufRead> NdjsonSource<R> {
    pub fn new(reader: R) -> Self {
        NdjsonSource { reader }
    }
}

impl<R: BufRead> RecordSource for NdjsonSource<R> {
    fn records(self) -> Result<Vec<Value>> {
        let mut records = Vec::new();
        for (idx, line) in self.reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let value = serde_json::from_str(line).map_err(|source| Error::InvalidLine {
                line: idx + 1,
                source,
            })?;
            records.push(value);
        }
        Ok(records)
    }
}

fn into_records(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}

/// Append a stub `{id_key: "<id>"}` for every requested id no record carries.
///
/// Lookups by id often silently omit ids the API does not know; padding
/// keeps one row per requested id. Ids are compared by their string form.
pub fn backfill_missing_ids<I, S>(records: &mut Vec<Value>, requested: I, id_key: &str) -> usize
where
    I: IntoIterator<Item = S>,
    S: ToString,
{
    let received: HashSet<String> = records
        .iter()
        .filter_map(|record| record.get(id_key))
        .filter_map(id_string)
        .collect();

    let mut added = HashSet::new();
    for id in requested {
        let id = id.to_string();
        if received.contains(&id) || !added.insert(id.clone()) {
            continue;
        }
        let mut stub = Map::new();
        stub.insert(id_key.to_string(), Value::String(id));
        records.push(Value::Object(stub));
    }

    if !added.is_empty() {
        debug!(id_key, added = added.len(), "backfilled missing ids");
    }
    added.len()
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    #[test]
    fn test_json_array_is_record_stream() {
        let input = r#"[{"id": 1}, {"id": 2}]"#;
        let records = JsonSource::new(input.as_bytes()).records().unwrap();
        assert_eq!(records, vec![json!({"id": 1}), json!({"id": 2})]);
    }

    #[test]
    fn test_json_single_object() {
        let records = JsonSource::new(r#"{"id": 1}"#.as_bytes()).records().unwrap();
        assert_eq!(records, vec![json!({"id": 1})]);
    }

    #[test]
    fn test_json_concatenated_values() {
        let input = "{\"id\": 1}\n{\"id\": 2}\n";
        let records = JsonSource::new(input.as_bytes()).records().unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_json_broken_array_is_simd_error() {
        match JsonSource::new("[{\"id\": 1},".as_bytes()).records() {
            Err(Error::SimdJson(_)) => {}
            other => panic!("expected SimdJson error, got {:?}", other),
        }
    }

    #[test]
    fn test_json_blank_input() {
        let records = JsonSource::new("  \n".as_bytes()).records().unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_json_garbage_is_error() {
        assert!(JsonSource::new("{not json".as_bytes()).records().is_err());
    }

    #[test]
    fn test_ndjson_skips_blank_lines() {
        let input = Cursor::new("{\"id\": 1}\n\n{\"id\": 2}\n");
        let records = NdjsonSource::new(input).records().unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_ndjson_reports_line_number() {
        let input = Cursor::new("{\"id\": 1}\n{oops}\n");
        match NdjsonSource::new(input).records() {
            Err(Error::InvalidLine { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected InvalidLine, got {:?}", other),
        }
    }

    #[test]
    fn test_backfill_missing_ids() {
        let mut records = vec![json!({"id": "10", "name": "a"}), json!({"id": 11})];
        let added = backfill_missing_ids(&mut records, [10, 11, 12, 12], "id");

        assert_eq!(added, 1);
        assert_eq!(records.len(), 3);
        assert_eq!(records[2], json!({"id": "12"}));
    }
}
