//! Build the initial table: one row per record, one column per top-level key

use crate::normalize::table::{Column, Table};
use crate::normalize::types::NormalizeConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use tracing::warn;

static DOT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.").unwrap());

/// Rewrites delimiter characters in top-level keys to the canonical separator
pub struct KeyNormalizer {
    pattern: Option<Regex>,
    separator: String,
}

impl KeyNormalizer {
    pub fn new(config: &NormalizeConfig) -> Self {
        let pattern = match config.key_delimiters.as_slice() {
            [] => None,
            ['.'] => Some(DOT_REGEX.clone()),
            chars => {
                let class: String = chars
                    .iter()
                    .map(|c| regex::escape(&c.to_string()))
                    .collect();
                match Regex::new(&format!("[{}]", class)) {
                    Ok(re) => Some(re),
                    Err(err) => {
                        warn!("invalid key delimiters {:?}, keys left as-is: {}", chars, err);
                        None
                    }
                }
            }
        };

        KeyNormalizer {
            pattern,
            separator: config.separator.clone(),
        }
    }

    pub fn normalize<'k>(&self, key: &'k str) -> Cow<'k, str> {
        match &self.pattern {
            Some(re) => re.replace_all(key, regex::NoExpand(self.separator.as_str())),
            None => Cow::Borrowed(key),
        }
    }
}

/// Load records into a table.
///
/// The column set is the union of top-level keys over all records, in
/// first-seen order. A record without a key gets a null cell.
pub fn load(records: Vec<Value>, config: &NormalizeConfig) -> Table {
    load_with_stats(records, config).0
}

/// Like [`load`], also returning how many records were not objects
pub(crate) fn load_with_stats(records: Vec<Value>, config: &NormalizeConfig) -> (Table, usize) {
    let num_rows = records.len();
    let normalizer = KeyNormalizer::new(config);
    let placeholder = placeholder_name(&records, &normalizer, config);

    let mut columns: Vec<Column> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut malformed = 0;

    let mut slot = |name: &str, columns: &mut Vec<Column>| -> usize {
        if let Some(&idx) = index.get(name) {
            return idx;
        }
        columns.push(Column::nulls(name, num_rows));
        index.insert(name.to_string(), columns.len() - 1);
        columns.len() - 1
    };

    for (row, record) in records.into_iter().enumerate() {
        match record {
            Value::Object(obj) => {
                let mut written: HashSet<usize> = HashSet::new();
                for (key, value) in obj.into_iter() {
                    let name = normalizer.normalize(&key);
                    let idx = slot(&*name, &mut columns);
                    if !written.insert(idx) {
                        warn!(
                            "record {}: key `{}` collides with another key as column `{}`, later value kept",
                            row, key, name
                        );
                    }
                    columns[idx].cells[row] = value;
                }
            }
            other => {
                malformed += 1;
                warn!("record {} is not an object, placing it under `{}`", row, placeholder);
                let idx = slot(placeholder.as_str(), &mut columns);
                columns[idx].cells[row] = other;
            }
        }
    }

    let mut table = Table::with_rows(num_rows);
    *table.columns_mut() = columns;
    (table, malformed)
}

/// The configured placeholder, or `<placeholder><sep><n>` for the smallest
/// `n` that no record key normalizes to.
fn placeholder_name(records: &[Value], normalizer: &KeyNormalizer, config: &NormalizeConfig) -> String {
    let base = config.placeholder_column.as_str();
    if records.iter().all(Value::is_object) {
        return base.to_string();
    }

    let keys: HashSet<Cow<'_, str>> = records
        .iter()
        .filter_map(Value::as_object)
        .flat_map(|obj| obj.keys())
        .map(|key| normalizer.normalize(key))
        .collect();
    if !keys.contains(base) {
        return base.to_string();
    }

    let name = (1..)
        .map(|n| format!("{}{}{}", base, config.separator, n))
        .find(|name| !keys.contains(name.as_str()))
        .unwrap_or_else(|| base.to_string());
    warn!(
        "placeholder column `{}` is also a record key, using `{}` for non-object records",
        base, name
    );
    name
}
