use anyhow::{Result, bail};
use serde_json::Value;

/// One raw dataset entry and the label used to report it.
pub struct Entry<'a> {
    pub label: String,
    pub raw: &'a Value,
}

/// The dataset is either an object of records keyed by id, or an array of records.
pub fn entries(document: &Value) -> Result<Vec<Entry<'_>>> {
    let entries = match document {
        Value::Object(records) => records
            .iter()
            .map(|(key, raw)| Entry {
                label: format!("key {key:?}"),
                raw,
            })
            .collect(),
        Value::Array(records) => records
            .iter()
            .enumerate()
            .map(|(index, raw)| Entry {
                label: format!("index {index}"),
                raw,
            })
            .collect(),
        _ => bail!("Dataset must be a JSON object or array of recipes"),
    };

    Ok(entries)
}
