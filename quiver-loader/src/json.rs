use std::path::Path;

use log::{debug, warn};
use quiver_common::value::{DataRecord, Dataset, Value};

use crate::error::LoadError;

/// Converts parsed JSON into a record value, keeping nested objects as
/// nested records. Strings are kept as text.
pub fn from_json(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
        serde_json::Value::String(s) => Value::Text(s),
        serde_json::Value::Array(items) => Value::List(items.into_iter().map(from_json).collect()),
        serde_json::Value::Object(map) => Value::Record(record_from_json(map)),
    }
}

pub fn record_from_json(map: serde_json::Map<String, serde_json::Value>) -> DataRecord {
    map.into_iter().map(|(k, v)| (k, from_json(v))).collect()
}

fn kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Parses a JSON array of objects. Bare scalars are wrapped in a record under
/// `value`, the way [`Dataset::from_numbers`] does; nested arrays are skipped.
pub fn parse_json(bytes: &[u8]) -> Result<Dataset, LoadError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    let serde_json::Value::Array(items) = value else {
        return Err(LoadError::NotRecords(kind(&value)));
    };
    let mut records = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match item {
            serde_json::Value::Object(map) => records.push(record_from_json(map)),
            serde_json::Value::Array(_) => warn!("Skipping element {i}: expected an object, found an array"),
            scalar => records.push(DataRecord::new().with("value", from_json(scalar))),
        }
    }
    Ok(Dataset::new(records))
}

pub(crate) async fn read(path: &Path) -> Result<Vec<u8>, LoadError> {
    tokio::fs::read(path).await.map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub async fn try_load_json(path: impl AsRef<Path>) -> Result<Dataset, LoadError> {
    let path = path.as_ref();
    let dataset = parse_json(&read(path).await?)?;
    debug!("Loaded {} records from {}", dataset.len(), path.display());
    Ok(dataset)
}

/// Loads a JSON dataset, logging and returning `None` on failure
pub async fn load_json(path: impl AsRef<Path>) -> Option<Dataset> {
    let path = path.as_ref();
    match try_load_json(path).await {
        Ok(dataset) => Some(dataset),
        Err(err) => {
            warn!("Failed to load {}: {err}", path.display());
            None
        }
    }
}
