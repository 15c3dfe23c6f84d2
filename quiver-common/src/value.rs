use std::ops::Index;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// A single field value inside a [`DataRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Date(DateTime<Utc>),
    Record(DataRecord),
    List(Vec<Value>),
}

impl Value {
    /// Returns the numeric value, treating NaN as missing
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&DataRecord> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// A hashable identity for this value, used as a data-join key.
    ///
    /// Numbers are keyed by their bit pattern through `OrderedFloat` so that
    /// `-0.0` and `0.0` stay distinct, matching string coercion of keys.
    pub fn key(&self) -> ValueKey {
        match self {
            Value::Null => ValueKey::Null,
            Value::Bool(b) => ValueKey::Bool(*b),
            Value::Number(v) => ValueKey::Number(OrderedFloat(*v)),
            Value::Text(s) => ValueKey::Text(s.clone()),
            Value::Date(d) => ValueKey::Date(d.timestamp_millis()),
            Value::Record(_) | Value::List(_) => ValueKey::Text(self.to_string()),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Date(d) => write!(f, "{}", d.to_rfc3339()),
            Value::Record(r) => {
                write!(f, "{{")?;
                for (i, (k, v)) in r.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Value::List(values) => {
                write!(f, "[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Date(v)
    }
}

impl From<DataRecord> for Value {
    fn from(v: DataRecord) -> Self {
        Value::Record(v)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKey {
    Null,
    Bool(bool),
    Number(OrderedFloat<f64>),
    Text(String),
    Date(i64),
}

/// An ordered mapping from field name to value.
///
/// Field order is the order of insertion, which for loaded data is the
/// column order of the source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataRecord {
    fields: IndexMap<String, Value>,
}

impl DataRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Looks up a dotted path such as `currently.humidity` through nested records.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.fields.get(parts.next()?)?;
        for part in parts {
            current = current.as_record()?.fields.get(part)?;
        }
        Some(current)
    }

    pub fn number(&self, path: &str) -> Option<f64> {
        self.lookup(path).and_then(Value::as_number)
    }

    pub fn text(&self, path: &str) -> Option<&str> {
        self.lookup(path).and_then(Value::as_text)
    }

    pub fn date(&self, path: &str) -> Option<DateTime<Utc>> {
        self.lookup(path).and_then(Value::as_date)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Value)> for DataRecord {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// An immutable, cheaply cloneable sequence of records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Arc<Vec<DataRecord>>,
    columns: Arc<Vec<String>>,
}

impl Dataset {
    /// Builds a dataset; columns are taken from the first record.
    pub fn new(records: Vec<DataRecord>) -> Self {
        let columns = records
            .first()
            .map(|r| r.keys().map(String::from).collect())
            .unwrap_or_default();
        Self {
            records: Arc::new(records),
            columns: Arc::new(columns),
        }
    }

    pub fn with_columns(records: Vec<DataRecord>, columns: Vec<String>) -> Self {
        Self {
            records: Arc::new(records),
            columns: Arc::new(columns),
        }
    }

    /// A dataset of bare numbers, each wrapped in a record under `value`
    pub fn from_numbers(values: &[f64]) -> Self {
        Self::new(
            values
                .iter()
                .map(|v| DataRecord::new().with("value", *v))
                .collect(),
        )
    }

    pub fn records(&self) -> &[DataRecord] {
        &self.records
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn get(&self, index: usize) -> Option<&DataRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DataRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns a new dataset with records reordered; the original is untouched.
    pub fn sorted_by<F>(&self, mut compare: F) -> Self
    where
        F: FnMut(&DataRecord, &DataRecord) -> std::cmp::Ordering,
    {
        let mut records = self.records.as_ref().clone();
        records.sort_by(|a, b| compare(a, b));
        Self {
            records: Arc::new(records),
            columns: self.columns.clone(),
        }
    }
}

impl Index<usize> for Dataset {
    type Output = DataRecord;

    fn index(&self, index: usize) -> &Self::Output {
        &self.records[index]
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a DataRecord;
    type IntoIter = std::slice::Iter<'a, DataRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Accessor reading a numeric field at a dotted path.
///
/// Missing or NaN values come back as `None` so that callers skip the point.
pub fn number_field(path: &str) -> impl Fn(&DataRecord) -> Option<f64> + Clone {
    let path = path.to_string();
    move |record: &DataRecord| record.number(&path)
}

pub fn date_field(path: &str) -> impl Fn(&DataRecord) -> Option<DateTime<Utc>> + Clone {
    let path = path.to_string();
    move |record: &DataRecord| record.date(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather() -> DataRecord {
        DataRecord::new().with("time", 1.0).with(
            "currently",
            DataRecord::new()
                .with("humidity", 0.62)
                .with("apparentTemperature", 41.0)
                .with("summary", "Clear"),
        )
    }

    #[test]
    fn test_nested_lookup() {
        let record = weather();
        assert_eq!(record.number("currently.humidity"), Some(0.62));
        assert_eq!(record.text("currently.summary"), Some("Clear"));
        assert_eq!(record.number("currently.missing"), None);
        assert_eq!(record.number("time.nested"), None);
    }

    #[test]
    fn test_nan_is_missing() {
        let record = DataRecord::new().with("x", f64::NAN);
        assert_eq!(record.number("x"), None);
        assert_eq!(number_field("x")(&record), None);
    }

    #[test]
    fn test_dataset_columns_from_first_record() {
        let ds = Dataset::new(vec![weather(), weather()]);
        assert_eq!(ds.columns(), &["time".to_string(), "currently".to_string()]);
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn test_sorted_by_leaves_original() {
        let ds = Dataset::from_numbers(&[3.0, 1.0, 2.0]);
        let sorted = ds.sorted_by(|a, b| {
            a.number("value")
                .partial_cmp(&b.number("value"))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        assert_eq!(sorted[0].number("value"), Some(1.0));
        assert_eq!(ds[0].number("value"), Some(3.0));
    }

    #[test]
    fn test_value_keys() {
        assert_eq!(Value::from(1.0).key(), Value::from(1.0).key());
        assert_ne!(Value::from("1").key(), Value::from(1.0).key());
    }
}
