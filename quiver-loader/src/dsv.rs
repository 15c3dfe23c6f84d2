use std::fmt::{Debug, Formatter};
use std::path::Path;
use std::sync::Arc;

use log::{debug, warn};
use quiver_common::value::{DataRecord, Dataset, Value};

use crate::auto_type::auto_type;
use crate::error::LoadError;
use crate::json::read;

/// Called with each parsed row, its index and the header columns. Returning
/// `None` drops the row.
pub type RowMapper = Arc<dyn Fn(DataRecord, usize, &[String]) -> Option<DataRecord> + Send + Sync>;

#[derive(Clone)]
pub struct CsvOptions {
    pub delimiter: u8,
    /// Infer numbers, booleans and dates instead of keeping every field as text
    pub auto_type: bool,
    pub row: Option<RowMapper>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            auto_type: true,
            row: None,
        }
    }
}

impl Debug for CsvOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvOptions")
            .field("delimiter", &(self.delimiter as char))
            .field("auto_type", &self.auto_type)
            .field("row", &self.row.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl CsvOptions {
    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            ..Default::default()
        }
    }

    pub fn with_row(
        mut self,
        row: impl Fn(DataRecord, usize, &[String]) -> Option<DataRecord> + Send + Sync + 'static,
    ) -> Self {
        self.row = Some(Arc::new(row));
        self
    }

    pub fn raw(mut self) -> Self {
        self.auto_type = false;
        self
    }
}

/// Parses delimited text with a header row. Short rows get empty fields and
/// the header order is kept as the dataset's columns.
pub fn parse_csv(bytes: &[u8], options: &CsvOptions) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .flexible(true)
        .from_reader(bytes);
    let columns: Vec<String> = reader.headers()?.iter().map(String::from).collect();

    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row?;
        let record: DataRecord = columns
            .iter()
            .enumerate()
            .map(|(j, column)| {
                let raw = row.get(j).unwrap_or("");
                let value = if options.auto_type {
                    auto_type(raw)
                } else {
                    Value::Text(raw.to_string())
                };
                (column.clone(), value)
            })
            .collect();
        if row.len() > columns.len() {
            debug!("Row {i} has {} extra fields, ignoring them", row.len() - columns.len());
        }
        let mapped = match &options.row {
            Some(row_fn) => row_fn(record, i, &columns),
            None => Some(record),
        };
        if let Some(record) = mapped {
            records.push(record);
        }
    }
    Ok(Dataset::with_columns(records, columns))
}

pub async fn try_load_csv(path: impl AsRef<Path>, options: &CsvOptions) -> Result<Dataset, LoadError> {
    let path = path.as_ref();
    let dataset = parse_csv(&read(path).await?, options)?;
    debug!(
        "Loaded {} rows with columns {:?} from {}",
        dataset.len(),
        dataset.columns(),
        path.display()
    );
    Ok(dataset)
}

/// Loads a delimited dataset, logging and returning `None` on failure
pub async fn load_csv(path: impl AsRef<Path>, options: &CsvOptions) -> Option<Dataset> {
    let path = path.as_ref();
    match try_load_csv(path, options).await {
        Ok(dataset) => Some(dataset),
        Err(err) => {
            warn!("Failed to load {}: {err}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const PRICES: &str = "date,close\n2007-04-23,93.24\n2007-04-24,95.35\n2007-04-25,\n";

    #[test]
    fn test_auto_typed_rows() {
        let data = parse_csv(PRICES.as_bytes(), &CsvOptions::default()).unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data.columns(), &["date".to_string(), "close".to_string()]);
        assert_eq!(
            data[0].date("date"),
            Some(Utc.with_ymd_and_hms(2007, 4, 23, 0, 0, 0).unwrap())
        );
        assert_eq!(data[1].number("close"), Some(95.35));
        assert_eq!(data[2].get("close"), Some(&Value::Null));
    }

    #[test]
    fn test_raw_rows() {
        let data = parse_csv(PRICES.as_bytes(), &CsvOptions::default().raw()).unwrap();
        assert_eq!(data[0].text("close"), Some("93.24"));
        assert_eq!(data[2].text("close"), Some(""));
    }

    #[test]
    fn test_row_mapper_sees_columns() {
        let input = "name,a,b\nX,1,2\nY,3,\nZ,5,6,7\n";
        let options = CsvOptions::default().with_row(|record, i, columns| {
            if i == 1 {
                return None;
            }
            let total: f64 = columns.iter().filter_map(|c| record.number(c)).sum();
            Some(record.with("total", total))
        });
        let data = parse_csv(input.as_bytes(), &options).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].number("total"), Some(3.0));
        assert_eq!(data[1].number("total"), Some(11.0));
        assert_eq!(data.columns().len(), 3);
    }

    #[test]
    fn test_tsv() {
        let data = parse_csv(b"k\tv\na\t1\n", &CsvOptions::tsv()).unwrap();
        assert_eq!(data[0].number("v"), Some(1.0));
    }
}
