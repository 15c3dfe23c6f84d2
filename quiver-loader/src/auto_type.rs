use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use quiver_common::value::{DataRecord, Value};

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Infers the type of a raw text field.
///
/// Checked in order: empty text is null, `true`/`false` are booleans, then
/// numbers, then ISO 8601 dates (`YYYY`, `YYYY-MM`, `YYYY-MM-DD`, optionally
/// with a time and offset; times without an offset are read as UTC).
/// Everything else stays text.
pub fn auto_type(raw: &str) -> Value {
    let s = raw.trim();
    if s.is_empty() {
        return Value::Null;
    }
    match s {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "NaN" => return Value::Number(f64::NAN),
        "Infinity" | "+Infinity" => return Value::Number(f64::INFINITY),
        "-Infinity" => return Value::Number(f64::NEG_INFINITY),
        _ => {}
    }
    if let Some(v) = parse_number(s) {
        return Value::Number(v);
    }
    if let Some(d) = parse_iso_date(s) {
        return Value::Date(d);
    }
    Value::Text(raw.to_string())
}

/// Decimal and scientific notation only; `inf`/`nan` spellings stay text
fn parse_number(s: &str) -> Option<f64> {
    if !s.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    if s.bytes().any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E') {
        return None;
    }
    s.parse::<f64>().ok()
}

pub fn parse_iso_date(s: &str) -> Option<DateTime<Utc>> {
    if !s.starts_with(|c: char| c.is_ascii_digit() || c == '+' || c == '-') {
        return None;
    }
    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Some(d.with_timezone(&Utc));
    }
    if let Some(d) = DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
    {
        return Some(d.and_utc());
    }
    let date = match s.len() {
        10 => NaiveDate::parse_from_str(s, "%Y-%m-%d").ok(),
        7 => NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").ok(),
        _ => None,
    }?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

/// Applies [`auto_type`] to every text field of a record
pub fn auto_type_record(record: DataRecord) -> DataRecord {
    record
        .iter()
        .map(|(name, value)| {
            let typed = match value {
                Value::Text(s) => auto_type(s),
                other => other.clone(),
            };
            (name.to_string(), typed)
        })
        .collect()
}
