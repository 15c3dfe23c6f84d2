use std::fmt::Debug;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::time::{TimeInterval, TimeUnit};

pub trait NumberFormatter: Debug + Send + Sync + 'static {
    fn format(&self, value: f64) -> String;
}

pub trait DateFormatter: Debug + Send + Sync + 'static {
    fn format(&self, value: DateTime<Utc>) -> String;
}

/// Inserts `,` between groups of three integer digits
fn group_thousands(formatted: &str) -> String {
    let (sign, rest) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (int_part, frac_part) = match rest.find('.') {
        Some(i) => rest.split_at(i),
        None => (rest, ""),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}{grouped}{frac_part}")
}

fn trim_insignificant(formatted: &str) -> String {
    if !formatted.contains('.') {
        return formatted.to_string();
    }
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

fn fixed(value: f64, precision: usize) -> String {
    let out = format!("{value:.precision$}");
    // Avoid "-0" and "-0.00"
    if out.starts_with('-') && out[1..].chars().all(|c| c == '0' || c == '.') {
        out[1..].to_string()
    } else {
        out
    }
}

/// Decimal digits needed to distinguish multiples of `step`
pub fn precision_fixed(step: f64) -> usize {
    let step = step.abs();
    if step == 0.0 || !step.is_finite() {
        return 0;
    }
    (-step.log10().floor()).max(0.0) as usize
}

/// Grouped decimal output; with no fixed precision the shortest exact
/// representation is used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultNumberFormatter {
    pub precision: Option<usize>,
}

impl DefaultNumberFormatter {
    /// Formatter for ticks spaced `step` apart
    pub fn for_step(step: f64) -> Self {
        Self {
            precision: Some(precision_fixed(step)),
        }
    }
}

impl NumberFormatter for DefaultNumberFormatter {
    fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return value.to_string();
        }
        let out = match self.precision {
            Some(p) => fixed(value, p),
            None => {
                let s = value.to_string();
                if s == "-0" {
                    "0".to_string()
                } else {
                    s
                }
            }
        };
        group_thousands(&out)
    }
}

/// Currency output such as `$1,234.56`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormatter {
    pub symbol: String,
    pub precision: usize,
}

impl Default for CurrencyFormatter {
    fn default() -> Self {
        Self {
            symbol: "$".to_string(),
            precision: 2,
        }
    }
}

impl NumberFormatter for CurrencyFormatter {
    fn format(&self, value: f64) -> String {
        let out = group_thousands(&fixed(value.abs(), self.precision));
        let negative = value < 0.0 && out.chars().any(|c| c.is_ascii_digit() && c != '0');
        if negative {
            format!("-{}{out}", self.symbol)
        } else {
            format!("{}{out}", self.symbol)
        }
    }
}

/// Multiplies by 100 and appends `%`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PercentFormatter {
    pub precision: usize,
}

impl NumberFormatter for PercentFormatter {
    fn format(&self, value: f64) -> String {
        format!("{}%", fixed(value * 100.0, self.precision))
    }
}

const SI_PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "µ", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

/// SI-prefix notation (`1.5k`, `20M`, `500m`) with trailing zeros trimmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiFormatter {
    /// Significant digits
    pub precision: usize,
}

impl Default for SiFormatter {
    fn default() -> Self {
        Self { precision: 6 }
    }
}

impl NumberFormatter for SiFormatter {
    fn format(&self, value: f64) -> String {
        if value == 0.0 || !value.is_finite() {
            return if value == 0.0 {
                "0".to_string()
            } else {
                value.to_string()
            };
        }
        let exponent = ((value.abs().log10() / 3.0).floor() * 3.0).clamp(-24.0, 24.0);
        let scaled = value / 10f64.powf(exponent);
        let magnitude = scaled.abs().log10().floor();
        let decimals = (self.precision as f64 - 1.0 - magnitude).max(0.0) as usize;
        let prefix = SI_PREFIXES[((exponent / 3.0) as i32 + 8) as usize];
        format!("{}{prefix}", trim_insignificant(&fixed(scaled, decimals)))
    }
}

/// Exponent notation with an explicit exponent sign, e.g. `1e+26`, `2.5e-3`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExponentFormatter {
    /// Digits after the decimal point of the mantissa
    pub precision: usize,
}

impl NumberFormatter for ExponentFormatter {
    fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return value.to_string();
        }
        let precision = self.precision;
        let out = format!("{value:.precision$e}");
        match out.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => out,
        }
    }
}

/// strftime-style date output, e.g. `%B %-d, %Y`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeFormatter {
    pub pattern: String,
}

impl TimeFormatter {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
        }
    }
}

impl Default for TimeFormatter {
    fn default() -> Self {
        Self::new("%Y-%m-%d")
    }
}

impl DateFormatter for TimeFormatter {
    fn format(&self, value: DateTime<Utc>) -> String {
        value.format(&self.pattern).to_string()
    }
}

/// Picks the coarsest calendar field that still identifies the timestamp:
/// a year boundary prints the year, a month boundary the month name, and so on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiTimeFormatter;

impl DateFormatter for MultiTimeFormatter {
    fn format(&self, value: DateTime<Utc>) -> String {
        let floors = |unit| TimeInterval::new(unit, 1).floor(value);
        let below = |unit| floors(unit).map(|f| f < value).unwrap_or(false);

        let pattern = if below(TimeUnit::Second) {
            ".%3f"
        } else if below(TimeUnit::Minute) {
            ":%S"
        } else if below(TimeUnit::Hour) {
            "%I:%M"
        } else if below(TimeUnit::Day) {
            "%I %p"
        } else if below(TimeUnit::Month) {
            if below(TimeUnit::Week) {
                "%a %d"
            } else {
                "%b %d"
            }
        } else if below(TimeUnit::Year) {
            "%B"
        } else {
            "%Y"
        };
        value.format(pattern).to_string()
    }
}

/// Formatters passed explicitly to axes and tooltips in place of a global locale
#[derive(Debug, Clone)]
pub struct Formatters {
    pub number: Arc<dyn NumberFormatter>,
    pub date: Arc<dyn DateFormatter>,
}

impl Default for Formatters {
    fn default() -> Self {
        Self {
            number: Arc::new(DefaultNumberFormatter::default()),
            date: Arc::new(MultiTimeFormatter),
        }
    }
}
