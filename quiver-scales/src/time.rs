use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, TimeZone, Timelike, Utc};
use log::warn;

use crate::array;
use crate::error::QuiverScaleError;
use crate::numeric::linear::{LinearScale, LinearScaleConfig};
use crate::numeric::ContinuousNumericScale;

const DURATION_SECOND: f64 = 1_000.0;
const DURATION_MINUTE: f64 = DURATION_SECOND * 60.0;
const DURATION_HOUR: f64 = DURATION_MINUTE * 60.0;
const DURATION_DAY: f64 = DURATION_HOUR * 24.0;
const DURATION_WEEK: f64 = DURATION_DAY * 7.0;
const DURATION_MONTH: f64 = DURATION_DAY * 30.0;
const DURATION_YEAR: f64 = DURATION_DAY * 365.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    /// Weeks start on Sunday
    Week,
    Month,
    Year,
}

/// A calendar interval in UTC: a unit and a step count along that unit's field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub unit: TimeUnit,
    pub step: i64,
}

const TICK_INTERVALS: [(TimeUnit, i64, f64); 17] = [
    (TimeUnit::Second, 1, DURATION_SECOND),
    (TimeUnit::Second, 5, 5.0 * DURATION_SECOND),
    (TimeUnit::Second, 15, 15.0 * DURATION_SECOND),
    (TimeUnit::Second, 30, 30.0 * DURATION_SECOND),
    (TimeUnit::Minute, 1, DURATION_MINUTE),
    (TimeUnit::Minute, 5, 5.0 * DURATION_MINUTE),
    (TimeUnit::Minute, 15, 15.0 * DURATION_MINUTE),
    (TimeUnit::Minute, 30, 30.0 * DURATION_MINUTE),
    (TimeUnit::Hour, 1, DURATION_HOUR),
    (TimeUnit::Hour, 3, 3.0 * DURATION_HOUR),
    (TimeUnit::Hour, 6, 6.0 * DURATION_HOUR),
    (TimeUnit::Hour, 12, 12.0 * DURATION_HOUR),
    (TimeUnit::Day, 1, DURATION_DAY),
    (TimeUnit::Day, 2, 2.0 * DURATION_DAY),
    (TimeUnit::Week, 1, DURATION_WEEK),
    (TimeUnit::Month, 1, DURATION_MONTH),
    (TimeUnit::Month, 3, 3.0 * DURATION_MONTH),
];

fn midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

impl TimeInterval {
    pub fn new(unit: TimeUnit, step: i64) -> Self {
        Self {
            unit,
            step: step.max(1),
        }
    }

    /// Picks the interval whose duration is closest to `(stop - start) / count`
    pub fn for_span(start: DateTime<Utc>, stop: DateTime<Utc>, count: f64) -> Self {
        let (lo, hi) = (
            start.timestamp_millis().min(stop.timestamp_millis()) as f64,
            start.timestamp_millis().max(stop.timestamp_millis()) as f64,
        );
        let target = (hi - lo) / count;
        let i = TICK_INTERVALS.partition_point(|(_, _, d)| *d <= target);

        if i == TICK_INTERVALS.len() {
            let step = array::tick_step(lo / DURATION_YEAR, hi / DURATION_YEAR, count);
            return Self::new(TimeUnit::Year, step.round() as i64);
        }
        if i == 0 {
            let step = array::tick_step(lo, hi, count).max(1.0);
            return Self::new(TimeUnit::Millisecond, step.round() as i64);
        }

        let (before, after) = (TICK_INTERVALS[i - 1], TICK_INTERVALS[i]);
        let (unit, step, _) = if target / before.2 < after.2 / target {
            before
        } else {
            after
        };
        Self::new(unit, step)
    }

    fn floor_unit(&self, t: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let date = t.date_naive();
        match self.unit {
            TimeUnit::Millisecond => Some(t),
            TimeUnit::Second => t.with_nanosecond(0),
            TimeUnit::Minute => Utc
                .with_ymd_and_hms(t.year(), t.month(), t.day(), t.hour(), t.minute(), 0)
                .single(),
            TimeUnit::Hour => Utc
                .with_ymd_and_hms(t.year(), t.month(), t.day(), t.hour(), 0, 0)
                .single(),
            TimeUnit::Day => midnight(date),
            TimeUnit::Week => midnight(
                date - Duration::days(date.weekday().num_days_from_sunday() as i64),
            ),
            TimeUnit::Month => midnight(date.with_day(1)?),
            TimeUnit::Year => midnight(NaiveDate::from_ymd_opt(date.year(), 1, 1)?),
        }
    }

    fn offset(&self, t: DateTime<Utc>, n: i32) -> Option<DateTime<Utc>> {
        let months = |m: i32| {
            if m >= 0 {
                t.checked_add_months(Months::new(m as u32))
            } else {
                t.checked_sub_months(Months::new((-m) as u32))
            }
        };
        match self.unit {
            TimeUnit::Millisecond => t.checked_add_signed(Duration::milliseconds(n as i64)),
            TimeUnit::Second => t.checked_add_signed(Duration::seconds(n as i64)),
            TimeUnit::Minute => t.checked_add_signed(Duration::minutes(n as i64)),
            TimeUnit::Hour => t.checked_add_signed(Duration::hours(n as i64)),
            TimeUnit::Day => t.checked_add_signed(Duration::days(n as i64)),
            TimeUnit::Week => t.checked_add_signed(Duration::weeks(n as i64)),
            TimeUnit::Month => months(n),
            TimeUnit::Year => months(n * 12),
        }
    }

    fn field(&self, t: DateTime<Utc>) -> i64 {
        match self.unit {
            TimeUnit::Millisecond => t.timestamp_millis(),
            TimeUnit::Second => t.second() as i64,
            TimeUnit::Minute => t.minute() as i64,
            TimeUnit::Hour => t.hour() as i64,
            TimeUnit::Day => t.day0() as i64,
            TimeUnit::Week => 0,
            TimeUnit::Month => t.month0() as i64,
            TimeUnit::Year => t.year() as i64,
        }
    }

    fn aligned(&self, t: DateTime<Utc>) -> bool {
        self.field(t).rem_euclid(self.step) == 0
    }

    /// Latest aligned boundary at or before `t`
    pub fn floor(&self, t: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut current = self.floor_unit(t)?;
        if self.unit == TimeUnit::Millisecond {
            let ms = t.timestamp_millis();
            return DateTime::from_timestamp_millis(ms - ms.rem_euclid(self.step));
        }
        while !self.aligned(current) {
            current = self.offset(current, -1)?;
        }
        Some(current)
    }

    /// Earliest aligned boundary at or after `t`
    pub fn ceil(&self, t: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let floor = self.floor(t)?;
        if floor == t {
            return Some(floor);
        }
        self.next(floor)
    }

    fn next(&self, t: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.unit == TimeUnit::Millisecond {
            return self.offset(t, self.step as i32);
        }
        let mut current = self.offset(t, 1)?;
        while !self.aligned(current) {
            current = self.offset(current, 1)?;
        }
        Some(current)
    }

    /// Every aligned boundary within `[start, stop]`
    pub fn range(&self, start: DateTime<Utc>, stop: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        let mut out = Vec::new();
        let mut current = self.ceil(start);
        while let Some(t) = current {
            if t > stop {
                break;
            }
            out.push(t);
            current = self.next(t);
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct TimeScaleConfig {
    pub domain: (DateTime<Utc>, DateTime<Utc>),
    pub range: (f64, f64),
    pub clamp: bool,
    pub nice: bool,
    pub round: bool,
}

impl Default for TimeScaleConfig {
    fn default() -> Self {
        let start = DateTime::UNIX_EPOCH;
        Self {
            domain: (start, start + Duration::days(1)),
            range: (0.0, 1.0),
            clamp: false,
            nice: false,
            round: false,
        }
    }
}

/// A linear scale over UTC timestamps.
#[derive(Debug, Clone)]
pub struct TimeScale {
    inner: LinearScale,
}

impl TimeScale {
    pub fn try_new(config: &TimeScaleConfig) -> Result<Self, QuiverScaleError> {
        let inner = LinearScale::try_new(&Self::linear_config(config))?;
        Ok(Self::build(inner, config.nice))
    }

    /// Creates a time scale; an empty time span maps everything to range start.
    pub fn new(config: &TimeScaleConfig) -> Self {
        match Self::try_new(config) {
            Ok(scale) => scale,
            Err(err) => {
                warn!("{err}; mapping all values to range start");
                Self::build(LinearScale::new(&Self::linear_config(config)), false)
            }
        }
    }

    fn linear_config(config: &TimeScaleConfig) -> LinearScaleConfig {
        LinearScaleConfig {
            domain: (
                config.domain.0.timestamp_millis() as f64,
                config.domain.1.timestamp_millis() as f64,
            ),
            range: config.range,
            clamp: config.clamp,
            nice: None,
            round: config.round,
        }
    }

    fn build(inner: LinearScale, nice: bool) -> Self {
        let this = Self { inner };
        if nice {
            this.nice(10)
        } else {
            this
        }
    }

    /// Extends the domain to the enclosing calendar boundaries
    pub fn nice(self, count: usize) -> Self {
        let (start, stop) = self.domain();
        let reverse = stop < start;
        let (lo, hi) = if reverse { (stop, start) } else { (start, stop) };
        let interval = TimeInterval::for_span(lo, hi, count as f64);
        let (Some(lo), Some(hi)) = (interval.floor(lo), interval.ceil(hi)) else {
            return self;
        };
        let (lo, hi) = (lo.timestamp_millis() as f64, hi.timestamp_millis() as f64);
        let domain = if reverse { (hi, lo) } else { (lo, hi) };
        Self {
            inner: self.inner.with_domain(domain),
        }
    }

    pub fn domain(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let (d0, d1) = self.inner.domain();
        (Self::to_date(d0), Self::to_date(d1))
    }

    pub fn range(&self) -> (f64, f64) {
        self.inner.range()
    }

    fn to_date(ms: f64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms.round() as i64).unwrap_or(DateTime::UNIX_EPOCH)
    }

    pub fn scale(&self, value: DateTime<Utc>) -> f64 {
        self.inner.scale(value.timestamp_millis() as f64)
    }

    /// Maps a pixel position back to a timestamp (millisecond precision)
    pub fn invert(&self, value: f64) -> DateTime<Utc> {
        Self::to_date(self.inner.invert(value))
    }

    pub fn tick_interval(&self, count: Option<f64>) -> TimeInterval {
        let (start, stop) = self.domain();
        TimeInterval::for_span(start, stop, count.unwrap_or(10.0))
    }

    pub fn ticks(&self, count: Option<f64>) -> Vec<DateTime<Utc>> {
        let (start, stop) = self.domain();
        let reverse = stop < start;
        let (lo, hi) = if reverse { (stop, start) } else { (start, stop) };
        let interval = TimeInterval::for_span(lo, hi, count.unwrap_or(10.0));
        let mut ticks = interval.range(lo, hi);
        if reverse {
            ticks.reverse();
        }
        ticks
    }
}
