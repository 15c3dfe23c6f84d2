use log::warn;

use crate::array;
use crate::error::QuiverScaleError;

use super::ContinuousNumericScale;

#[derive(Clone, Debug)]
pub struct LinearScaleConfig {
    pub domain: (f64, f64),
    pub range: (f64, f64),
    pub clamp: bool,
    /// Extend the domain to nice round values using this approximate tick count
    pub nice: Option<usize>,
    /// Round output to integers (pixel snapping)
    pub round: bool,
}

impl Default for LinearScaleConfig {
    fn default() -> Self {
        Self {
            domain: (0.0, 1.0),
            range: (0.0, 1.0),
            clamp: false,
            nice: None,
            round: false,
        }
    }
}

/// A linear scale that maps numeric input values from a domain to a range.
/// Supports clamping, rounding, domain niceing, and tick generation.
#[derive(Clone, Debug)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
    clamp: bool,
    round: bool,
}

impl LinearScale {
    /// Creates a linear scale, failing on a degenerate or non-finite domain.
    pub fn try_new(config: &LinearScaleConfig) -> Result<Self, QuiverScaleError> {
        let (start, end) = config.domain;
        if start == end || !start.is_finite() || !end.is_finite() {
            return Err(QuiverScaleError::DegenerateDomain { start, end });
        }
        Ok(Self::build(config))
    }

    /// Creates a linear scale. A degenerate domain is accepted with a warning,
    /// and every input then maps to the start of the range.
    pub fn new(config: &LinearScaleConfig) -> Self {
        match Self::try_new(config) {
            Ok(scale) => scale,
            Err(err) => {
                warn!("{err}; mapping all values to range start");
                Self::build(config)
            }
        }
    }

    fn build(config: &LinearScaleConfig) -> Self {
        let this = Self {
            domain_start: config.domain.0,
            domain_end: config.domain.1,
            range_start: config.range.0,
            range_end: config.range.1,
            clamp: config.clamp,
            round: config.round,
        };
        match config.nice {
            Some(count) => this.nice(Some(count)),
            None => this,
        }
    }

    /// Extends the domain to nice round numbers for better tick selection
    pub fn nice(mut self, count: Option<usize>) -> Self {
        let count = count.unwrap_or(10) as f64;
        let (start, end) = array::nice(self.domain_start, self.domain_end, count);
        self.domain_start = start;
        self.domain_end = end;
        self
    }

    pub fn with_domain(mut self, domain: (f64, f64)) -> Self {
        self.domain_start = domain.0;
        self.domain_end = domain.1;
        self
    }

    pub fn with_range(mut self, range: (f64, f64)) -> Self {
        self.range_start = range.0;
        self.range_end = range.1;
        self
    }

    pub fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    pub fn with_round(mut self, round: bool) -> Self {
        self.round = round;
        self
    }

    pub fn round(&self) -> bool {
        self.round
    }

    fn is_degenerate(&self) -> bool {
        self.domain_start == self.domain_end
            || self.range_start == self.range_end
            || self.domain_start.is_nan()
            || self.domain_end.is_nan()
            || self.range_start.is_nan()
            || self.range_end.is_nan()
    }

    fn range_bounds(&self) -> (f64, f64) {
        if self.range_start <= self.range_end {
            (self.range_start, self.range_end)
        } else {
            (self.range_end, self.range_start)
        }
    }
}

impl ContinuousNumericScale for LinearScale {
    fn domain(&self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    fn range(&self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    fn clamp(&self) -> bool {
        self.clamp
    }

    fn scale(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            return self.range_start;
        }

        let t = (value - self.domain_start) / (self.domain_end - self.domain_start);
        let mut out = self.range_start + t * (self.range_end - self.range_start);

        if self.clamp {
            let (lo, hi) = self.range_bounds();
            out = out.clamp(lo, hi);
        }
        if self.round {
            out = out.round();
        }
        out
    }

    fn invert(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            return self.domain_start;
        }

        let value = if self.clamp {
            let (lo, hi) = self.range_bounds();
            value.clamp(lo, hi)
        } else {
            value
        };

        let t = (value - self.range_start) / (self.range_end - self.range_start);
        self.domain_start + t * (self.domain_end - self.domain_start)
    }

    fn ticks(&self, count: Option<f64>) -> Vec<f64> {
        array::ticks(self.domain_start, self.domain_end, count.unwrap_or(10.0))
    }
}
