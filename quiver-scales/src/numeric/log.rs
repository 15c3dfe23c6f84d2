use log::warn;

use crate::array;
use crate::error::QuiverScaleError;

use super::ContinuousNumericScale;

/// Handles logarithmic transformations with different bases
#[derive(Clone, Copy, Debug)]
enum LogFunction {
    Static {
        log_fun: fn(f64) -> f64,
        pow_fun: fn(f64) -> f64,
        base: f64,
    },
    Custom {
        ln_base: f64,
        base: f64,
    },
}

impl LogFunction {
    fn new(base: f64) -> Self {
        if base == std::f64::consts::E {
            LogFunction::Static {
                log_fun: f64::ln,
                pow_fun: f64::exp,
                base,
            }
        } else if base == 10.0 {
            LogFunction::Static {
                log_fun: f64::log10,
                pow_fun: |x| 10f64.powf(x),
                base,
            }
        } else if base == 2.0 {
            LogFunction::Static {
                log_fun: f64::log2,
                pow_fun: f64::exp2,
                base,
            }
        } else {
            LogFunction::Custom {
                ln_base: base.ln(),
                base,
            }
        }
    }

    fn log(&self, x: f64) -> f64 {
        match self {
            LogFunction::Static { log_fun, .. } => log_fun(x),
            LogFunction::Custom { ln_base, .. } => x.ln() / ln_base,
        }
    }

    fn pow(&self, x: f64) -> f64 {
        match self {
            LogFunction::Static { pow_fun, .. } => pow_fun(x),
            LogFunction::Custom { base, .. } => base.powf(x),
        }
    }

    fn base(&self) -> f64 {
        match self {
            LogFunction::Static { base, .. } | LogFunction::Custom { base, .. } => *base,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogScaleConfig {
    pub domain: (f64, f64),
    pub range: (f64, f64),
    pub base: f64,
    pub clamp: bool,
    pub nice: bool,
}

impl Default for LogScaleConfig {
    fn default() -> Self {
        Self {
            domain: (1.0, 10.0),
            range: (0.0, 1.0),
            base: 10.0,
            clamp: false,
            nice: false,
        }
    }
}

/// A logarithmic scale: linear interpolation in log space.
///
/// The domain must be strictly positive or strictly negative. A negative
/// domain is handled by reflecting through zero.
#[derive(Clone, Debug)]
pub struct LogScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
    clamp: bool,
    log_fun: LogFunction,
}

impl LogScale {
    pub fn try_new(config: &LogScaleConfig) -> Result<Self, QuiverScaleError> {
        let (start, end) = config.domain;
        if !start.is_finite() || !end.is_finite() || start * end <= 0.0 {
            return Err(QuiverScaleError::InvalidLogDomain { start, end });
        }
        if start == end {
            return Err(QuiverScaleError::DegenerateDomain { start, end });
        }
        Ok(Self::build(config))
    }

    /// Creates a log scale. An invalid domain is accepted with a warning, and
    /// every input then maps to the start of the range.
    pub fn new(config: &LogScaleConfig) -> Self {
        match Self::try_new(config) {
            Ok(scale) => scale,
            Err(err) => {
                warn!("{err}; mapping all values to range start");
                Self::build(config)
            }
        }
    }

    fn build(config: &LogScaleConfig) -> Self {
        let this = Self {
            domain_start: config.domain.0,
            domain_end: config.domain.1,
            range_start: config.range.0,
            range_end: config.range.1,
            clamp: config.clamp,
            log_fun: LogFunction::new(config.base),
        };
        if config.nice {
            this.nice()
        } else {
            this
        }
    }

    pub fn base(&self) -> f64 {
        self.log_fun.base()
    }

    fn is_valid(&self) -> bool {
        self.domain_start.is_finite()
            && self.domain_end.is_finite()
            && self.domain_start * self.domain_end > 0.0
            && self.domain_start != self.domain_end
            && self.range_start.is_finite()
            && self.range_end.is_finite()
    }

    fn reflected(&self) -> bool {
        self.domain_start < 0.0
    }

    /// Signed log honoring reflection for negative domains
    fn transform(&self, x: f64) -> f64 {
        if self.reflected() {
            -self.log_fun.log(-x)
        } else {
            self.log_fun.log(x)
        }
    }

    fn untransform(&self, x: f64) -> f64 {
        if self.reflected() {
            -self.log_fun.pow(-x)
        } else {
            self.log_fun.pow(x)
        }
    }

    /// Extends the domain outward to whole powers of the base
    pub fn nice(mut self) -> Self {
        if !self.is_valid() {
            return self;
        }
        let reverse = self.domain_end < self.domain_start;
        let (lo, hi) = if reverse {
            (self.domain_end, self.domain_start)
        } else {
            (self.domain_start, self.domain_end)
        };
        let (lo, hi) = if self.reflected() {
            (
                -self.log_fun.pow(self.log_fun.log(-lo).ceil()),
                -self.log_fun.pow(self.log_fun.log(-hi).floor()),
            )
        } else {
            (
                self.log_fun.pow(self.log_fun.log(lo).floor()),
                self.log_fun.pow(self.log_fun.log(hi).ceil()),
            )
        };
        if reverse {
            self.domain_start = hi;
            self.domain_end = lo;
        } else {
            self.domain_start = lo;
            self.domain_end = hi;
        }
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

    fn positive_ticks(&self, u: f64, v: f64, count: f64) -> Vec<f64> {
        let base = self.log_fun.base();
        let i = self.log_fun.log(u);
        let j = self.log_fun.log(v);

        if base.fract() == 0.0 && j - i < count {
            let mut z = Vec::new();
            for exp in (i.floor() as i32)..=(j.ceil() as i32) {
                let p = self.log_fun.pow(exp as f64);
                for k in 1..(base as i32) {
                    let t = k as f64 * p;
                    if t < u {
                        continue;
                    }
                    if t > v {
                        break;
                    }
                    z.push(t);
                }
            }
            if (z.len() as f64) * 2.0 < count {
                z = array::ticks(u, v, count);
            }
            z
        } else {
            array::ticks(i, j, count.min(j - i))
                .into_iter()
                .map(|x| self.log_fun.pow(x))
                .collect()
        }
    }
}

impl ContinuousNumericScale for LogScale {
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
        if !self.is_valid() {
            return self.range_start;
        }
        let d0 = self.transform(self.domain_start);
        let d1 = self.transform(self.domain_end);
        let mut t = (self.transform(value) - d0) / (d1 - d0);
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        self.range_start + t * (self.range_end - self.range_start)
    }

    fn invert(&self, value: f64) -> f64 {
        if !self.is_valid() || self.range_start == self.range_end {
            return self.domain_start;
        }
        let mut t = (value - self.range_start) / (self.range_end - self.range_start);
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        let d0 = self.transform(self.domain_start);
        let d1 = self.transform(self.domain_end);
        self.untransform(d0 + t * (d1 - d0))
    }

    fn ticks(&self, count: Option<f64>) -> Vec<f64> {
        let count = count.unwrap_or(10.0);
        if !self.is_valid() {
            return vec![];
        }
        let reverse = self.domain_end < self.domain_start;
        let (lo, hi) = if reverse {
            (self.domain_end, self.domain_start)
        } else {
            (self.domain_start, self.domain_end)
        };

        let mut z = if self.reflected() {
            let mut z: Vec<f64> = self
                .positive_ticks(-hi, -lo, count)
                .into_iter()
                .map(|t| -t)
                .collect();
            z.reverse();
            z
        } else {
            self.positive_ticks(lo, hi, count)
        };

        if reverse {
            z.reverse();
        }
        z
    }
}
