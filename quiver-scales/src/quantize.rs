use std::fmt::Debug;

use crate::array;
use crate::error::QuiverScaleError;

#[derive(Debug, Clone)]
pub struct QuantizeScaleConfig {
    pub domain: (f64, f64),
    pub nice: Option<usize>,
}

impl Default for QuantizeScaleConfig {
    fn default() -> Self {
        Self {
            domain: (0.0, 1.0),
            nice: None,
        }
    }
}

/// Divides a continuous domain into uniform segments, one per range value.
#[derive(Debug, Clone)]
pub struct QuantizeScale<R: Debug + Clone> {
    domain: (f64, f64),
    range: Vec<R>,
    thresholds: Vec<f64>,
}

impl<R: Debug + Clone> QuantizeScale<R> {
    pub fn try_new(config: &QuantizeScaleConfig, range: Vec<R>) -> Result<Self, QuiverScaleError> {
        if range.is_empty() {
            return Err(QuiverScaleError::EmptyRange);
        }
        let (start, end) = config.domain;
        if !start.is_finite() || !end.is_finite() {
            return Err(QuiverScaleError::DegenerateDomain { start, end });
        }
        let domain = match config.nice {
            Some(count) => array::nice(start, end, count as f64),
            None => (start, end),
        };

        let n = range.len();
        let thresholds = (1..n)
            .map(|i| domain.0 + (domain.1 - domain.0) * i as f64 / n as f64)
            .collect();

        Ok(Self {
            domain,
            range,
            thresholds,
        })
    }

    pub fn scale(&self, value: f64) -> Option<R> {
        if value.is_nan() {
            return None;
        }
        let i = array::bisect_right(&self.thresholds, &value);
        Some(self.range[i].clone())
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> &[R] {
        &self.range
    }

    /// Domain extent covered by `range[index]`
    pub fn invert_extent(&self, index: usize) -> Option<(f64, f64)> {
        if index >= self.range.len() {
            return None;
        }
        let lo = if index == 0 {
            self.domain.0
        } else {
            self.thresholds[index - 1]
        };
        let hi = self
            .thresholds
            .get(index)
            .copied()
            .unwrap_or(self.domain.1);
        Some((lo, hi))
    }
}
