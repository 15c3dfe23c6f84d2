use std::fmt::Debug;

use crate::array;
use crate::error::QuiverScaleError;

/// Maps a sample of values into range buckets holding equal counts.
///
/// Thresholds are the sample's `i / n` quantiles, so a sample of `[1..=10]`
/// with two outputs splits at the median (5.5).
#[derive(Debug, Clone)]
pub struct QuantileScale<R: Debug + Clone> {
    sample: Vec<f64>,
    range: Vec<R>,
    thresholds: Vec<f64>,
}

impl<R: Debug + Clone> QuantileScale<R> {
    /// Builds the scale from an unsorted sample; NaN values are ignored.
    pub fn try_new(sample: &[f64], range: Vec<R>) -> Result<Self, QuiverScaleError> {
        let mut sample: Vec<f64> = sample.iter().copied().filter(|v| !v.is_nan()).collect();
        if sample.is_empty() {
            return Err(QuiverScaleError::EmptyDomain);
        }
        if range.is_empty() {
            return Err(QuiverScaleError::EmptyRange);
        }
        sample.sort_by(f64::total_cmp);

        let n = range.len();
        let thresholds = (1..n)
            .filter_map(|i| array::quantile_sorted(&sample, i as f64 / n as f64))
            .collect();

        Ok(Self {
            sample,
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

    pub fn quantiles(&self) -> &[f64] {
        &self.thresholds
    }

    /// The sorted sample
    pub fn domain(&self) -> &[f64] {
        &self.sample
    }

    pub fn range(&self) -> &[R] {
        &self.range
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_median_split() {
        let sample: Vec<f64> = (1..=10).map(f64::from).collect();
        let scale = QuantileScale::try_new(&sample, vec!["low", "high"]).unwrap();
        assert_approx_eq!(f64, scale.quantiles()[0], 5.5);

        let low = sample.iter().filter(|v| scale.scale(**v) == Some("low")).count();
        let high = sample.iter().filter(|v| scale.scale(**v) == Some("high")).count();
        assert_eq!((low, high), (5, 5));
    }

    #[test]
    fn test_unsorted_sample_with_nan() {
        let sample = [9.0, f64::NAN, 1.0, 5.0, 3.0, 7.0];
        let scale = QuantileScale::try_new(&sample, vec![0, 1, 2, 3]).unwrap();
        assert_eq!(scale.domain(), &[1.0, 3.0, 5.0, 7.0, 9.0]);
        assert_eq!(scale.quantiles(), &[3.0, 5.0, 7.0]);
        assert_eq!(scale.scale(2.0), Some(0));
        assert_eq!(scale.scale(5.0), Some(2));
        assert_eq!(scale.scale(100.0), Some(3));
    }

    #[test]
    fn test_empty_sample() {
        assert_eq!(
            QuantileScale::try_new(&[f64::NAN], vec![1]).unwrap_err(),
            QuiverScaleError::EmptyDomain
        );
    }
}
