use std::fmt::Debug;

use crate::array;
use crate::error::QuiverScaleError;

/// Maps values to `range[i]` where `i` counts the thresholds at or below the value.
#[derive(Debug, Clone)]
pub struct ThresholdScale<R: Debug + Clone> {
    thresholds: Vec<f64>,
    range: Vec<R>,
}

impl<R: Debug + Clone> ThresholdScale<R> {
    pub fn try_new(thresholds: Vec<f64>, range: Vec<R>) -> Result<Self, QuiverScaleError> {
        if thresholds.windows(2).any(|w| !(w[0] <= w[1])) {
            return Err(QuiverScaleError::ThresholdsNotAscending(thresholds));
        }
        if range.len() != thresholds.len() + 1 {
            return Err(QuiverScaleError::ThresholdDomainMismatch {
                domain_len: thresholds.len(),
                range_len: range.len(),
            });
        }
        Ok(Self { thresholds, range })
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

    pub fn range(&self) -> &[R] {
        &self.range
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(-1.0, "cold")]
    #[case(0.0, "mild")]
    #[case(15.0, "mild")]
    #[case(20.0, "hot")]
    #[case(45.0, "hot")]
    fn test_scale(#[case] value: f64, #[case] expected: &str) {
        let scale = ThresholdScale::try_new(vec![0.0, 20.0], vec!["cold", "mild", "hot"]).unwrap();
        assert_eq!(scale.scale(value), Some(expected));
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            ThresholdScale::try_new(vec![5.0, 1.0], vec![0, 1, 2]).unwrap_err(),
            QuiverScaleError::ThresholdsNotAscending(vec![5.0, 1.0])
        );
        assert_eq!(
            ThresholdScale::try_new(vec![1.0, 5.0], vec![0, 1]).unwrap_err(),
            QuiverScaleError::ThresholdDomainMismatch {
                domain_len: 2,
                range_len: 2
            }
        );
    }
}
