use itertools::Itertools;
use log::debug;
use quiver_scales::array;

use crate::error::ShapeError;

#[derive(Debug, Clone, PartialEq)]
pub enum Thresholds {
    /// Sturges' rule: `ceil(log2(n)) + 1` bins
    Sturges,
    /// Approximate bin count; boundaries land on nice tick values
    Count(usize),
    /// Explicit ascending boundaries
    Values(Vec<f64>),
}

#[derive(Debug, Clone)]
pub struct BinConfig {
    /// Domain to bin over; defaults to the extent of the values.
    /// Values outside an explicit domain are dropped.
    pub domain: Option<(f64, f64)>,
    pub thresholds: Thresholds,
}

impl Default for BinConfig {
    fn default() -> Self {
        Self {
            domain: None,
            thresholds: Thresholds::Sturges,
        }
    }
}

/// Half-open interval `[x0, x1)` and the items falling in it.
/// The last bin also contains values equal to its `x1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin<T> {
    pub x0: f64,
    pub x1: f64,
    pub items: Vec<T>,
}

impl<T> Bin<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Groups `items` into contiguous bins by the value `value` extracts.
///
/// Items whose value is missing or NaN are skipped. The requested count is
/// advisory: boundaries are chosen on nice steps, so the actual number of bins
/// may differ.
pub fn bin<T: Clone>(
    items: &[T],
    value: impl Fn(&T) -> Option<f64>,
    config: &BinConfig,
) -> Result<Vec<Bin<T>>, ShapeError> {
    let values: Vec<Option<f64>> = items
        .iter()
        .map(|item| value(item).filter(|v| !v.is_nan()))
        .collect();

    let from_extent = config.domain.is_none();
    let (mut x0, mut x1) = match config.domain {
        Some(domain) => domain,
        None => match array::extent(values.iter(), |v| *v) {
            Some(extent) => extent,
            None => return Ok(vec![]),
        },
    };
    if !(x0 <= x1) || !x0.is_finite() || !x1.is_finite() {
        return Err(ShapeError::InvalidDomain(x0, x1));
    }

    let defined = values.iter().filter(|v| v.is_some()).count();
    let mut thresholds = match &config.thresholds {
        Thresholds::Values(values) => {
            if values.iter().tuple_windows().any(|(a, b)| !(a <= b)) {
                return Err(ShapeError::ThresholdsNotAscending(values.clone()));
            }
            values.clone()
        }
        Thresholds::Sturges | Thresholds::Count(_) => {
            let count = match config.thresholds {
                Thresholds::Count(count) => count as f64,
                _ => ((defined.max(1) as f64).log2().ceil() + 1.0).max(1.0),
            };
            let max = x1;
            if from_extent {
                (x0, x1) = array::nice(x0, x1, count);
            }
            let mut ticks = array::ticks(x0, x1, count);
            if ticks.last().is_some_and(|last| *last >= x1) {
                if max >= x1 && from_extent {
                    // Extend the domain by one step so the maximum gets its own bin
                    let step = array::tick_increment(x0, x1, count);
                    if step.is_finite() {
                        if step > 0.0 {
                            x1 = ((x1 / step).floor() + 1.0) * step;
                        } else if step < 0.0 {
                            x1 = ((x1 * -step).ceil() + 1.0) / -step;
                        }
                    }
                } else {
                    ticks.pop();
                }
            }
            ticks
        }
    };

    // Keep only boundaries strictly inside the domain
    thresholds.retain(|t| *t > x0 && *t <= x1);
    if thresholds.last().is_some_and(|t| *t >= x1) {
        thresholds.pop();
    }

    let m = thresholds.len();
    let mut bins: Vec<Bin<T>> = (0..=m)
        .map(|i| Bin {
            x0: if i > 0 { thresholds[i - 1] } else { x0 },
            x1: if i < m { thresholds[i] } else { x1 },
            items: Vec::new(),
        })
        .collect();

    let mut dropped = 0usize;
    for (item, v) in items.iter().zip(values) {
        match v {
            Some(v) if x0 <= v && v <= x1 => {
                let i = array::bisect_right(&thresholds, &v);
                bins[i].items.push(item.clone());
            }
            _ => dropped += 1,
        }
    }
    if dropped > 0 {
        debug!("{dropped} items fell outside the bin domain or had no value");
    }

    Ok(bins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_count_with_explicit_domain() {
        let values: Vec<f64> = (0..=100).map(|v| v as f64 / 100.0).collect();
        let bins = bin(
            &values,
            |v| Some(*v),
            &BinConfig {
                domain: Some((0.0, 1.0)),
                thresholds: Thresholds::Count(10),
            },
        )
        .unwrap();
        assert_eq!(bins.len(), 10);
        assert_eq!(bins[0].x0, 0.0);
        assert_eq!(bins[9].x1, 1.0);
        // The domain maximum lands in the last bin
        assert!(bins[9].items.contains(&1.0));
        // Boundary values start their bin
        assert!(bins[5].items.contains(&0.5));
        assert!(!bins[4].items.contains(&0.5));
    }

    #[test]
    fn test_extent_domain_gives_max_its_bin() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let bins = bin(
            &values,
            |v| Some(*v),
            &BinConfig {
                thresholds: Thresholds::Count(5),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(bins.len(), 6);
        assert_eq!(bins[5].x0, 5.0);
        assert_eq!(bins[5].x1, 6.0);
        assert_eq!(bins[5].items, vec![5.0]);
    }

    #[test]
    fn test_skips_missing_and_outside() {
        let values = [Some(1.0), None, Some(f64::NAN), Some(50.0), Some(2.0)];
        let bins = bin(
            &values,
            |v| *v,
            &BinConfig {
                domain: Some((0.0, 10.0)),
                thresholds: Thresholds::Values(vec![5.0]),
            },
        )
        .unwrap();
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].len(), 2);
        assert!(bins[1].is_empty());
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            bin(
                &[1.0],
                |v| Some(*v),
                &BinConfig {
                    domain: Some((0.0, 1.0)),
                    thresholds: Thresholds::Values(vec![0.7, 0.2]),
                },
            )
            .unwrap_err(),
            ShapeError::ThresholdsNotAscending(vec![0.7, 0.2])
        );
        assert_eq!(
            bin(
                &[1.0],
                |v| Some(*v),
                &BinConfig {
                    domain: Some((3.0, 1.0)),
                    ..Default::default()
                },
            )
            .unwrap_err(),
            ShapeError::InvalidDomain(3.0, 1.0)
        );
    }

    #[test]
    fn test_empty_input() {
        let bins = bin(&Vec::<f64>::new(), |v| Some(*v), &Default::default()).unwrap();
        assert!(bins.is_empty());
    }

    #[rstest]
    #[case(vec![3.2, 7.7, 1.0, 9.9, 5.5, 5.5, 0.1], 4)]
    #[case(vec![-12.0, 40.0, 13.5, 0.0, 27.25], 10)]
    #[case(vec![0.61, 0.72, 0.55, 0.93, 0.88, 0.47, 0.79, 0.66], 10)]
    #[case(vec![42.0, 42.0, 42.0], 10)]
    fn test_partition(#[case] values: Vec<f64>, #[case] count: usize) {
        let bins = bin(
            &values,
            |v| Some(*v),
            &BinConfig {
                thresholds: Thresholds::Count(count),
                ..Default::default()
            },
        )
        .unwrap();

        // Every value in exactly one bin
        let total: usize = bins.iter().map(Bin::len).sum();
        assert_eq!(total, values.len());

        // Bins are contiguous and ordered
        for pair in bins.windows(2) {
            assert_eq!(pair[0].x1, pair[1].x0);
            assert!(pair[0].x0 <= pair[0].x1);
        }

        // Each value lies inside its bin
        let last = bins.len() - 1;
        for (i, b) in bins.iter().enumerate() {
            for v in &b.items {
                assert!(b.x0 <= *v);
                assert!(*v < b.x1 || (i == last && *v <= b.x1));
            }
        }
    }
}
