//! Array helpers shared by the scales: tick generation, extents, and bisection.

use std::cmp::Ordering;

const E10: f64 = 7.071_067_811_865_476; // sqrt(50)
const E5: f64 = 3.162_277_660_168_379_5; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

/// Generate approximately `count` nice ticks between `start` and `stop` (inclusive).
pub fn ticks(start: f64, stop: f64, count: f64) -> Vec<f64> {
    if !(count > 0.0) || start.is_nan() || stop.is_nan() {
        return vec![];
    }
    if start == stop {
        return vec![start];
    }

    let reverse = stop < start;
    let (i1, i2, inc) = if reverse {
        tick_bounds(stop, start, count)
    } else {
        tick_bounds(start, stop, count)
    };

    if !(i2 >= i1) || !inc.is_finite() {
        return vec![];
    }

    let n = (i2 - i1 + 1.0) as usize;
    let value = |i: f64| if inc < 0.0 { i / -inc } else { i * inc };

    if reverse {
        (0..n).map(|i| value(i2 - i as f64)).collect()
    } else {
        (0..n).map(|i| value(i1 + i as f64)).collect()
    }
}

fn step_factor(step: f64) -> (f64, f64) {
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };
    (power, factor)
}

fn tick_bounds(start: f64, stop: f64, count: f64) -> (f64, f64, f64) {
    let step = (stop - start) / count.max(0.0);
    let (power, factor) = step_factor(step);

    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let temp_inc = 10f64.powf(-power) / factor;
        i1 = (start * temp_inc).round();
        i2 = (stop * temp_inc).round();
        if i1 / temp_inc < start {
            i1 += 1.0;
        }
        if i2 / temp_inc > stop {
            i2 -= 1.0;
        }
        inc = -temp_inc;
    } else {
        inc = 10f64.powf(power) * factor;
        i1 = (start / inc).round();
        i2 = (stop / inc).round();
        if i1 * inc < start {
            i1 += 1.0;
        }
        if i2 * inc > stop {
            i2 -= 1.0;
        }
    }

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_bounds(start, stop, count * 2.0);
    }

    (i1, i2, inc)
}

/// Tick increment for the given span.
///
/// Positive results are the step itself; negative results are the inverse
/// step (`-1 / step`) so that sub-unit steps stay exact.
pub fn tick_increment(start: f64, stop: f64, count: f64) -> f64 {
    if !(count > 0.0) {
        return f64::NAN;
    }
    if start == stop {
        return f64::NEG_INFINITY;
    }
    let step = (stop - start) / count;
    if step == 0.0 || !step.is_finite() {
        return f64::NAN;
    }
    let (power, factor) = step_factor(step);
    if power >= 0.0 {
        10f64.powf(power) * factor
    } else {
        -(10f64.powf(-power)) / factor
    }
}

/// The absolute tick step, as a plain positive or negative number.
pub fn tick_step(start: f64, stop: f64, count: f64) -> f64 {
    let reverse = stop < start;
    let inc = if reverse {
        tick_increment(stop, start, count)
    } else {
        tick_increment(start, stop, count)
    };
    let step = if inc < 0.0 { 1.0 / -inc } else { inc };
    if reverse {
        -step
    } else {
        step
    }
}

/// Rounds `[start, stop]` outward so both ends land on tick steps.
pub fn nice(start: f64, stop: f64, count: f64) -> (f64, f64) {
    if start == stop || start.is_nan() || stop.is_nan() {
        return (start, stop);
    }
    let reverse = stop < start;
    let (mut lo, mut hi) = if reverse { (stop, start) } else { (start, stop) };

    let mut prestep = f64::NAN;
    for _ in 0..10 {
        let step = tick_increment(lo, hi, count);
        if step == prestep {
            break;
        } else if step > 0.0 {
            lo = (lo / step).floor() * step;
            hi = (hi / step).ceil() * step;
        } else if step < 0.0 {
            lo = (lo * step).ceil() / step;
            hi = (hi * step).floor() / step;
        } else {
            break;
        }
        prestep = step;
    }

    if reverse {
        (hi, lo)
    } else {
        (lo, hi)
    }
}

/// Min and max of the defined values produced by `accessor`.
///
/// Returns `None` when no value is defined.
pub fn extent<T, F>(items: impl IntoIterator<Item = T>, accessor: F) -> Option<(f64, f64)>
where
    F: Fn(T) -> Option<f64>,
{
    items
        .into_iter()
        .filter_map(accessor)
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Max of the defined values produced by `accessor`.
pub fn max<T, F>(items: impl IntoIterator<Item = T>, accessor: F) -> Option<f64>
where
    F: Fn(T) -> Option<f64>,
{
    extent(items, accessor).map(|(_, hi)| hi)
}

/// Index of the first element `>= x` in ascending `values`.
pub fn bisect_left<T: PartialOrd>(values: &[T], x: &T) -> usize {
    values.partition_point(|v| v.partial_cmp(x) == Some(Ordering::Less))
}

/// Index one past the last element `<= x` in ascending `values`.
pub fn bisect_right<T: PartialOrd>(values: &[T], x: &T) -> usize {
    values.partition_point(|v| !matches!(v.partial_cmp(x), Some(Ordering::Greater)))
}

/// Sample quantile `p` of ascending `values` with linear interpolation
/// between closest ranks.
pub fn quantile_sorted(values: &[f64], p: f64) -> Option<f64> {
    let n = values.len();
    if n == 0 || p.is_nan() {
        return None;
    }
    if p <= 0.0 || n < 2 {
        return values.first().copied();
    }
    if p >= 1.0 {
        return values.last().copied();
    }
    let i = (n - 1) as f64 * p;
    let i0 = i.floor() as usize;
    let v0 = values[i0];
    let v1 = values[i0 + 1];
    Some(v0 + (v1 - v0) * (i - i0 as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_ticks() {
        assert_eq!(
            ticks(0.0, 1.0, 10.0),
            vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0]
        );
        assert_eq!(ticks(0.0, 1.0, 5.0), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
        assert_eq!(ticks(0.0, 1.0, 2.0), vec![0.0, 0.5, 1.0]);
        assert_eq!(ticks(0.0, 1.0, 1.0), vec![0.0, 1.0]);
        assert_eq!(ticks(1.0, 0.0, 2.0), vec![1.0, 0.5, 0.0]);
        assert_eq!(ticks(0.0, 1000.0, 5.0), vec![0.0, 200.0, 400.0, 600.0, 800.0, 1000.0]);
    }

    #[test]
    fn test_ticks_edge_cases() {
        assert!(ticks(f64::NAN, 1.0, 1.0).is_empty());
        assert!(ticks(0.0, 1.0, 0.0).is_empty());
        assert!(ticks(0.0, 1.0, -1.0).is_empty());
        assert_eq!(ticks(1.0, 1.0, 10.0), vec![1.0]);
    }

    #[test]
    fn test_tick_increment() {
        assert_eq!(tick_increment(0.0, 1.0, 10.0), -10.0);
        assert_eq!(tick_increment(0.0, 100.0, 10.0), 10.0);
        assert_eq!(tick_increment(0.0, 1.0, 2.0), -2.0);
        assert_approx_eq!(f64, tick_step(0.0, 1.0, 10.0), 0.1);
        assert_approx_eq!(f64, tick_step(1.0, 0.0, 10.0), -0.1);
    }

    #[test]
    fn test_nice() {
        assert_eq!(nice(1.1, 10.9, 10.0), (1.0, 11.0));
        assert_eq!(nice(10.9, 1.1, 10.0), (11.0, 1.0));
        assert_eq!(nice(0.12, 0.87, 10.0), (0.1, 0.9));
        assert_eq!(nice(5.0, 5.0, 10.0), (5.0, 5.0));
    }

    #[test]
    fn test_extent_skips_missing() {
        let values = [Some(3.0), None, Some(-1.0), Some(f64::NAN), Some(7.5)];
        assert_eq!(extent(values.iter(), |v| *v), Some((-1.0, 7.5)));
        assert_eq!(extent(Vec::<Option<f64>>::new(), |v| v), None);
    }

    #[test]
    fn test_bisect() {
        let values = [1.0, 2.0, 2.0, 3.0];
        assert_eq!(bisect_left(&values, &2.0), 1);
        assert_eq!(bisect_right(&values, &2.0), 3);
        assert_eq!(bisect_left(&values, &0.0), 0);
        assert_eq!(bisect_right(&values, &9.0), 4);
    }

    #[test]
    fn test_quantile_sorted() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        assert_approx_eq!(f64, quantile_sorted(&values, 0.5).unwrap(), 5.5);
        assert_approx_eq!(f64, quantile_sorted(&values, 0.0).unwrap(), 1.0);
        assert_approx_eq!(f64, quantile_sorted(&values, 1.0).unwrap(), 10.0);
        assert_eq!(quantile_sorted(&[], 0.5), None);
    }
}
