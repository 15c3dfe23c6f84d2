use log::warn;

/// One layer of a stacked layout.
///
/// `points[j]` is the `[baseline, top]` pair for the j-th input item.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedSeries<K> {
    pub key: K,
    /// Position of the key in the stacking order
    pub index: usize,
    pub points: Vec<[f64; 2]>,
}

impl<K> StackedSeries<K> {
    pub fn baseline(&self, j: usize) -> Option<f64> {
        self.points.get(j).map(|p| p[0])
    }

    pub fn top(&self, j: usize) -> Option<f64> {
        self.points.get(j).map(|p| p[1])
    }
}

/// Stacks the values of `keys` for every item on a zero baseline.
///
/// Series are produced in key order; the first series starts at zero and each
/// following series starts where the previous one ended. Missing or NaN
/// values count as zero.
pub fn stack<T, K: Clone>(
    items: &[T],
    keys: &[K],
    value: impl Fn(&T, &K) -> Option<f64>,
) -> Vec<StackedSeries<K>> {
    let mut tops = vec![0.0; items.len()];
    let mut missing = 0usize;

    let series = keys
        .iter()
        .enumerate()
        .map(|(index, key)| {
            let points = items
                .iter()
                .zip(tops.iter_mut())
                .map(|(item, top)| {
                    let v = match value(item, key).filter(|v| !v.is_nan()) {
                        Some(v) => v,
                        None => {
                            missing += 1;
                            0.0
                        }
                    };
                    let baseline = *top;
                    *top += v;
                    [baseline, *top]
                })
                .collect();
            StackedSeries {
                key: key.clone(),
                index,
                points,
            }
        })
        .collect();

    if missing > 0 {
        warn!("{missing} stacked values were missing and counted as zero");
    }
    series
}

/// Largest top across all series, the natural upper bound of a y domain
pub fn stack_max<K>(series: &[StackedSeries<K>]) -> Option<f64> {
    series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p[1]))
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiver_common::value::DataRecord;

    fn states() -> Vec<DataRecord> {
        vec![
            DataRecord::new()
                .with("name", "CA")
                .with("<10", 5.0)
                .with("10-19", 3.0)
                .with("≥20", 2.0),
            DataRecord::new()
                .with("name", "TX")
                .with("<10", 4.0)
                .with("≥20", 6.0),
        ]
    }

    #[test]
    fn test_series_chain_and_sum() {
        let data = states();
        let keys = vec!["<10".to_string(), "10-19".to_string(), "≥20".to_string()];
        let series = stack(&data, &keys, |d, k| d.number(k));

        assert_eq!(series.len(), 3);
        for j in 0..data.len() {
            assert_eq!(series[0].baseline(j), Some(0.0));
            for k in 1..series.len() {
                assert_eq!(series[k].baseline(j), series[k - 1].top(j));
            }
        }
        assert_eq!(series[2].top(0), Some(10.0));
        // Missing "10-19" for TX contributes nothing
        assert_eq!(series[1].points[1], [4.0, 4.0]);
        assert_eq!(series[2].top(1), Some(10.0));
        assert_eq!(stack_max(&series), Some(10.0));
    }

    #[test]
    fn test_empty() {
        let series = stack(&Vec::<DataRecord>::new(), &["a"], |d, k| d.number(k));
        assert_eq!(series.len(), 1);
        assert!(series[0].points.is_empty());
        assert_eq!(stack_max(&series), None);
    }
}
