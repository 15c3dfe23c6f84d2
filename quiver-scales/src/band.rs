use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexSet;

use crate::error::QuiverScaleError;

#[derive(Debug, Clone)]
pub struct BandScaleConfig {
    pub range: (f64, f64),
    pub padding_inner: f64,
    pub padding_outer: f64,
    pub align: f64,
    pub round: bool,
}

impl Default for BandScaleConfig {
    fn default() -> Self {
        Self {
            range: (0.0, 1.0),
            padding_inner: 0.0,
            padding_outer: 0.0,
            align: 0.5,
            round: false,
        }
    }
}

impl BandScaleConfig {
    /// Sets inner and outer padding to the same value
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding_inner = padding;
        self.padding_outer = padding;
        self
    }
}

/// A band scale divides a continuous range into uniform bands, one per domain key.
///
/// Commonly used for bar charts with ordinal or categorical dimensions.
#[derive(Debug, Clone)]
pub struct BandScale<D: Debug + Clone + Hash + Eq> {
    domain: IndexSet<D>,
    range: (f64, f64),
    padding_inner: f64,
    padding_outer: f64,
    align: f64,
    round: bool,
    start: f64,
    step: f64,
    bandwidth: f64,
}

/// Number of steps the bands and paddings occupy
pub fn bandspace(count: usize, padding_inner: f64, padding_outer: f64) -> f64 {
    let count = count as f64;
    let space = count - padding_inner + padding_outer * 2.0;
    if space > 0.0 {
        space
    } else {
        1.0
    }
}

impl<D: Debug + Clone + Hash + Eq> BandScale<D> {
    /// Creates a band scale over the given keys; duplicates keep their first position.
    pub fn try_new(domain: Vec<D>, config: &BandScaleConfig) -> Result<Self, QuiverScaleError> {
        let domain: IndexSet<D> = domain.into_iter().collect();
        if domain.is_empty() {
            return Err(QuiverScaleError::EmptyDomain);
        }

        let mut this = Self {
            domain,
            range: config.range,
            padding_inner: config.padding_inner.clamp(0.0, 1.0),
            padding_outer: config.padding_outer.max(0.0),
            align: config.align.clamp(0.0, 1.0),
            round: config.round,
            start: 0.0,
            step: 0.0,
            bandwidth: 0.0,
        };
        this.rescale();
        Ok(this)
    }

    fn rescale(&mut self) {
        let n = self.domain.len();
        let (r0, r1) = self.range;
        let (start, stop) = if r1 < r0 { (r1, r0) } else { (r0, r1) };

        let mut step = (stop - start) / 1f64.max(bandspace(n, self.padding_inner, self.padding_outer));
        if self.round {
            step = step.floor();
        }
        let mut start = start + (stop - start - step * (n as f64 - self.padding_inner)) * self.align;
        let mut bandwidth = step * (1.0 - self.padding_inner);
        if self.round {
            start = start.round();
            bandwidth = bandwidth.round();
        }

        self.start = start;
        self.step = step;
        self.bandwidth = bandwidth;
    }

    fn reversed(&self) -> bool {
        self.range.1 < self.range.0
    }

    /// Start position of the band for `key`, or `None` for keys outside the domain
    pub fn scale(&self, key: &D) -> Option<f64> {
        let i = self.domain.get_index_of(key)?;
        let i = if self.reversed() {
            self.domain.len() - 1 - i
        } else {
            i
        };
        Some(self.start + self.step * i as f64)
    }

    /// Center of the band for `key`
    pub fn center(&self, key: &D) -> Option<f64> {
        self.scale(key).map(|x| x + self.bandwidth / 2.0)
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Distance between the starts of adjacent bands
    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn domain(&self) -> impl Iterator<Item = &D> {
        self.domain.iter()
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn padding_inner(&self) -> f64 {
        self.padding_inner
    }

    pub fn padding_outer(&self) -> f64 {
        self.padding_outer
    }

    /// Key of the band covering `position`, if any
    pub fn invert(&self, position: f64) -> Option<&D> {
        if self.step <= 0.0 {
            return None;
        }
        let offset = position - self.start;
        let i = (offset / self.step).floor();
        if i < 0.0 || offset - i * self.step > self.bandwidth {
            return None;
        }
        let i = i as usize;
        if i >= self.domain.len() {
            return None;
        }
        let i = if self.reversed() {
            self.domain.len() - 1 - i
        } else {
            i
        };
        self.domain.get_index(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    fn keys(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("k{i}")).collect()
    }

    #[test]
    fn test_basic() {
        let scale = BandScale::try_new(
            vec!["a", "b", "c"],
            &BandScaleConfig {
                range: (0.0, 120.0),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(scale.scale(&"a"), Some(0.0));
        assert_eq!(scale.scale(&"b"), Some(40.0));
        assert_eq!(scale.scale(&"c"), Some(80.0));
        assert_eq!(scale.scale(&"d"), None);
        assert_approx_eq!(f64, scale.bandwidth(), 40.0);
    }

    #[test]
    fn test_padding_and_reverse() {
        let scale = BandScale::try_new(
            vec!["a", "b", "c"],
            &BandScaleConfig {
                range: (120.0, 0.0),
                ..Default::default()
            }
            .with_padding(0.2),
        )
        .unwrap();
        // step = 120 / (3 - 0.2 + 0.4)
        assert_approx_eq!(f64, scale.step(), 37.5);
        assert_approx_eq!(f64, scale.bandwidth(), 30.0);
        assert_approx_eq!(f64, scale.scale(&"c").unwrap(), 7.5);
        assert_approx_eq!(f64, scale.scale(&"a").unwrap(), 82.5);
    }

    #[test]
    fn test_empty_domain() {
        let err = BandScale::<String>::try_new(vec![], &Default::default()).unwrap_err();
        assert_eq!(err, QuiverScaleError::EmptyDomain);
    }

    #[test]
    fn test_invert() {
        let scale = BandScale::try_new(
            vec!["a", "b"],
            &BandScaleConfig {
                range: (0.0, 100.0),
                padding_inner: 0.2,
                ..Default::default()
            },
        )
        .unwrap();
        let b = scale.scale(&"b").unwrap();
        assert_eq!(scale.invert(b + 1.0), Some(&"b"));
        assert_eq!(scale.invert(-5.0), None);
    }

    #[rstest]
    #[case(1, 0.0, 0.0)]
    #[case(5, 0.1, 0.1)]
    #[case(7, 0.3, 0.05)]
    #[case(12, 0.5, 1.0)]
    fn test_bands_fill_range(#[case] n: usize, #[case] inner: f64, #[case] outer: f64) {
        let scale = BandScale::try_new(
            keys(n),
            &BandScaleConfig {
                range: (10.0, 610.0),
                padding_inner: inner,
                padding_outer: outer,
                ..Default::default()
            },
        )
        .unwrap();

        // Bandwidths plus inner and outer gaps add up to the range length
        let gaps = inner * scale.step() * (n as f64 - 1.0) + 2.0 * outer * scale.step();
        assert_approx_eq!(
            f64,
            scale.bandwidth() * n as f64 + gaps,
            600.0,
            epsilon = 1e-9
        );

        // Bands do not overlap
        let mut starts: Vec<f64> = keys(n).iter().filter_map(|k| scale.scale(k)).collect();
        starts.sort_by(f64::total_cmp);
        for pair in starts.windows(2) {
            assert!(pair[0] + scale.bandwidth() <= pair[1] + 1e-9);
        }
    }
}
