use std::collections::HashMap;
use std::fmt::Debug;

use quiver_scenegraph::join::JoinSelection;
use quiver_scenegraph::node::NodeId;
use quiver_shapes::error::ShapeError;
use quiver_shapes::voronoi::VoronoiLocator;

use crate::event::PointerEvent;

/// Resolves a pointer event to the index of the record it refers to
pub trait RecordLocator: Debug {
    fn locate(&self, event: &PointerEvent) -> Option<usize>;
}

/// Maps rendered elements back to the records bound to them
#[derive(Debug, Clone, Default)]
pub struct ElementLocator {
    records: HashMap<NodeId, usize>,
}

impl ElementLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every bound node of a join, entering and updating alike
    pub fn from_selection(selection: &JoinSelection) -> Self {
        let records = selection
            .merged()
            .into_iter()
            .map(|bound| (bound.node, bound.index))
            .collect();
        Self { records }
    }

    pub fn insert(&mut self, node: NodeId, index: usize) {
        self.records.insert(node, index);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordLocator for ElementLocator {
    fn locate(&self, event: &PointerEvent) -> Option<usize> {
        event
            .target
            .and_then(|node| self.records.get(&node).copied())
    }
}

/// Nearest record by Euclidean distance, i.e. the Voronoi cell under the pointer
#[derive(Debug, Clone)]
pub struct NearestLocator {
    voronoi: VoronoiLocator,
    /// Ignore pointers farther than this from every record
    radius: Option<f64>,
}

impl NearestLocator {
    pub fn try_new(points: impl IntoIterator<Item = [f64; 2]>) -> Result<Self, ShapeError> {
        Ok(Self {
            voronoi: VoronoiLocator::try_new(points)?,
            radius: None,
        })
    }

    /// Builds a locator over the records that have a position, keeping record indices
    pub fn from_partial(points: impl IntoIterator<Item = Option<[f64; 2]>>) -> Self {
        Self {
            voronoi: VoronoiLocator::from_partial(points),
            radius: None,
        }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn voronoi(&self) -> &VoronoiLocator {
        &self.voronoi
    }
}

impl RecordLocator for NearestLocator {
    fn locate(&self, event: &PointerEvent) -> Option<usize> {
        match self.radius {
            Some(radius) => self.voronoi.find(event.position, radius),
            None => self.voronoi.cell_containing(event.position),
        }
    }
}

/// Nearest record along the x axis only, for line charts where the pointer
/// tracks a date regardless of its height
#[derive(Debug, Clone)]
pub struct BisectLocator {
    /// (x position, record index), sorted by x
    xs: Vec<(f64, usize)>,
}

impl BisectLocator {
    /// Records without a finite x position are skipped
    pub fn new(xs: impl IntoIterator<Item = Option<f64>>) -> Self {
        let mut xs: Vec<(f64, usize)> = xs
            .into_iter()
            .enumerate()
            .filter_map(|(i, x)| x.filter(|x| x.is_finite()).map(|x| (x, i)))
            .collect();
        xs.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        Self { xs }
    }
}

impl RecordLocator for BisectLocator {
    fn locate(&self, event: &PointerEvent) -> Option<usize> {
        let x = event.position[0];
        if !x.is_finite() {
            return None;
        }
        let i = self.xs.partition_point(|(v, _)| *v < x);
        let after = self.xs.get(i);
        let before = i.checked_sub(1).and_then(|j| self.xs.get(j));
        match (before, after) {
            (Some(b), Some(a)) => {
                // Ties go to the earlier record
                if x - b.0 <= a.0 - x {
                    Some(b.1)
                } else {
                    Some(a.1)
                }
            }
            (Some(only), None) | (None, Some(only)) => Some(only.1),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, Some(0))]
    #[case(4.0, Some(0))]
    #[case(5.0, Some(0))]
    #[case(6.0, Some(2))]
    #[case(100.0, Some(1))]
    #[case(-3.0, Some(0))]
    fn test_bisect_nearest_x(#[case] x: f64, #[case] expected: Option<usize>) {
        let locator = BisectLocator::new([Some(0.0), Some(30.0), Some(10.0), None]);
        assert_eq!(locator.locate(&PointerEvent::moved([x, 999.0], None)), expected);
    }

    #[test]
    fn test_bisect_empty() {
        let locator = BisectLocator::new([None, Some(f64::NAN)]);
        assert_eq!(locator.locate(&PointerEvent::moved([1.0, 1.0], None)), None);
    }

    #[test]
    fn test_nearest_with_radius() {
        let locator = NearestLocator::try_new([[0.0, 0.0], [10.0, 0.0]]).unwrap();
        assert_eq!(locator.locate(&PointerEvent::moved([7.0, 40.0], None)), Some(1));

        let bounded = locator.with_radius(5.0);
        assert_eq!(bounded.locate(&PointerEvent::moved([7.0, 40.0], None)), None);
        assert_eq!(bounded.locate(&PointerEvent::moved([8.0, 1.0], None)), Some(1));
    }

    #[test]
    fn test_nearest_partial_keeps_indices() {
        let locator = NearestLocator::from_partial([None, Some([5.0, 5.0]), Some([50.0, 50.0])]);
        assert_eq!(locator.locate(&PointerEvent::moved([0.0, 0.0], None)), Some(1));
    }
}
