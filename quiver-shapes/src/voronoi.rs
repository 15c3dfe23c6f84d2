//! Nearest-site lookup and Voronoi cells over a set of projected points.

use log::debug;
use lyon_path::math::point;
use lyon_path::Path;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::error::ShapeError;
use crate::svg::path_to_svg;

/// A site with the index of the record it came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Site {
    pub index: usize,
    pub point: [f64; 2],
}

impl RTreeObject for Site {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for Site {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Resolves a position to the site whose Voronoi cell contains it.
#[derive(Debug, Clone)]
pub struct VoronoiLocator {
    rtree: RTree<Site>,
    sites: Vec<Site>,
}

impl VoronoiLocator {
    /// Builds a locator over `points`, where the i-th point is site `i`.
    pub fn try_new(points: impl IntoIterator<Item = [f64; 2]>) -> Result<Self, ShapeError> {
        let sites = points
            .into_iter()
            .enumerate()
            .map(|(index, point)| {
                if point[0].is_finite() && point[1].is_finite() {
                    Ok(Site { index, point })
                } else {
                    Err(ShapeError::NonFinitePoint { index, point })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!("building voronoi locator over {} sites", sites.len());
        Ok(Self {
            rtree: RTree::bulk_load(sites.clone()),
            sites,
        })
    }

    /// Builds a locator from optional points, leaving out missing and
    /// non-finite ones. Site indices still refer to positions in the input.
    pub fn from_partial(points: impl IntoIterator<Item = Option<[f64; 2]>>) -> Self {
        let sites: Vec<Site> = points
            .into_iter()
            .enumerate()
            .filter_map(|(index, point)| {
                let point = point?;
                (point[0].is_finite() && point[1].is_finite()).then_some(Site { index, point })
            })
            .collect();
        Self {
            rtree: RTree::bulk_load(sites.clone()),
            sites,
        }
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// Index of the site nearest to `position`. Equidistant sites resolve to
    /// the lowest index.
    pub fn cell_containing(&self, position: [f64; 2]) -> Option<usize> {
        if !position[0].is_finite() || !position[1].is_finite() {
            return None;
        }
        let mut neighbors = self.rtree.nearest_neighbor_iter_with_distance_2(&position);
        let (nearest, best) = neighbors.next()?;
        let tied = neighbors
            .take_while(|(_, d2)| *d2 <= best)
            .map(|(site, _)| site.index);
        Some(tied.fold(nearest.index, usize::min))
    }

    /// Like [`Self::cell_containing`], but only within `radius` of the site.
    pub fn find(&self, position: [f64; 2], radius: f64) -> Option<usize> {
        let index = self.cell_containing(position)?;
        let site = self.site(index)?;
        (site.distance_2(&position) <= radius * radius).then_some(index)
    }

    fn site(&self, index: usize) -> Option<&Site> {
        self.sites
            .binary_search_by_key(&index, |s| s.index)
            .ok()
            .map(|i| &self.sites[i])
    }

    /// Polygon of the cell for site `index`, clipped to the rectangle
    /// `[[x0, y0], [x1, y1]]`. `None` when the site is unknown or its cell is
    /// empty (a coincident site with a lower index owns it).
    pub fn cell_polygon(&self, index: usize, extent: [[f64; 2]; 2]) -> Option<Vec<[f64; 2]>> {
        let site = self.site(index)?;
        let [[x0, y0], [x1, y1]] = extent;
        let mut polygon = vec![[x0, y0], [x1, y0], [x1, y1], [x0, y1]];

        for other in &self.sites {
            if other.index == index {
                continue;
            }
            if other.point == site.point {
                if other.index < index {
                    return None;
                }
                continue;
            }
            // Keep the half plane closer to `site` than to `other`
            let normal = [
                other.point[0] - site.point[0],
                other.point[1] - site.point[1],
            ];
            let mid = [
                (other.point[0] + site.point[0]) / 2.0,
                (other.point[1] + site.point[1]) / 2.0,
            ];
            let side = |p: &[f64; 2]| (p[0] - mid[0]) * normal[0] + (p[1] - mid[1]) * normal[1];
            polygon = clip(&polygon, side);
            if polygon.is_empty() {
                return None;
            }
        }
        Some(polygon)
    }

    pub fn cell_path(&self, index: usize, extent: [[f64; 2]; 2]) -> Option<Path> {
        let polygon = self.cell_polygon(index, extent)?;
        let (first, rest) = polygon.split_first()?;
        let mut builder = Path::builder();
        builder.begin(point(first[0] as f32, first[1] as f32));
        for p in rest {
            builder.line_to(point(p[0] as f32, p[1] as f32));
        }
        builder.end(true);
        Some(builder.build())
    }

    pub fn cell_svg(&self, index: usize, extent: [[f64; 2]; 2]) -> Option<String> {
        self.cell_path(index, extent).map(|path| path_to_svg(&path))
    }
}

/// Sutherland–Hodgman step keeping the part of `polygon` where `side <= 0`
fn clip(polygon: &[[f64; 2]], side: impl Fn(&[f64; 2]) -> f64) -> Vec<[f64; 2]> {
    let mut out = Vec::with_capacity(polygon.len() + 1);
    for (i, current) in polygon.iter().enumerate() {
        let previous = &polygon[(i + polygon.len() - 1) % polygon.len()];
        let (sc, sp) = (side(current), side(previous));
        if sc <= 0.0 {
            if sp > 0.0 {
                out.push(intersect(previous, current, sp, sc));
            }
            out.push(*current);
        } else if sp <= 0.0 {
            out.push(intersect(previous, current, sp, sc));
        }
    }
    out
}

fn intersect(a: &[f64; 2], b: &[f64; 2], sa: f64, sb: f64) -> [f64; 2] {
    let t = sa / (sa - sb);
    [a[0] + t * (b[0] - a[0]), a[1] + t * (b[1] - a[1])]
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    const EXTENT: [[f64; 2]; 2] = [[0.0, 0.0], [100.0, 100.0]];

    fn area(polygon: &[[f64; 2]]) -> f64 {
        let n = polygon.len();
        (0..n)
            .map(|i| {
                let [x0, y0] = polygon[i];
                let [x1, y1] = polygon[(i + 1) % n];
                x0 * y1 - x1 * y0
            })
            .sum::<f64>()
            .abs()
            / 2.0
    }

    #[test]
    fn test_cell_containing() {
        let locator =
            VoronoiLocator::try_new([[10.0, 10.0], [90.0, 10.0], [50.0, 90.0]]).unwrap();
        assert_eq!(locator.cell_containing([12.0, 15.0]), Some(0));
        assert_eq!(locator.cell_containing([80.0, 0.0]), Some(1));
        assert_eq!(locator.cell_containing([50.0, 70.0]), Some(2));
        // Halfway between sites 0 and 1
        assert_eq!(locator.cell_containing([50.0, 10.0]), Some(0));
        assert_eq!(locator.find([50.0, 70.0], 5.0), None);
        assert_eq!(locator.find([50.0, 88.0], 5.0), Some(2));
    }

    #[test]
    fn test_rejects_non_finite() {
        let err = VoronoiLocator::try_new([[0.0, 0.0], [f64::NAN, 1.0]]).unwrap_err();
        assert!(matches!(err, ShapeError::NonFinitePoint { index: 1, .. }));
    }

    #[test]
    fn test_partial_keeps_input_indices() {
        let locator = VoronoiLocator::from_partial([Some([0.0, 0.0]), None, Some([10.0, 0.0])]);
        assert_eq!(locator.len(), 2);
        assert_eq!(locator.cell_containing([9.0, 0.0]), Some(2));
        assert!(locator.cell_polygon(1, EXTENT).is_none());
    }

    #[test]
    fn test_cells_tile_extent() {
        let locator = VoronoiLocator::try_new([
            [20.0, 20.0],
            [80.0, 30.0],
            [50.0, 80.0],
            [15.0, 70.0],
        ])
        .unwrap();
        let total: f64 = (0..locator.len())
            .filter_map(|i| locator.cell_polygon(i, EXTENT))
            .map(|p| area(&p))
            .sum();
        assert_approx_eq!(f64, total, 10_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_two_sites_split_in_half() {
        let locator = VoronoiLocator::try_new([[25.0, 50.0], [75.0, 50.0]]).unwrap();
        let left = locator.cell_polygon(0, EXTENT).unwrap();
        assert_approx_eq!(f64, area(&left), 5_000.0, epsilon = 1e-9);
        assert!(left.iter().all(|p| p[0] <= 50.0));
        let d = locator.cell_svg(1, EXTENT).unwrap();
        assert!(d.starts_with('M') && d.ends_with('Z'));
    }

    #[test]
    fn test_coincident_sites() {
        let locator = VoronoiLocator::try_new([[30.0, 30.0], [30.0, 30.0]]).unwrap();
        assert_eq!(locator.cell_containing([0.0, 0.0]), Some(0));
        assert!(locator.cell_polygon(0, EXTENT).is_some());
        assert!(locator.cell_polygon(1, EXTENT).is_none());
    }
}
