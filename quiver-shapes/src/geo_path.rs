//! Projected paths for geographic geometries.

use geo::CoordsIter;
use geo_types::{Coord, Geometry, LineString, Polygon};
use lyon_path::math::point;
use lyon_path::{Path, Winding};
use quiver_scales::projection::MercatorProjection;

use crate::svg::path_to_svg;

/// Renders geometries through a projection. Coordinates are (longitude,
/// latitude) degrees.
#[derive(Debug, Clone, Copy)]
pub struct GeoPathGenerator {
    projection: MercatorProjection,
    /// Radius of the circle drawn for point geometries
    pub point_radius: f32,
}

impl GeoPathGenerator {
    pub fn new(projection: MercatorProjection) -> Self {
        Self {
            projection,
            point_radius: 4.5,
        }
    }

    pub fn projection(&self) -> &MercatorProjection {
        &self.projection
    }

    pub fn path(&self, geometry: &Geometry<f64>) -> Path {
        let mut builder = Path::builder();
        self.add_geometry(&mut builder, geometry);
        builder.build()
    }

    pub fn svg(&self, geometry: &Geometry<f64>) -> String {
        path_to_svg(&self.path(geometry))
    }

    fn project(&self, coord: &Coord<f64>) -> Option<lyon_path::math::Point> {
        let [x, y] = self.projection.project(coord.x, coord.y)?;
        Some(point(x as f32, y as f32))
    }

    fn add_geometry(&self, builder: &mut lyon_path::path::Builder, geometry: &Geometry<f64>) {
        match geometry {
            Geometry::Point(p) => {
                if let Some(center) = self.project(&p.0) {
                    builder.add_circle(center, self.point_radius, Winding::Positive);
                }
            }
            Geometry::MultiPoint(points) => {
                for p in points {
                    self.add_geometry(builder, &Geometry::Point(*p));
                }
            }
            Geometry::Line(line) => {
                self.add_line_string(builder, &LineString::new(vec![line.start, line.end]), false)
            }
            Geometry::LineString(line) => self.add_line_string(builder, line, false),
            Geometry::MultiLineString(lines) => {
                for line in lines {
                    self.add_line_string(builder, line, false);
                }
            }
            Geometry::Polygon(polygon) => self.add_polygon(builder, polygon),
            Geometry::MultiPolygon(polygons) => {
                for polygon in polygons {
                    self.add_polygon(builder, polygon);
                }
            }
            Geometry::Rect(rect) => self.add_polygon(builder, &rect.to_polygon()),
            Geometry::Triangle(triangle) => self.add_polygon(builder, &triangle.to_polygon()),
            Geometry::GeometryCollection(collection) => {
                for geometry in collection {
                    self.add_geometry(builder, geometry);
                }
            }
        }
    }

    fn add_polygon(&self, builder: &mut lyon_path::path::Builder, polygon: &Polygon<f64>) {
        self.add_line_string(builder, polygon.exterior(), true);
        for interior in polygon.interiors() {
            self.add_line_string(builder, interior, true);
        }
    }

    fn add_line_string(
        &self,
        builder: &mut lyon_path::path::Builder,
        line: &LineString<f64>,
        ring: bool,
    ) {
        let mut coords: Vec<_> = line.0.iter().filter_map(|c| self.project(c)).collect();
        if ring && coords.len() > 1 && coords.first() == coords.last() {
            coords.pop();
        }
        let Some((first, rest)) = coords.split_first() else {
            return;
        };
        builder.begin(*first);
        for p in rest {
            builder.line_to(*p);
        }
        builder.end(ring);
    }
}

/// All (longitude, latitude) positions of the given geometries, for fitting
/// a projection to them.
pub fn geometry_points<'a>(
    geometries: impl IntoIterator<Item = &'a Geometry<f64>>,
) -> Vec<[f64; 2]> {
    geometries
        .into_iter()
        .flat_map(|g| g.coords_iter().map(|c| [c.x, c.y]))
        .collect()
}

/// A projection scaled and translated so `geometries` fill `width` x `height`
pub fn fit_projection<'a>(
    width: f64,
    height: f64,
    geometries: impl IntoIterator<Item = &'a Geometry<f64>>,
) -> MercatorProjection {
    MercatorProjection::default().fit_size(width, height, geometry_points(geometries))
}
