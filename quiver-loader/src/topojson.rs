//! TopoJSON topologies decoded into geographic features.
//!
//! Arcs are shared between geometries and, when the topology is quantized,
//! stored as integer deltas. Geometries refer to arcs by index, with the
//! one's complement `!i` (i.e. `-i - 1`) meaning arc `i` traversed backwards.

use std::path::Path;

use geo_types::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
use indexmap::IndexMap;
use log::{debug, warn};
use quiver_common::value::DataRecord;
use serde::Deserialize;

use crate::error::LoadError;
use crate::json::{read, record_from_json};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

impl Transform {
    fn apply(&self, x: f64, y: f64) -> [f64; 2] {
        [
            x * self.scale[0] + self.translate[0],
            y * self.scale[1] + self.translate[1],
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub transform: Option<Transform>,
    #[serde(default)]
    pub arcs: Vec<Vec<Vec<f64>>>,
    pub objects: IndexMap<String, TopoObject>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopoObject {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub properties: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(flatten)]
    pub geometry: TopoGeometry,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum TopoGeometry {
    Point { coordinates: Vec<f64> },
    MultiPoint { coordinates: Vec<Vec<f64>> },
    LineString { arcs: Vec<i64> },
    MultiLineString { arcs: Vec<Vec<i64>> },
    Polygon { arcs: Vec<Vec<i64>> },
    MultiPolygon { arcs: Vec<Vec<Vec<i64>>> },
    GeometryCollection { geometries: Vec<TopoObject> },
}

/// A decoded geometry with its identifier and properties
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<String>,
    pub properties: DataRecord,
    pub geometry: Geometry<f64>,
}

impl Feature {
    /// The `name` property, as used by world atlases
    pub fn name(&self) -> Option<&str> {
        self.properties.text("name")
    }
}

impl Topology {
    pub fn parse(bytes: &[u8]) -> Result<Self, LoadError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Arcs in absolute coordinates, with quantization deltas and the
    /// transform applied
    fn decoded_arcs(&self) -> Vec<Vec<[f64; 2]>> {
        self.arcs
            .iter()
            .map(|arc| match &self.transform {
                Some(transform) => {
                    let (mut x, mut y) = (0.0, 0.0);
                    arc.iter()
                        .filter(|p| p.len() >= 2)
                        .map(|p| {
                            x += p[0];
                            y += p[1];
                            transform.apply(x, y)
                        })
                        .collect()
                }
                None => arc
                    .iter()
                    .filter(|p| p.len() >= 2)
                    .map(|p| [p[0], p[1]])
                    .collect(),
            })
            .collect()
    }

    fn position(&self, p: &[f64]) -> Option<Coord<f64>> {
        let (x, y) = (*p.first()?, *p.get(1)?);
        let [x, y] = match &self.transform {
            Some(t) => t.apply(x, y),
            None => [x, y],
        };
        Some(Coord { x, y })
    }

    /// Converts the object named `name` into features. A geometry collection
    /// yields one feature per member, any other geometry a single feature.
    pub fn features(&self, name: &str) -> Result<Vec<Feature>, LoadError> {
        let object = self
            .objects
            .get(name)
            .ok_or_else(|| LoadError::MissingObject(name.to_string()))?;
        let arcs = self.decoded_arcs();
        let decoder = Decoder {
            topology: self,
            arcs: &arcs,
        };
        let features = match &object.geometry {
            TopoGeometry::GeometryCollection { geometries } => geometries
                .iter()
                .map(|g| decoder.feature(g))
                .collect::<Result<Vec<_>, _>>()?,
            _ => vec![decoder.feature(object)?],
        };
        debug!("Decoded {} features from object {name:?}", features.len());
        Ok(features)
    }
}

struct Decoder<'a> {
    topology: &'a Topology,
    arcs: &'a [Vec<[f64; 2]>],
}

impl Decoder<'_> {
    fn feature(&self, object: &TopoObject) -> Result<Feature, LoadError> {
        let id = object.id.as_ref().map(|id| match id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        });
        let properties = object
            .properties
            .clone()
            .map(record_from_json)
            .unwrap_or_default();
        Ok(Feature {
            id,
            properties,
            geometry: self.geometry(&object.geometry)?,
        })
    }

    fn arc(&self, index: i64) -> Result<Vec<[f64; 2]>, LoadError> {
        let (i, reversed) = if index < 0 {
            (!index, true)
        } else {
            (index, false)
        };
        let mut points = usize::try_from(i)
            .ok()
            .and_then(|i| self.arcs.get(i))
            .ok_or(LoadError::InvalidArc(index))?
            .clone();
        if reversed {
            points.reverse();
        }
        Ok(points)
    }

    /// Joins arcs end to start; each arc begins where the previous one ended
    fn line(&self, arcs: &[i64]) -> Result<Vec<Coord<f64>>, LoadError> {
        let mut points: Vec<[f64; 2]> = Vec::new();
        for (k, index) in arcs.iter().enumerate() {
            let arc = self.arc(*index)?;
            let skip = usize::from(k > 0 && !points.is_empty());
            points.extend(arc.into_iter().skip(skip));
        }
        Ok(points.into_iter().map(|[x, y]| Coord { x, y }).collect())
    }

    fn ring(&self, arcs: &[i64]) -> Result<LineString<f64>, LoadError> {
        let mut points = self.line(arcs)?;
        if let Some(first) = points.first().copied() {
            // Degenerate rings are padded to the minimum closed ring size
            while points.len() < 4 {
                points.push(first);
            }
        }
        Ok(LineString::new(points))
    }

    fn polygon(&self, rings: &[Vec<i64>]) -> Result<Polygon<f64>, LoadError> {
        let mut rings = rings.iter().map(|r| self.ring(r));
        let exterior = match rings.next() {
            Some(ring) => ring?,
            None => LineString::new(vec![]),
        };
        let interiors = rings.collect::<Result<Vec<_>, _>>()?;
        Ok(Polygon::new(exterior, interiors))
    }

    fn geometry(&self, geometry: &TopoGeometry) -> Result<Geometry<f64>, LoadError> {
        Ok(match geometry {
            TopoGeometry::Point { coordinates } => match self.topology.position(coordinates) {
                Some(c) => Geometry::Point(Point(c)),
                None => {
                    warn!("Point with fewer than two coordinates");
                    Geometry::GeometryCollection(GeometryCollection::default())
                }
            },
            TopoGeometry::MultiPoint { coordinates } => Geometry::MultiPoint(MultiPoint::new(
                coordinates
                    .iter()
                    .filter_map(|p| self.topology.position(p))
                    .map(Point)
                    .collect(),
            )),
            TopoGeometry::LineString { arcs } => {
                Geometry::LineString(LineString::new(self.line(arcs)?))
            }
            TopoGeometry::MultiLineString { arcs } => Geometry::MultiLineString(MultiLineString::new(
                arcs.iter()
                    .map(|a| self.line(a).map(LineString::new))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            TopoGeometry::Polygon { arcs } => Geometry::Polygon(self.polygon(arcs)?),
            TopoGeometry::MultiPolygon { arcs } => Geometry::MultiPolygon(MultiPolygon::new(
                arcs.iter()
                    .map(|p| self.polygon(p))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            TopoGeometry::GeometryCollection { geometries } => {
                Geometry::GeometryCollection(GeometryCollection::new_from(
                    geometries
                        .iter()
                        .map(|g| self.geometry(&g.geometry))
                        .collect::<Result<Vec<_>, _>>()?,
                ))
            }
        })
    }
}

pub async fn try_load_topology(path: impl AsRef<Path>) -> Result<Topology, LoadError> {
    let path = path.as_ref();
    let topology = Topology::parse(&read(path).await?)?;
    debug!(
        "Loaded topology with {} arcs and objects {:?} from {}",
        topology.arcs.len(),
        topology.objects.keys().collect::<Vec<_>>(),
        path.display()
    );
    Ok(topology)
}

/// Loads a topology, logging and returning `None` on failure
pub async fn load_topology(path: impl AsRef<Path>) -> Option<Topology> {
    let path = path.as_ref();
    match try_load_topology(path).await {
        Ok(topology) => Some(topology),
        Err(err) => {
            warn!("Failed to load {}: {err}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::coord;

    // Two squares sharing the edge x = 1, quantized with a 0.5 scale
    const TOPOLOGY: &str = r#"{
        "type": "Topology",
        "transform": {"scale": [0.5, 0.5], "translate": [10, 20]},
        "arcs": [
            [[2, 0], [0, 2]],
            [[2, 2], [-2, 0], [0, -2], [2, 0]],
            [[2, 0], [2, 0], [0, 2], [-2, 0]]
        ],
        "objects": {
            "countries": {
                "type": "GeometryCollection",
                "geometries": [
                    {"type": "Polygon", "id": "004", "properties": {"name": "West"}, "arcs": [[0, 1]]},
                    {"type": "Polygon", "id": 8, "properties": {"name": "East"}, "arcs": [[2, -1]]},
                    {"type": "MultiPolygon", "arcs": [[[0, 1]], [[2, -1]]]},
                    {"type": "Point", "coordinates": [4, 4]}
                ]
            },
            "single": {"type": "LineString", "arcs": [0]}
        }
    }"#;

    fn exterior(geometry: &Geometry<f64>) -> Vec<Coord<f64>> {
        match geometry {
            Geometry::Polygon(p) => p.exterior().0.clone(),
            other => panic!("expected a polygon, found {other:?}"),
        }
    }

    #[test]
    fn test_features_from_collection() {
        let topology = Topology::parse(TOPOLOGY.as_bytes()).unwrap();
        let features = topology.features("countries").unwrap();
        assert_eq!(features.len(), 4);

        assert_eq!(features[0].id.as_deref(), Some("004"));
        assert_eq!(features[0].name(), Some("West"));
        assert_eq!(
            exterior(&features[0].geometry),
            vec![
                coord! { x: 11.0, y: 20.0 },
                coord! { x: 11.0, y: 21.0 },
                coord! { x: 10.0, y: 21.0 },
                coord! { x: 10.0, y: 20.0 },
                coord! { x: 11.0, y: 20.0 },
            ]
        );

        // Numeric ids are stringified; the shared arc is walked backwards
        assert_eq!(features[1].id.as_deref(), Some("8"));
        assert_eq!(
            exterior(&features[1].geometry),
            vec![
                coord! { x: 11.0, y: 20.0 },
                coord! { x: 12.0, y: 20.0 },
                coord! { x: 12.0, y: 21.0 },
                coord! { x: 11.0, y: 21.0 },
                coord! { x: 11.0, y: 20.0 },
            ]
        );

        match &features[2].geometry {
            Geometry::MultiPolygon(mp) => assert_eq!(mp.0.len(), 2),
            other => panic!("expected a multipolygon, found {other:?}"),
        }
        assert_eq!(features[3].geometry, Geometry::Point(Point::new(12.0, 22.0)));
        assert!(features[2].name().is_none());
    }

    #[test]
    fn test_single_object_and_errors() {
        let topology = Topology::parse(TOPOLOGY.as_bytes()).unwrap();
        let single = topology.features("single").unwrap();
        assert_eq!(single.len(), 1);
        assert!(matches!(single[0].geometry, Geometry::LineString(ref l) if l.0.len() == 2));

        assert!(matches!(
            topology.features("land"),
            Err(LoadError::MissingObject(name)) if name == "land"
        ));

        let bad = Topology::parse(
            br#"{"type": "Topology", "arcs": [], "objects": {"x": {"type": "LineString", "arcs": [3]}}}"#,
        )
        .unwrap();
        assert!(matches!(bad.features("x"), Err(LoadError::InvalidArc(3))));
    }
}
