use anyhow::Result;
use log::{debug, warn};
use quiver_common::color::Color;
use quiver_common::dimensions::{Dimensions, Margin};
use quiver_loader::topojson::Feature;
use quiver_scenegraph::join::DataJoin;
use quiver_scenegraph::scene_graph::SceneGraph;
use quiver_shapes::geo_path::{fit_projection, GeoPathGenerator};

/// Object of a world atlas topology holding one geometry per country
pub const COUNTRIES: &str = "countries";

pub fn default_dimensions() -> Dimensions {
    Dimensions::new(1000.0, 700.0).with_margin(Margin::uniform(20.0))
}

/// Country outlines on a Mercator projection fitted to the plot area
pub fn render(features: &[Feature], dims: &Dimensions) -> Result<SceneGraph> {
    let width = dims.container_width();
    let height = dims.container_height();
    if features.is_empty() {
        warn!("Map has no features to draw");
    }

    let projection = fit_projection(width, height, features.iter().map(|f| &f.geometry));
    debug!(
        "Fitted projection: scale {}, translate {:?}",
        projection.scale(),
        projection.translate()
    );
    let generator = GeoPathGenerator::new(projection);

    let (mut scene, container) = super::frame(dims)?;
    let root = scene.root();
    scene.set_attr(
        root,
        "viewBox",
        format!("0 0 {} {}", dims.width, dims.height),
    )?;

    let mut join: DataJoin<Feature> = DataJoin::for_tag("path");
    let selection = join.join(&mut scene, container, features)?;
    for bound in selection.merged() {
        let feature = &features[bound.index];
        scene.set_attr(bound.node, "d", generator.path(&feature.geometry))?;
        scene.set_attr(bound.node, "stroke", Color::from_rgb8(0x4a, 0x4a, 0x4a))?;
        scene.set_attr(bound.node, "stroke-width", 0.5)?;
        scene.set_attr(bound.node, "fill", "#eee")?;
        if let Some(name) = feature.name() {
            scene.set_attr(bound.node, "data-name", name)?;
        }
    }
    Ok(scene)
}
