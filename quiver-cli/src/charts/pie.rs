use anyhow::Result;
use quiver_common::color::Color;
use quiver_common::dimensions::{Dimensions, Margin};
use quiver_common::value::{DataRecord, Dataset};
use quiver_scales::color::{interpolate_spectral, quantize_colors};
use quiver_scales::ordinal::OrdinalScale;
use quiver_scenegraph::join::DataJoin;
use quiver_scenegraph::node::translate;
use quiver_scenegraph::scene_graph::SceneGraph;
use quiver_shapes::arc::{ArcGenerator, Pie, PieSlice, PieSort};

/// Labels sit on a ring this far from the center
const LABEL_RADIUS: f64 = 200.0;
/// Slices narrower than this (in radians) only get their name
const MIN_VALUE_LABEL_ANGLE: f64 = 0.25;

pub fn default_dimensions() -> Dimensions {
    Dimensions::new(600.0, 600.0).with_margin(Margin::uniform(10.0))
}

fn name(d: &DataRecord) -> String {
    d.get("name").map(ToString::to_string).unwrap_or_default()
}

/// Population share per age group, slices in input order
pub fn render(data: &Dataset, dims: &Dimensions) -> Result<SceneGraph> {
    let width = dims.container_width();
    let height = dims.container_height();
    let radius = width / 2.0;

    let names: Vec<String> = data.iter().map(name).collect();
    let values: Vec<f64> = data
        .iter()
        .map(|d| d.number("value").unwrap_or(0.0))
        .collect();
    let slices = Pie {
        sort: PieSort::Preserve,
        ..Default::default()
    }
    .layout(&values);

    let colors = OrdinalScale::try_new(
        names.clone(),
        quantize_colors(interpolate_spectral, names.len().max(1)),
    )?
    .with_unknown(Color::from_rgb8(0xcc, 0xcc, 0xcc));
    let slice_arc = ArcGenerator::new(0.0, radius);
    let label_arc = ArcGenerator::new(LABEL_RADIUS, radius);

    let (mut scene, container) = super::frame(dims)?;
    let center = translate(width / 2.0, height / 2.0);

    let arcs = scene.append(container, "g")?;
    scene.classed(arcs, "arcs", true)?;
    scene.set_attr(arcs, "transform", center.clone())?;
    let mut join: DataJoin<PieSlice> = DataJoin::for_tag("path");
    let selection = join.join(&mut scene, arcs, &slices)?;
    for bound in selection.merged() {
        let slice = &slices[bound.index];
        scene.set_attr(bound.node, "d", slice_arc.slice_path(slice))?;
        if let Some(fill) = colors.scale(&names[slice.index]) {
            scene.set_attr(bound.node, "fill", fill)?;
        }
    }

    let labels = scene.append(container, "g")?;
    scene.classed(labels, "labels", true)?;
    scene.set_attr(labels, "transform", center)?;
    let mut join: DataJoin<PieSlice> = DataJoin::for_tag("text");
    let selection = join.join(&mut scene, labels, &slices)?;
    for bound in selection.entering {
        let slice = &slices[bound.index];
        let [x, y] = label_arc.centroid(slice);
        scene.set_attr(bound.node, "transform", translate(x, y))?;

        let title = scene.append(bound.node, "tspan")?;
        scene.set_attr(title, "font-weight", "bold")?;
        scene.set_attr(title, "y", -4.0)?;
        scene.set_text(title, names[slice.index].as_str())?;

        if slice.angle() > MIN_VALUE_LABEL_ANGLE {
            let value = scene.append(bound.node, "tspan")?;
            scene.set_attr(value, "y", 9.0)?;
            scene.set_attr(value, "x", 0.0)?;
            let raw = data[slice.index]
                .get("value")
                .map(ToString::to_string)
                .unwrap_or_default();
            scene.set_text(value, raw)?;
        }
    }
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiver_scenegraph::node::{AttrValue, NodeId};
    use quiver_scenegraph::selector::Selector;

    fn groups() -> Dataset {
        Dataset::new(
            [("<10", 400.0), ("10-19", 500.0), ("≥80", 5.0)]
                .into_iter()
                .map(|(name, value)| DataRecord::new().with("name", name).with("value", value))
                .collect(),
        )
    }

    #[test]
    fn test_slices_and_colors() {
        let scene = render(&groups(), &default_dimensions()).unwrap();
        let arcs = scene.select("g.arcs").unwrap();
        let paths = scene.select_children(arcs, &Selector::tag("path"));
        assert_eq!(paths.len(), 3);
        assert_eq!(
            scene.attr(paths[0], "fill"),
            Some(&AttrValue::Color(interpolate_spectral(0.0)))
        );
        assert_eq!(
            scene.attr(paths[2], "fill"),
            Some(&AttrValue::Color(interpolate_spectral(1.0)))
        );
    }

    #[test]
    fn test_narrow_slice_drops_value_label() {
        let scene = render(&groups(), &default_dimensions()).unwrap();
        let labels = scene.select("g.labels").unwrap();
        let texts = scene.select_children(labels, &Selector::tag("text"));
        let tspans = |t: NodeId| scene.children(t).len();
        assert_eq!(tspans(texts[0]), 2);
        assert_eq!(tspans(texts[2]), 1);

        let value = scene.children(texts[1])[1];
        assert_eq!(scene.node(value).and_then(|n| n.text()), Some("500"));
        let title = scene.children(texts[2])[0];
        assert_eq!(scene.node(title).and_then(|n| n.text()), Some("≥80"));
    }
}
