use anyhow::{Context, Result};
use quiver_common::dimensions::{Dimensions, Margin};
use quiver_common::value::{DataRecord, Dataset};
use quiver_guides::axis::numeric::make_numeric_axis;
use quiver_guides::axis::opts::AxisConfig;
use quiver_scales::array;
use quiver_scales::formatter::ExponentFormatter;
use quiver_scales::numeric::log::{LogScale, LogScaleConfig};
use quiver_scales::numeric::ContinuousNumericScale;
use quiver_scenegraph::join::DataJoin;
use quiver_scenegraph::scene_graph::SceneGraph;

const DOT_RADIUS: f64 = 6.0;
const LABEL_OFFSET: f64 = 15.0;

pub fn default_dimensions() -> Dimensions {
    Dimensions::new(200.0, 500.0).with_margin(Margin::uniform(50.0))
}

fn size(d: &DataRecord) -> Option<f64> {
    d.number("size")
}

/// Sizes of things in the universe on a log axis, smallest at the bottom.
///
/// Drawn in outer coordinates: the margins only shorten the scale's range
/// and place the axis.
pub fn render(data: &Dataset, dims: &Dimensions) -> Result<SceneGraph> {
    let domain = array::extent(data.iter(), size).context("no sizes to plot")?;
    let scale = LogScale::try_new(&LogScaleConfig {
        domain,
        range: (dims.height - dims.margin.bottom, dims.margin.top),
        ..Default::default()
    })?;

    let mut scene = SceneGraph::new(dims.width, dims.height);
    let group = scene.append(scene.root(), "g")?;
    scene.set_attr(group, "font-size", "16px")?;
    scene.set_attr(group, "dominant-baseline", "middle")?;

    let mut circles = DataJoin::for_tag("circle");
    let selection = circles.join(&mut scene, group, data.records())?;
    for bound in selection.merged() {
        let Some(y) = size(&data[bound.index]).map(|v| scale.scale(v)) else {
            continue;
        };
        scene.set_attr(bound.node, "cx", dims.margin.left)?;
        scene.set_attr(bound.node, "cy", y)?;
        scene.set_attr(bound.node, "r", DOT_RADIUS)?;
    }

    let mut labels = DataJoin::for_tag("text");
    let selection = labels.join(&mut scene, group, data.records())?;
    for bound in selection.merged() {
        let d = &data[bound.index];
        let Some(y) = size(d).map(|v| scale.scale(v)) else {
            continue;
        };
        scene.set_attr(bound.node, "x", dims.margin.left + LABEL_OFFSET)?;
        scene.set_attr(bound.node, "y", y)?;
        scene.set_text(bound.node, d.text("name").unwrap_or_default())?;
    }

    let config = AxisConfig {
        origin: [dims.margin.left, 0.0],
        ..AxisConfig::left()
    };
    let root = scene.root();
    make_numeric_axis(
        &mut scene,
        root,
        &scale,
        Some(&ExponentFormatter::default()),
        &config,
    )?;
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn universe() -> Dataset {
        Dataset::new(vec![
            DataRecord::new().with("name", "Proton").with("size", 1e-15),
            DataRecord::new().with("name", "Human").with("size", 1.0),
            DataRecord::new().with("name", "Sun").with("size", 1e15),
        ])
    }

    #[test]
    fn test_positions_in_log_space() {
        let scene = render(&universe(), &default_dimensions()).unwrap();
        let circles = scene.select_all("circle").unwrap();
        let cy = |i: usize| scene.attr(circles[i], "cy").and_then(|v| v.as_number()).unwrap();
        assert_approx_eq!(f64, cy(0), 450.0, epsilon = 1e-9);
        assert_approx_eq!(f64, cy(1), 250.0, epsilon = 1e-9);
        assert_approx_eq!(f64, cy(2), 50.0, epsilon = 1e-9);

        let labels = scene.select_all("text").unwrap();
        assert!(labels
            .iter()
            .any(|t| scene.node(*t).and_then(|n| n.text()) == Some("Human")));
    }

    #[test]
    fn test_non_positive_size_is_an_error() {
        let data = Dataset::new(vec![
            DataRecord::new().with("name", "Nothing").with("size", 0.0),
            DataRecord::new().with("name", "Sun").with("size", 1e15),
        ]);
        assert!(render(&data, &default_dimensions()).is_err());
    }
}
