use quiver_scales::formatter::{DateFormatter, MultiTimeFormatter};
use quiver_scales::time::TimeScale;
use quiver_scenegraph::node::NodeId;
use quiver_scenegraph::scene_graph::SceneGraph;

use crate::error::GuidesError;

use super::opts::AxisConfig;
use super::{make_axis, AxisTick};

/// Calendar-aligned ticks of a time scale; labels default to the multi-scale
/// format (years, then months, then days, ...).
pub fn time_axis_ticks(
    scale: &TimeScale,
    formatter: Option<&dyn DateFormatter>,
    count: Option<f64>,
) -> Vec<AxisTick> {
    let formatter = formatter.unwrap_or(&MultiTimeFormatter);
    scale
        .ticks(count)
        .into_iter()
        .map(|t| AxisTick {
            position: scale.scale(t),
            label: formatter.format(t),
        })
        .collect()
}

pub fn make_time_axis(
    scene: &mut SceneGraph,
    parent: NodeId,
    scale: &TimeScale,
    formatter: Option<&dyn DateFormatter>,
    config: &AxisConfig,
) -> Result<NodeId, GuidesError> {
    let ticks = time_axis_ticks(scale, formatter, config.tick_count);
    make_axis(scene, parent, &ticks, scale.range(), config)
}
