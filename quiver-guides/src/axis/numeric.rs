use quiver_scales::formatter::{DefaultNumberFormatter, NumberFormatter};
use quiver_scales::numeric::ContinuousNumericScale;
use quiver_scenegraph::node::NodeId;
use quiver_scenegraph::scene_graph::SceneGraph;

use crate::error::GuidesError;

use super::opts::AxisConfig;
use super::{make_axis, AxisTick};

/// Ticks of a continuous scale labelled through `formatter`, or with just
/// enough decimals to tell neighbouring ticks apart when no formatter is given.
pub fn numeric_axis_ticks(
    scale: &impl ContinuousNumericScale,
    formatter: Option<&dyn NumberFormatter>,
    count: Option<f64>,
) -> Vec<AxisTick> {
    let values = scale.ticks(count);
    let default_formatter;
    let formatter = match formatter {
        Some(formatter) => formatter,
        None => {
            let step = match values.as_slice() {
                [a, b, ..] => (b - a).abs(),
                _ => 1.0,
            };
            default_formatter = DefaultNumberFormatter::for_step(step);
            &default_formatter as &dyn NumberFormatter
        }
    };
    values
        .into_iter()
        .map(|v| AxisTick {
            position: scale.scale(v),
            label: formatter.format(v),
        })
        .collect()
}

pub fn make_numeric_axis(
    scene: &mut SceneGraph,
    parent: NodeId,
    scale: &impl ContinuousNumericScale,
    formatter: Option<&dyn NumberFormatter>,
    config: &AxisConfig,
) -> Result<NodeId, GuidesError> {
    let ticks = numeric_axis_ticks(scale, formatter, config.tick_count);
    make_axis(scene, parent, &ticks, scale.range(), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use quiver_scales::formatter::{CurrencyFormatter, PercentFormatter};
    use quiver_scales::numeric::linear::{LinearScale, LinearScaleConfig};
    use quiver_scales::numeric::log::{LogScale, LogScaleConfig};
    use quiver_scenegraph::selector::Selector;

    fn labels(scene: &SceneGraph, axis: NodeId) -> Vec<String> {
        scene
            .select_within(axis, &Selector::class("tick"))
            .into_iter()
            .filter_map(|tick| {
                scene
                    .select_within(tick, &Selector::tag("text"))
                    .first()
                    .and_then(|t| scene.get(*t).ok())
                    .and_then(|n| n.text())
                    .map(str::to_string)
            })
            .collect()
    }

    #[test]
    fn test_linear_default_labels() {
        let scale = LinearScale::new(&LinearScaleConfig {
            domain: (0.0, 1.0),
            range: (0.0, 500.0),
            ..Default::default()
        });
        let ticks = numeric_axis_ticks(&scale, None, Some(5.0));
        let labels: Vec<&str> = ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["0.0", "0.2", "0.4", "0.6", "0.8", "1.0"]);
        assert_approx_eq!(f64, ticks[1].position, 100.0);
    }

    #[test]
    fn test_percent_axis_in_scene() {
        let scale = LinearScale::new(&LinearScaleConfig {
            domain: (0.0, 1.0),
            range: (300.0, 0.0),
            ..Default::default()
        });
        let mut scene = SceneGraph::new(400.0, 400.0);
        let root = scene.root();
        let formatter = PercentFormatter::default();
        let axis = make_numeric_axis(
            &mut scene,
            root,
            &scale,
            Some(&formatter),
            &AxisConfig::left().with_tick_count(2.0),
        )
        .unwrap();
        assert_eq!(labels(&scene, axis), vec!["0%", "50%", "100%"]);
    }

    #[test]
    fn test_log_axis_with_currency() {
        let scale = LogScale::new(&LogScaleConfig {
            domain: (1.0, 1000.0),
            range: (0.0, 300.0),
            ..Default::default()
        });
        let formatter = CurrencyFormatter {
            precision: 0,
            ..Default::default()
        };
        let ticks = numeric_axis_ticks(&scale, Some(&formatter), Some(3.0));
        let labels: Vec<&str> = ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["$1", "$10", "$100", "$1,000"]);
        assert_approx_eq!(f64, ticks[2].position, 200.0, epsilon = 1e-9);
    }
}
