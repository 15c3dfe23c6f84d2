use std::fmt::{Debug, Display};
use std::hash::Hash;

use quiver_scales::band::BandScale;
use quiver_scenegraph::node::NodeId;
use quiver_scenegraph::scene_graph::SceneGraph;

use crate::error::GuidesError;

use super::opts::AxisConfig;
use super::{make_axis, AxisTick};

/// One tick per band, centred in the band and labelled with the key
pub fn band_axis_ticks<D>(scale: &BandScale<D>) -> Vec<AxisTick>
where
    D: Debug + Clone + Hash + Eq + Display,
{
    scale
        .domain()
        .filter_map(|key| {
            scale.center(key).map(|position| AxisTick {
                position,
                label: key.to_string(),
            })
        })
        .collect()
}

pub fn make_band_axis<D>(
    scene: &mut SceneGraph,
    parent: NodeId,
    scale: &BandScale<D>,
    config: &AxisConfig,
) -> Result<NodeId, GuidesError>
where
    D: Debug + Clone + Hash + Eq + Display,
{
    let ticks = band_axis_ticks(scale);
    make_axis(scene, parent, &ticks, scale.range(), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use quiver_scales::band::BandScaleConfig;
    use quiver_scenegraph::node::AttrValue;
    use quiver_scenegraph::selector::Selector;

    #[test]
    fn test_ticks_centred_in_bands() {
        let scale = BandScale::try_new(
            vec!["CA", "TX", "NY", "FL"],
            &BandScaleConfig {
                range: (0.0, 400.0),
                ..Default::default()
            }
            .with_padding(0.1),
        )
        .unwrap();
        let ticks = band_axis_ticks(&scale);
        assert_eq!(ticks.len(), 4);
        for (tick, key) in ticks.iter().zip(["CA", "TX", "NY", "FL"]) {
            let start = scale.scale(&key).unwrap();
            assert_approx_eq!(f64, tick.position, start + scale.bandwidth() / 2.0);
            assert_eq!(tick.label, key);
        }
    }

    #[test]
    fn test_band_axis_in_scene() {
        let scale = BandScale::try_new(
            vec!["a", "b"],
            &BandScaleConfig {
                range: (0.0, 100.0),
                ..Default::default()
            },
        )
        .unwrap();
        let mut scene = SceneGraph::new(100.0, 100.0);
        let root = scene.root();
        let axis = make_band_axis(&mut scene, root, &scale, &AxisConfig::bottom(90.0)).unwrap();
        let ticks = scene.select_within(axis, &Selector::class("tick"));
        let transforms: Vec<&str> = ticks
            .iter()
            .filter_map(|t| scene.attr(*t, "transform").and_then(AttrValue::as_text))
            .collect();
        assert_eq!(transforms, vec!["translate(25.5,0)", "translate(75.5,0)"]);
    }
}
