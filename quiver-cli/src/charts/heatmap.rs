use anyhow::Result;
use log::warn;
use quiver_common::color::Color;
use quiver_common::dimensions::Dimensions;
use quiver_common::value::Dataset;
use quiver_scales::array;
use quiver_scales::quantile::QuantileScale;
use quiver_scales::quantize::{QuantizeScale, QuantizeScaleConfig};
use quiver_scales::threshold::ThresholdScale;
use quiver_scenegraph::join::DataJoin;
use quiver_scenegraph::node::translate;
use quiver_scenegraph::scene_graph::SceneGraph;
use strum::{Display, EnumString, VariantNames};

/// Pitch of the grid; each box leaves a gap of [`BOX_GAP`] to the next
pub const CELL_SIZE: f64 = 30.0;
pub const BOX_GAP: f64 = 3.0;
const INSET: f64 = 2.0;

const PALETTE: [Color; 3] = [
    Color::WHITE,
    Color::new(1.0, 0.753, 0.796, 1.0),
    Color::new(1.0, 0.0, 0.0, 1.0),
];

/// Household income boundaries for the threshold coloring
pub const INCOME_THRESHOLDS: [f64; 2] = [45200.0, 135600.0];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, VariantNames)]
#[strum(serialize_all = "snake_case")]
pub enum ColorScaleKind {
    /// Equal-width value ranges
    #[default]
    Quantize,
    /// Equal numbers of boxes per color
    Quantile,
    /// Fixed income boundaries
    Threshold,
}

pub fn default_dimensions() -> Dimensions {
    Dimensions::new(600.0, 150.0)
}

enum BoxColor {
    Quantize(QuantizeScale<Color>),
    Quantile(QuantileScale<Color>),
    Threshold(ThresholdScale<Color>),
}

impl BoxColor {
    fn try_new(kind: ColorScaleKind, values: &[f64]) -> Result<Option<Self>> {
        let Some(domain) = array::extent(values.iter(), |v| Some(*v)) else {
            return Ok(None);
        };
        let palette = PALETTE.to_vec();
        Ok(Some(match kind {
            ColorScaleKind::Quantize => BoxColor::Quantize(QuantizeScale::try_new(
                &QuantizeScaleConfig {
                    domain,
                    ..Default::default()
                },
                palette,
            )?),
            ColorScaleKind::Quantile => BoxColor::Quantile(QuantileScale::try_new(values, palette)?),
            ColorScaleKind::Threshold => {
                BoxColor::Threshold(ThresholdScale::try_new(INCOME_THRESHOLDS.to_vec(), palette)?)
            }
        }))
    }

    fn scale(&self, value: f64) -> Option<Color> {
        match self {
            BoxColor::Quantize(scale) => scale.scale(value),
            BoxColor::Quantile(scale) => scale.scale(value),
            BoxColor::Threshold(scale) => scale.scale(value),
        }
    }
}

/// One box per value, filled left to right and wrapped into rows
pub fn render(data: &Dataset, dims: &Dimensions, kind: ColorScaleKind) -> Result<SceneGraph> {
    let values: Vec<Option<f64>> = data.iter().map(|d| d.number("value")).collect();
    let defined: Vec<f64> = values.iter().flatten().copied().collect();
    if defined.len() < values.len() {
        warn!("{} boxes have no value and keep the default fill", values.len() - defined.len());
    }
    let color = BoxColor::try_new(kind, &defined)?;

    let columns = ((dims.width / CELL_SIZE).floor() as usize).max(1);
    let mut scene = SceneGraph::new(dims.width, dims.height);
    let group = scene.append(scene.root(), "g")?;
    scene.set_attr(group, "transform", translate(INSET, INSET))?;
    scene.set_attr(group, "stroke", Color::BLACK)?;
    scene.set_attr(group, "fill", "#ddd")?;

    let mut join = DataJoin::for_tag("rect");
    let selection = join.join(&mut scene, group, &values)?;
    for bound in selection.merged() {
        let i = bound.index;
        scene.set_attr(bound.node, "x", (i % columns) as f64 * CELL_SIZE)?;
        scene.set_attr(bound.node, "y", (i / columns) as f64 * CELL_SIZE)?;
        scene.set_attr(bound.node, "width", CELL_SIZE - BOX_GAP)?;
        scene.set_attr(bound.node, "height", CELL_SIZE - BOX_GAP)?;
        let fill = values[i].zip(color.as_ref()).and_then(|(v, c)| c.scale(v));
        if let Some(fill) = fill {
            scene.set_attr(bound.node, "fill", fill)?;
        }
    }
    Ok(scene)
}
