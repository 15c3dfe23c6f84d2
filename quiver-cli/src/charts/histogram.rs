use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info};
use quiver_common::color::Color;
use quiver_common::dimensions::{Dimensions, Margin};
use quiver_common::value::{DataRecord, Dataset};
use quiver_guides::axis::numeric::make_numeric_axis;
use quiver_guides::axis::opts::AxisConfig;
use quiver_scales::array;
use quiver_scales::numeric::linear::{LinearScale, LinearScaleConfig};
use quiver_scales::numeric::ContinuousNumericScale;
use quiver_scenegraph::join::DataJoin;
use quiver_scenegraph::node::{AttrValue, NodeId};
use quiver_scenegraph::scene_graph::SceneGraph;
use quiver_shapes::bin::{bin, BinConfig, Thresholds};
use quiver_transition::scheduler::{TransitionOptions, TransitionScheduler};
use strum::{Display, EnumString, VariantNames};

const BAR_PADDING: f64 = 1.0;
const LABEL_GAP: f64 = 10.0;
const BIN_COUNT: usize = 10;
const FRAME: Duration = Duration::from_millis(16);
/// Upper bound on how long one redraw may animate before it is cut off
const SETTLE_LIMIT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, VariantNames)]
#[strum(serialize_all = "camelCase")]
pub enum Metric {
    #[default]
    Humidity,
    Temperature,
    DewPoint,
    WindSpeed,
    CloudCover,
    Ozone,
}

impl Metric {
    /// Path of the reading inside a weather record
    pub fn path(&self) -> String {
        format!("currently.{self}")
    }
}

pub fn default_dimensions() -> Dimensions {
    Dimensions::new(800.0, 400.0).with_margin(Margin::uniform(50.0))
}

/// What a bar and its label are bound to
#[derive(Debug, Clone, Copy, PartialEq)]
struct BinSummary {
    x0: f64,
    x1: f64,
    count: usize,
}

/// A histogram that can be redrawn for another metric in place.
///
/// Bars and labels are joined by position, so a redraw updates the bars
/// that still have a bin, grows new ones up from the baseline and shrinks
/// leftover ones before removing them. Transitions are ticked to completion
/// at the end of every [`Histogram::draw`].
pub struct Histogram {
    data: Dataset,
    dims: Dimensions,
    scene: SceneGraph,
    container: NodeId,
    bars: NodeId,
    labels: NodeId,
    x_axis: Option<NodeId>,
    bar_join: DataJoin<BinSummary>,
    label_join: DataJoin<BinSummary>,
    scheduler: TransitionScheduler,
    transition: TransitionOptions,
    clock: Duration,
}

impl Histogram {
    pub fn try_new(data: Dataset, dims: Dimensions) -> Result<Self> {
        let (mut scene, container) = super::frame(&dims)?;
        let bars = scene.append(container, "g")?;
        scene.classed(bars, "bars", true)?;
        let labels = scene.append(container, "g")?;
        scene.classed(labels, "bar-labels", true)?;
        scene.set_attr(labels, "text-anchor", "middle")?;
        Ok(Self {
            data,
            dims,
            scene,
            container,
            bars,
            labels,
            x_axis: None,
            bar_join: DataJoin::for_tag("rect"),
            label_join: DataJoin::for_tag("text"),
            scheduler: TransitionScheduler::new(),
            transition: TransitionOptions::default().with_duration(Duration::from_millis(1000)),
            clock: Duration::ZERO,
        })
    }

    pub fn with_transition(mut self, options: TransitionOptions) -> Self {
        self.transition = options;
        self
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn into_scene(self) -> SceneGraph {
        self.scene
    }

    pub fn draw(&mut self, metric: Metric) -> Result<()> {
        let path = metric.path();
        let value = |d: &DataRecord| d.number(&path);
        let extent = array::extent(self.data.iter(), value)
            .with_context(|| format!("no {metric} readings to bin"))?;

        let width = self.dims.container_width();
        let height = self.dims.container_height();
        let x_scale = LinearScale::new(&LinearScaleConfig {
            domain: extent,
            range: (0.0, width),
            nice: Some(10),
            ..Default::default()
        });
        let bins: Vec<BinSummary> = bin(
            self.data.records(),
            value,
            &BinConfig {
                domain: Some(x_scale.domain()),
                thresholds: Thresholds::Count(BIN_COUNT),
            },
        )?
        .iter()
        .map(|b| BinSummary {
            x0: b.x0,
            x1: b.x1,
            count: b.len(),
        })
        .collect();
        let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0);
        let y_scale = LinearScale::new(&LinearScaleConfig {
            domain: (0.0, max_count as f64),
            range: (height, 0.0),
            nice: Some(10),
            ..Default::default()
        });
        info!("Drawing {metric} histogram with {} bins", bins.len());

        let group = self.scheduler.timing_group();
        let options = self.transition.clone().with_group(group);

        let selection = self.bar_join.join(&mut self.scene, self.bars, &bins)?;
        for bound in &selection.entering {
            // New bars start flat on the baseline at their final position
            let b = &bins[bound.index];
            self.scene.set_attr(bound.node, "x", x_scale.scale(b.x0))?;
            self.scene.set_attr(bound.node, "width", bar_width(&x_scale, b))?;
            self.scene.set_attr(bound.node, "y", height)?;
            self.scene.set_attr(bound.node, "height", 0.0)?;
            self.scene.set_attr(bound.node, "fill", Color::from_rgb8(0x01, 0xc5, 0xc4))?;
        }
        for bound in selection.merged() {
            let b = &bins[bound.index];
            let top = y_scale.scale(b.count as f64);
            self.scheduler.animate(
                &self.scene,
                bound.node,
                [
                    ("x", AttrValue::Number(x_scale.scale(b.x0))),
                    ("width", AttrValue::Number(bar_width(&x_scale, b))),
                    ("y", AttrValue::Number(top)),
                    ("height", AttrValue::Number(height - top)),
                ],
                options.clone(),
            )?;
        }
        for node in &selection.exiting {
            self.scheduler.animate(
                &self.scene,
                *node,
                [
                    ("y", AttrValue::Number(height)),
                    ("height", AttrValue::Number(0.0)),
                ],
                options.clone().removing(),
            )?;
        }

        let selection = self.label_join.join(&mut self.scene, self.labels, &bins)?;
        for bound in selection.merged() {
            let b = &bins[bound.index];
            let x = x_scale.scale(b.x0) + (x_scale.scale(b.x1) - x_scale.scale(b.x0)) / 2.0;
            let y = y_scale.scale(b.count as f64) - LABEL_GAP;
            self.scene.set_text(bound.node, b.count.to_string())?;
            if selection.entering.contains(&bound) {
                self.scene.set_attr(bound.node, "x", x)?;
                self.scene.set_attr(bound.node, "y", y)?;
            } else {
                self.scheduler.animate(
                    &self.scene,
                    bound.node,
                    [("x", AttrValue::Number(x)), ("y", AttrValue::Number(y))],
                    options.clone(),
                )?;
            }
        }
        self.label_join.remove_exiting(&mut self.scene);

        if let Some(axis) = self.x_axis.take() {
            self.scene.remove(axis)?;
        }
        self.x_axis = Some(make_numeric_axis(
            &mut self.scene,
            self.container,
            &x_scale,
            None,
            &AxisConfig::bottom(height),
        )?);

        let end = self.scheduler.run_until_idle(
            &mut self.scene,
            self.clock,
            FRAME,
            self.clock + SETTLE_LIMIT,
        );
        debug!("{metric} transitions settled after {:?}", end - self.clock);
        self.clock = end + FRAME;
        Ok(())
    }
}

fn bar_width(x_scale: &LinearScale, b: &BinSummary) -> f64 {
    (x_scale.scale(b.x1) - x_scale.scale(b.x0) - BAR_PADDING).max(0.0)
}

/// Draws each metric in turn into the same chart; the scene shows the last one
pub fn render(data: &Dataset, dims: &Dimensions, metrics: &[Metric]) -> Result<SceneGraph> {
    let mut histogram = Histogram::try_new(data.clone(), *dims)?;
    if metrics.is_empty() {
        histogram.draw(Metric::default())?;
    }
    for metric in metrics {
        histogram.draw(*metric)?;
    }
    Ok(histogram.into_scene())
}
