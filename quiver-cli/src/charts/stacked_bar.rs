use anyhow::Result;
use quiver_common::color::Color;
use quiver_common::dimensions::{Dimensions, Margin};
use quiver_common::value::{DataRecord, Dataset, Value};
use quiver_guides::axis::band::make_band_axis;
use quiver_guides::axis::numeric::make_numeric_axis;
use quiver_guides::axis::opts::AxisConfig;
use quiver_loader::dsv::CsvOptions;
use quiver_scales::band::{BandScale, BandScaleConfig};
use quiver_scales::color::{interpolate_spectral, quantize_colors, scheme_spectral};
use quiver_scales::formatter::SiFormatter;
use quiver_scales::numeric::linear::{LinearScale, LinearScaleConfig};
use quiver_scales::numeric::ContinuousNumericScale;
use quiver_scales::ordinal::OrdinalScale;
use quiver_scenegraph::join::DataJoin;
use quiver_scenegraph::scene_graph::SceneGraph;
use quiver_shapes::stack::{stack, stack_max, StackedSeries};

pub const TOTAL: &str = "total";

pub fn default_dimensions() -> Dimensions {
    Dimensions::new(1000.0, 600.0).with_margin(Margin::uniform(20.0))
}

fn field(d: &DataRecord, key: &str) -> Option<f64> {
    d.get(key).and_then(Value::as_number)
}

/// CSV options adding a `total` column: the sum of every numeric field in
/// the row
pub fn csv_options() -> CsvOptions {
    CsvOptions::default().with_row(|record, _, columns| {
        let total: f64 = columns.iter().filter_map(|c| field(&record, c)).sum();
        Some(record.with(TOTAL, total))
    })
}

/// Spectral colors for `k` keys; falls back to sampling the continuous ramp
/// where no discrete scheme of that size exists
fn key_colors(k: usize) -> Vec<Color> {
    scheme_spectral(k).unwrap_or_else(|| quantize_colors(interpolate_spectral, k.max(1)))
}

/// Population by state, one bar per state stacked by age group and sorted
/// tallest first. The first column names the state; the others are the
/// age groups.
pub fn render(data: &Dataset, dims: &Dimensions) -> Result<SceneGraph> {
    let width = dims.container_width();
    let height = dims.container_height();

    let data = data.sorted_by(|a, b| {
        let total = |d: &DataRecord| field(d, TOTAL).unwrap_or(0.0);
        total(b).total_cmp(&total(a))
    });
    let keys: Vec<String> = data.columns().iter().skip(1).cloned().collect();
    let names: Vec<String> = data
        .iter()
        .map(|d| d.get(data.columns().first().map_or("name", String::as_str)))
        .map(|v| v.map(ToString::to_string).unwrap_or_default())
        .collect();
    let series = stack(data.records(), &keys, |d, key| field(d, key));

    let y_scale = LinearScale::new(&LinearScaleConfig {
        domain: (0.0, stack_max(&series).unwrap_or(0.0)),
        range: (height, dims.margin.top),
        round: true,
        ..Default::default()
    });
    let x_scale = BandScale::try_new(
        names.clone(),
        &BandScaleConfig {
            range: (dims.margin.left, width),
            ..Default::default()
        }
        .with_padding(0.1),
    )?;
    let colors = OrdinalScale::try_new(keys.clone(), key_colors(keys.len()))?
        .with_unknown(Color::from_rgb8(0xcc, 0xcc, 0xcc));

    let (mut scene, container) = super::frame(dims)?;
    let age_groups = scene.append(container, "g")?;
    scene.classed(age_groups, "age-groups", true)?;

    let mut group_join: DataJoin<StackedSeries<String>> = DataJoin::for_tag("g");
    let groups = group_join.join(&mut scene, age_groups, &series)?;
    for group in groups.merged() {
        let layer = &series[group.index];
        if let Some(fill) = colors.scale(&layer.key) {
            scene.set_attr(group.node, "fill", fill)?;
        }
        let mut bar_join: DataJoin<[f64; 2]> = DataJoin::for_tag("rect");
        let bars = bar_join.join(&mut scene, group.node, &layer.points)?;
        for bar in bars.merged() {
            let [baseline, top] = layer.points[bar.index];
            let Some(x) = x_scale.scale(&names[bar.index]) else {
                continue;
            };
            scene.set_attr(bar.node, "x", x)?;
            scene.set_attr(bar.node, "y", y_scale.scale(top))?;
            scene.set_attr(bar.node, "width", x_scale.bandwidth())?;
            scene.set_attr(
                bar.node,
                "height",
                y_scale.scale(baseline) - y_scale.scale(top),
            )?;
        }
    }

    make_band_axis(&mut scene, container, &x_scale, &AxisConfig::bottom(height))?;
    let y_axis = AxisConfig {
        origin: [dims.margin.left, 0.0],
        ..AxisConfig::left()
    };
    make_numeric_axis(
        &mut scene,
        container,
        &y_scale,
        Some(&SiFormatter::default()),
        &y_axis,
    )?;
    Ok(scene)
}
