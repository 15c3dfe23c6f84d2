use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::debug;
use quiver_common::color::Color;
use quiver_common::dimensions::{Dimensions, Margin};
use quiver_common::value::{DataRecord, Dataset};
use quiver_eventstream::event::PointerEvent;
use quiver_eventstream::hover::{HighlightConfig, HoverController};
use quiver_eventstream::locator::BisectLocator;
use quiver_eventstream::tooltip::{Tooltip, TooltipConfig, TooltipField};
use quiver_guides::axis::numeric::make_numeric_axis;
use quiver_guides::axis::opts::AxisConfig;
use quiver_guides::axis::time::make_time_axis;
use quiver_scales::array;
use quiver_scales::formatter::{CurrencyFormatter, TimeFormatter};
use quiver_scales::numeric::linear::{LinearScale, LinearScaleConfig};
use quiver_scales::numeric::ContinuousNumericScale;
use quiver_scales::time::{TimeScale, TimeScaleConfig};
use quiver_scenegraph::join::DataJoin;
use quiver_scenegraph::scene_graph::SceneGraph;
use quiver_scenegraph::selector::Selector;
use quiver_shapes::line::LineGenerator;

pub const TOOLTIP_DATE_FORMAT: &str = "%B %-d, %Y";

pub fn default_dimensions() -> Dimensions {
    Dimensions::new(800.0, 600.0).with_margin(Margin::uniform(50.0))
}

fn date(d: &DataRecord) -> Option<DateTime<Utc>> {
    d.date("date")
}

fn close(d: &DataRecord) -> Option<f64> {
    d.number("close")
}

fn date_extent(data: &Dataset) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let mut dates = data.iter().filter_map(date);
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}

/// Closing prices over time.
///
/// With `hover_x` set, a pointer is moved to that x position inside the plot
/// area and the tooltip and marker dot are left showing the closest date.
pub fn render(data: &Dataset, dims: &Dimensions, hover_x: Option<f64>) -> Result<SceneGraph> {
    let width = dims.container_width();
    let height = dims.container_height();
    let x_scale = TimeScale::new(&TimeScaleConfig {
        domain: date_extent(data).context("no dates to plot")?,
        range: (0.0, width),
        ..Default::default()
    });
    let y_scale = LinearScale::new(&LinearScaleConfig {
        domain: array::extent(data.iter(), close).context("no closing prices to plot")?,
        range: (height, 0.0),
        nice: Some(10),
        ..Default::default()
    });

    let (mut scene, container) = super::frame(dims)?;

    // The whole series is bound to a single path
    let path = scene.append(container, "path")?;
    scene.classed(path, "line", true)?;
    let mut line: DataJoin<Dataset> = DataJoin::new("path", Selector::class("line"));
    line.set_datum(path, data.clone());
    let series = line.datum(path).context("line lost its data")?;
    let generator = LineGenerator::new(
        |d: &DataRecord| date(d).map(|t| x_scale.scale(t)),
        |d: &DataRecord| close(d).map(|v| y_scale.scale(v)),
    );
    scene.set_attr(path, "d", generator.path(series.iter()))?;
    scene.set_attr(path, "fill", "none")?;
    scene.set_attr(path, "stroke", Color::from_rgb8(0x4a, 0x4a, 0x4a))?;
    scene.set_attr(path, "stroke-width", 2.0)?;

    make_numeric_axis(
        &mut scene,
        container,
        &y_scale,
        Some(&CurrencyFormatter::default()),
        &AxisConfig::left(),
    )?;
    make_time_axis(&mut scene, container, &x_scale, None, &AxisConfig::bottom(height))?;

    // Transparent surface receiving pointer events over the plot area
    let overlay = scene.append(container, "rect")?;
    scene.classed(overlay, "overlay", true)?;
    scene.set_attr(overlay, "width", width)?;
    scene.set_attr(overlay, "height", height)?;
    scene.set_attr(overlay, "opacity", 0.0)?;

    let tooltip = Tooltip::create(
        &mut scene,
        container,
        vec![
            TooltipField::number("price", "close", CurrencyFormatter::default()),
            TooltipField::date("date", "date", TimeFormatter::new(TOOLTIP_DATE_FORMAT)),
        ],
        TooltipConfig::default(),
    )?;
    let locator = BisectLocator::new(data.iter().map(|d| date(d).map(|t| x_scale.scale(t))));
    let (xs, ys) = (x_scale.clone(), y_scale.clone());
    let mut hover = HoverController::new(
        locator,
        data.clone(),
        move |d: &DataRecord| Some([xs.scale(date(d)?), ys.scale(close(d)?)]),
        tooltip,
        container,
    )
    .with_highlight(HighlightConfig::default());

    if let Some(x) = hover_x {
        hover.handle(&mut scene, &PointerEvent::enter([x, 0.0], Some(overlay)))?;
        let state = hover.handle(&mut scene, &PointerEvent::moved([x, 0.0], Some(overlay)))?;
        debug!("Pointer at x = {x} leaves the chart in {state:?}");
    }
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use quiver_scenegraph::node::AttrValue;

    fn prices() -> Dataset {
        Dataset::new(
            [(23, 93.24), (24, 95.35), (25, 98.84), (26, 99.92)]
                .into_iter()
                .map(|(day, close)| {
                    DataRecord::new()
                        .with("date", Utc.with_ymd_and_hms(2007, 4, day, 0, 0, 0).unwrap())
                        .with("close", close)
                })
                .collect(),
        )
    }

    #[test]
    fn test_line_without_hover() {
        let scene = render(&prices(), &default_dimensions(), None).unwrap();
        let path = scene.select("path.line").unwrap();
        assert!(matches!(scene.attr(path, "d"), Some(AttrValue::Path(d)) if d.starts_with('M')));
        let tooltip = scene.select("g.tooltip").unwrap();
        assert_eq!(
            scene.attr(tooltip, "display"),
            Some(&AttrValue::Text("none".to_string()))
        );
        assert!(scene.select("circle.highlight").is_err());
    }

    #[test]
    fn test_hover_shows_closest_close() {
        // Four days over 700px: the 24th sits at x = 233.3
        let scene = render(&prices(), &default_dimensions(), Some(250.0)).unwrap();
        let price = scene.select("text.price").unwrap();
        let date = scene.select("text.date").unwrap();
        assert_eq!(scene.node(price).and_then(|n| n.text()), Some("$95.35"));
        assert_eq!(scene.node(date).and_then(|n| n.text()), Some("April 24, 2007"));
        let dot = scene.select("circle.highlight").unwrap();
        let cx = scene.attr(dot, "cx").and_then(AttrValue::as_number).unwrap();
        float_cmp::assert_approx_eq!(f64, cx, 700.0 / 3.0, epsilon = 1e-9);
    }
}
