use anyhow::{Context, Result};
use log::debug;
use quiver_common::dimensions::{Dimensions, Margin};
use quiver_common::value::{DataRecord, Dataset};
use quiver_eventstream::event::PointerEvent;
use quiver_eventstream::hover::{HighlightConfig, HoverController};
use quiver_eventstream::locator::NearestLocator;
use quiver_eventstream::tooltip::{Tooltip, TooltipConfig, TooltipField};
use quiver_guides::axis::numeric::make_numeric_axis;
use quiver_guides::axis::opts::AxisConfig;
use quiver_scales::array;
use quiver_scales::formatter::{NumberFormatter, PercentFormatter};
use quiver_scales::numeric::linear::{LinearScale, LinearScaleConfig};
use quiver_scales::numeric::ContinuousNumericScale;
use quiver_scenegraph::join::DataJoin;
use quiver_scenegraph::scene_graph::SceneGraph;

pub fn default_dimensions() -> Dimensions {
    Dimensions::new(800.0, 800.0).with_margin(Margin::uniform(50.0))
}

pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

/// Formats a Fahrenheit reading as whole degrees Celsius
#[derive(Debug, Clone, Copy)]
struct CelsiusFormatter;

impl NumberFormatter for CelsiusFormatter {
    fn format(&self, value: f64) -> String {
        format!("{:.0}°C", fahrenheit_to_celsius(value))
    }
}

fn humidity(d: &DataRecord) -> Option<f64> {
    d.number("currently.humidity")
}

fn apparent_temperature(d: &DataRecord) -> Option<f64> {
    d.number("currently.apparentTemperature")
        .map(fahrenheit_to_celsius)
}

/// Humidity against apparent temperature, one dot per weather reading.
///
/// `hover` is a pointer position in plot coordinates; the reading nearest to
/// it gets the tooltip and highlight dot.
pub fn render(data: &Dataset, dims: &Dimensions, hover: Option<[f64; 2]>) -> Result<SceneGraph> {
    let x_domain = array::extent(data.iter(), humidity).context("no humidity readings")?;
    let y_domain =
        array::extent(data.iter(), apparent_temperature).context("no temperature readings")?;

    let x_scale = LinearScale::new(&LinearScaleConfig {
        domain: x_domain,
        range: (0.0, dims.container_width()),
        clamp: true,
        round: true,
        ..Default::default()
    });
    let y_scale = LinearScale::new(&LinearScaleConfig {
        domain: y_domain,
        range: (dims.container_height(), 0.0),
        clamp: true,
        nice: Some(10),
        round: true,
    });

    let (mut scene, container) = super::frame(dims)?;
    let dots = scene.append(container, "g")?;
    scene.classed(dots, "dots", true)?;

    let mut join = DataJoin::for_tag("circle");
    let selection = join.join(&mut scene, dots, data.records())?;
    for bound in selection.merged() {
        let d = &data[bound.index];
        let (Some(x), Some(y)) = (humidity(d), apparent_temperature(d)) else {
            scene.set_attr(bound.node, "display", "none")?;
            continue;
        };
        scene.set_attr(bound.node, "cx", x_scale.scale(x))?;
        scene.set_attr(bound.node, "cy", y_scale.scale(y))?;
        scene.set_attr(bound.node, "r", 4.0)?;
        scene.set_attr(bound.node, "fill", "orange")?;
        scene.set_attr(bound.node, "data-temp", y)?;
    }

    make_numeric_axis(
        &mut scene,
        container,
        &x_scale,
        Some(&PercentFormatter::default()),
        &AxisConfig::bottom(dims.container_height())
            .with_tick_count(5.0)
            .with_title("Humidity"),
    )?;
    make_numeric_axis(
        &mut scene,
        container,
        &y_scale,
        None,
        &AxisConfig::left().with_title("Temperature °C"),
    )?;

    let overlay = scene.append(container, "rect")?;
    scene.classed(overlay, "overlay", true)?;
    scene.set_attr(overlay, "width", dims.container_width())?;
    scene.set_attr(overlay, "height", dims.container_height())?;
    scene.set_attr(overlay, "opacity", 0.0)?;

    let tooltip = Tooltip::create(
        &mut scene,
        container,
        vec![
            TooltipField::number("humidity", "currently.humidity", PercentFormatter::default()),
            TooltipField::number(
                "temperature",
                "currently.apparentTemperature",
                CelsiusFormatter,
            ),
        ],
        TooltipConfig::default(),
    )?;
    let position = move |d: &DataRecord| {
        Some([
            x_scale.scale(humidity(d)?),
            y_scale.scale(apparent_temperature(d)?),
        ])
    };
    let locator = NearestLocator::from_partial(data.iter().map(&position));
    let mut controller = HoverController::new(locator, data.clone(), position, tooltip, container)
        .with_highlight(HighlightConfig::default());

    if let Some(pointer) = hover {
        controller.handle(&mut scene, &PointerEvent::enter(pointer, Some(overlay)))?;
        let state = controller.handle(&mut scene, &PointerEvent::moved(pointer, Some(overlay)))?;
        debug!("Pointer at {pointer:?} leaves the scatter in {state:?}");
    }
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use quiver_scenegraph::node::AttrValue;
    use quiver_scenegraph::selector::Selector;

    fn reading(humidity: f64, temperature: f64) -> DataRecord {
        DataRecord::new().with(
            "currently",
            DataRecord::new()
                .with("humidity", humidity)
                .with("apparentTemperature", temperature),
        )
    }

    #[test]
    fn test_fahrenheit_to_celsius() {
        assert_approx_eq!(f64, fahrenheit_to_celsius(32.0), 0.0);
        assert_approx_eq!(f64, fahrenheit_to_celsius(212.0), 100.0);
    }

    #[test]
    fn test_dots_span_the_container() {
        let data = Dataset::new(vec![
            reading(0.5, 50.0),
            reading(1.0, 86.0),
            DataRecord::new().with("currently", DataRecord::new().with("humidity", 0.75)),
        ]);
        let scene = render(&data, &default_dimensions(), None).unwrap();
        let dots = scene.select("g.dots").unwrap();
        let circles = scene.select_within(dots, &Selector::tag("circle"));
        assert_eq!(circles.len(), 3);
        assert_eq!(scene.attr(circles[0], "cx"), Some(&AttrValue::Number(0.0)));
        assert_eq!(scene.attr(circles[1], "cx"), Some(&AttrValue::Number(700.0)));
        // 10°C..30°C is already nice, so the extremes sit on the range ends
        assert_eq!(scene.attr(circles[0], "cy"), Some(&AttrValue::Number(700.0)));
        assert_eq!(scene.attr(circles[1], "cy"), Some(&AttrValue::Number(0.0)));
        assert_eq!(
            scene.attr(circles[2], "display"),
            Some(&AttrValue::Text("none".to_string()))
        );
    }

    #[test]
    fn test_hover_picks_nearest_reading() {
        let data = Dataset::new(vec![
            DataRecord::new().with("currently", DataRecord::new().with("humidity", 0.75)),
            reading(0.5, 50.0),
            reading(1.0, 86.0),
        ]);
        // Closer to the humid, warm corner at (700, 0)
        let scene = render(&data, &default_dimensions(), Some([600.0, 150.0])).unwrap();
        let humidity = scene.select("text.humidity").unwrap();
        let temperature = scene.select("text.temperature").unwrap();
        assert_eq!(scene.node(humidity).and_then(|n| n.text()), Some("100%"));
        assert_eq!(scene.node(temperature).and_then(|n| n.text()), Some("30°C"));
        let dot = scene.select("circle.highlight").unwrap();
        assert_eq!(scene.attr(dot, "cx"), Some(&AttrValue::Number(700.0)));
        assert_eq!(scene.attr(dot, "cy"), Some(&AttrValue::Number(0.0)));
    }

    #[test]
    fn test_scatter_without_hover() {
        let data = Dataset::new(vec![reading(0.5, 50.0), reading(1.0, 86.0)]);
        let scene = render(&data, &default_dimensions(), None).unwrap();
        assert!(scene.select("rect.overlay").is_ok());
        assert!(scene.select("circle.highlight").is_err());
    }
}
