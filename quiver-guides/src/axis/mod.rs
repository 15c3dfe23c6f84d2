pub mod band;
pub mod numeric;
pub mod opts;
pub mod time;

use log::debug;
use quiver_common::color::Color;
use quiver_scenegraph::node::{fmt_number, translate, AttrValue, NodeId};
use quiver_scenegraph::scene_graph::SceneGraph;

use crate::error::GuidesError;

use self::opts::{AxisConfig, AxisOrientation};

pub(crate) const TICK_LENGTH: f64 = 5.0;
pub(crate) const TEXT_MARGIN: f64 = 3.0;
pub(crate) const TITLE_MARGIN: f64 = 4.0;
pub(crate) const TITLE_FONT_SIZE: f64 = 10.0;
pub(crate) const TICK_FONT_SIZE: f64 = 8.0;
pub(crate) const PIXEL_OFFSET: f64 = 0.5;

/// Average glyph advance relative to font size, used in place of text measurement
const GLYPH_WIDTH_RATIO: f64 = 0.6;

/// A tick position in range coordinates and its label
#[derive(Debug, Clone, PartialEq)]
pub struct AxisTick {
    pub position: f64,
    pub label: String,
}

pub(crate) fn approx_text_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * GLYPH_WIDTH_RATIO
}

/// Appends an axis group to `parent`.
///
/// The group holds a `line.domain` spanning `range`, one `g.tick` per tick
/// (a tick line plus a text label), and an optional `text.axis-title`.
pub fn make_axis(
    scene: &mut SceneGraph,
    parent: NodeId,
    ticks: &[AxisTick],
    range: (f64, f64),
    config: &AxisConfig,
) -> Result<NodeId, GuidesError> {
    if !range.0.is_finite() || !range.1.is_finite() {
        return Err(GuidesError::InvalidRange(range));
    }
    let orientation = config.orientation;
    let sign = orientation.sign();
    let vertical = orientation.is_vertical();
    let black = Color::BLACK;

    let group = scene.append(parent, "g")?;
    scene.classed(group, "axis", true)?;
    scene.classed(group, orientation.class_name(), true)?;
    scene.set_attr(group, "transform", translate(config.origin[0], config.origin[1]))?;
    scene.set_attr(group, "font-size", TICK_FONT_SIZE)?;
    scene.set_attr(group, "font-family", "sans-serif")?;

    // Axis line, widened by half a pixel on both ends to cover the outer ticks
    let start = f64::min(range.0, range.1) - PIXEL_OFFSET;
    let end = f64::max(range.0, range.1) + PIXEL_OFFSET;
    let domain = scene.append(group, "line")?;
    scene.classed(domain, "domain", true)?;
    let (along0, along1) = if vertical {
        (("y1", "y2"), ("x1", "x2"))
    } else {
        (("x1", "x2"), ("y1", "y2"))
    };
    scene.set_attr(domain, along0.0, start)?;
    scene.set_attr(domain, along0.1, end)?;
    scene.set_attr(domain, along1.0, 0.0)?;
    scene.set_attr(domain, along1.1, 0.0)?;
    scene.set_attr(domain, "stroke", black)?;

    let label_offset = sign * (TICK_LENGTH + TEXT_MARGIN);
    let mut max_label_width: f64 = 0.0;
    for tick in ticks {
        if !tick.position.is_finite() {
            debug!("Skipping axis tick {:?} with non-finite position", tick.label);
            continue;
        }
        let position = tick.position + PIXEL_OFFSET;
        let g = scene.append(group, "g")?;
        scene.classed(g, "tick", true)?;
        let transform = if vertical {
            translate(0.0, position)
        } else {
            translate(position, 0.0)
        };
        scene.set_attr(g, "transform", transform)?;

        let line = scene.append(g, "line")?;
        scene.set_attr(line, if vertical { "x2" } else { "y2" }, sign * TICK_LENGTH)?;
        scene.set_attr(line, "stroke", black)?;

        let text = scene.append(g, "text")?;
        scene.set_attr(text, "fill", black)?;
        match orientation {
            AxisOrientation::Bottom => {
                scene.set_attr(text, "y", label_offset)?;
                scene.set_attr(text, "dy", "0.71em")?;
                scene.set_attr(text, "text-anchor", "middle")?;
            }
            AxisOrientation::Top => {
                scene.set_attr(text, "y", label_offset)?;
                scene.set_attr(text, "text-anchor", "middle")?;
            }
            AxisOrientation::Left => {
                scene.set_attr(text, "x", label_offset)?;
                scene.set_attr(text, "dy", "0.32em")?;
                scene.set_attr(text, "text-anchor", "end")?;
            }
            AxisOrientation::Right => {
                scene.set_attr(text, "x", label_offset)?;
                scene.set_attr(text, "dy", "0.32em")?;
                scene.set_attr(text, "text-anchor", "start")?;
            }
        }
        scene.set_text(text, tick.label.clone())?;
        max_label_width = max_label_width.max(approx_text_width(&tick.label, TICK_FONT_SIZE));
    }

    if let Some(title) = &config.title {
        let mid = (range.0 + range.1) / 2.0;
        let text = scene.append(group, "text")?;
        scene.classed(text, "axis-title", true)?;
        scene.set_attr(text, "fill", black)?;
        scene.set_attr(text, "font-size", TITLE_FONT_SIZE)?;
        scene.set_attr(text, "font-weight", "bold")?;
        scene.set_attr(text, "text-anchor", "middle")?;
        let transform = match orientation {
            AxisOrientation::Bottom => {
                let y = TICK_LENGTH
                    + TEXT_MARGIN
                    + TICK_FONT_SIZE
                    + TITLE_MARGIN
                    + TITLE_FONT_SIZE
                    + config.title_offset;
                translate(mid, y)
            }
            AxisOrientation::Top => {
                let y = TICK_LENGTH + TEXT_MARGIN + TICK_FONT_SIZE + TITLE_MARGIN + config.title_offset;
                translate(mid, -y)
            }
            AxisOrientation::Left | AxisOrientation::Right => {
                let x = sign
                    * (TICK_LENGTH + TEXT_MARGIN + max_label_width + TITLE_MARGIN + config.title_offset);
                let rotate = if sign < 0.0 { -90 } else { 90 };
                AttrValue::Text(format!(
                    "translate({},{}) rotate({rotate})",
                    fmt_number(x),
                    fmt_number(mid)
                ))
            }
        };
        scene.set_attr(text, "transform", transform)?;
        scene.set_text(text, title.clone())?;
    }

    debug!(
        "Built {} axis with {} ticks",
        orientation.class_name(),
        ticks.len()
    );
    Ok(group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiver_scenegraph::selector::Selector;

    fn ticks() -> Vec<AxisTick> {
        vec![
            AxisTick {
                position: 0.0,
                label: "0".to_string(),
            },
            AxisTick {
                position: 50.0,
                label: "50".to_string(),
            },
            AxisTick {
                position: f64::NAN,
                label: "bad".to_string(),
            },
        ]
    }

    #[test]
    fn test_bottom_axis_structure() {
        let mut scene = SceneGraph::new(100.0, 100.0);
        let root = scene.root();
        let config = AxisConfig::bottom(80.0).with_title("Value");
        let axis = make_axis(&mut scene, root, &ticks(), (0.0, 100.0), &config).unwrap();

        assert_eq!(
            scene.attr(axis, "transform").and_then(AttrValue::as_text),
            Some("translate(0,80)")
        );
        let tick_groups = scene.select_within(axis, &Selector::class("tick"));
        assert_eq!(tick_groups.len(), 2);
        assert_eq!(
            scene.attr(tick_groups[1], "transform").and_then(AttrValue::as_text),
            Some("translate(50.5,0)")
        );
        let domain = scene.select_within(axis, &Selector::class("domain"))[0];
        assert_eq!(scene.attr(domain, "x1"), Some(&AttrValue::Number(-0.5)));
        assert_eq!(scene.attr(domain, "x2"), Some(&AttrValue::Number(100.5)));

        let title = scene.select_within(axis, &Selector::class("axis-title"))[0];
        assert_eq!(scene.get(title).unwrap().text(), Some("Value"));
        assert_eq!(
            scene.attr(title, "transform").and_then(AttrValue::as_text),
            Some("translate(50,30)")
        );
    }

    #[test]
    fn test_left_axis_title_clears_labels() {
        let mut scene = SceneGraph::new(100.0, 100.0);
        let root = scene.root();
        let config = AxisConfig::left().with_title("Count");
        let axis = make_axis(&mut scene, root, &ticks(), (100.0, 0.0), &config).unwrap();

        let labels = scene.select_within(axis, &Selector::tag("text"));
        assert_eq!(
            scene.attr(labels[0], "text-anchor").and_then(AttrValue::as_text),
            Some("end")
        );
        let title = scene.select_within(axis, &Selector::class("axis-title"))[0];
        // Two-character labels: 5 + 3 + 9.6 + 4
        assert_eq!(
            scene.attr(title, "transform").and_then(AttrValue::as_text),
            Some("translate(-21.6,50) rotate(-90)")
        );
    }

    #[test]
    fn test_non_finite_range() {
        let mut scene = SceneGraph::new(100.0, 100.0);
        let root = scene.root();
        let err = make_axis(&mut scene, root, &[], (0.0, f64::INFINITY), &AxisConfig::default())
            .unwrap_err();
        assert_eq!(err, GuidesError::InvalidRange((0.0, f64::INFINITY)));
    }
}
