use std::sync::Arc;

use log::debug;
use quiver_common::color::Color;
use quiver_common::value::DataRecord;
use quiver_scales::formatter::{DateFormatter, NumberFormatter};
use quiver_scenegraph::node::{translate, NodeId};
use quiver_scenegraph::scene_graph::SceneGraph;

use crate::error::EventStreamError;

#[derive(Debug, Clone)]
pub enum FieldFormat {
    Number(Arc<dyn NumberFormatter>),
    Date(Arc<dyn DateFormatter>),
    Text,
}

/// One line of tooltip content: the record field at `path`, rendered into
/// the tooltip text node carrying `class`
#[derive(Debug, Clone)]
pub struct TooltipField {
    pub class: String,
    pub path: String,
    pub format: FieldFormat,
}

impl TooltipField {
    pub fn number(class: &str, path: &str, formatter: impl NumberFormatter) -> Self {
        Self {
            class: class.to_string(),
            path: path.to_string(),
            format: FieldFormat::Number(Arc::new(formatter)),
        }
    }

    pub fn date(class: &str, path: &str, formatter: impl DateFormatter) -> Self {
        Self {
            class: class.to_string(),
            path: path.to_string(),
            format: FieldFormat::Date(Arc::new(formatter)),
        }
    }

    pub fn text(class: &str, path: &str) -> Self {
        Self {
            class: class.to_string(),
            path: path.to_string(),
            format: FieldFormat::Text,
        }
    }

    pub fn render(&self, record: &DataRecord) -> Option<String> {
        match &self.format {
            FieldFormat::Number(f) => record.number(&self.path).map(|v| f.format(v)),
            FieldFormat::Date(f) => record.date(&self.path).map(|v| f.format(v)),
            FieldFormat::Text => record.lookup(&self.path).map(|v| v.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipConfig {
    /// Offset from the anchor point to the tooltip origin
    pub offset: [f64; 2],
    pub line_height: f64,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            offset: [0.0, -20.0],
            line_height: 14.0,
        }
    }
}

/// A hidden-by-default overlay group with one text line per field
#[derive(Debug, Clone)]
pub struct Tooltip {
    group: NodeId,
    lines: Vec<(TooltipField, NodeId)>,
    config: TooltipConfig,
}

impl Tooltip {
    pub fn create(
        scene: &mut SceneGraph,
        parent: NodeId,
        fields: Vec<TooltipField>,
        config: TooltipConfig,
    ) -> Result<Self, EventStreamError> {
        let group = scene.append(parent, "g")?;
        scene.classed(group, "tooltip", true)?;
        scene.set_attr(group, "display", "none")?;
        scene.set_attr(group, "pointer-events", "none")?;

        let mut lines = Vec::with_capacity(fields.len());
        for (i, field) in fields.into_iter().enumerate() {
            let text = scene.append(group, "text")?;
            scene.classed(text, &field.class, true)?;
            scene.set_attr(text, "y", i as f64 * config.line_height)?;
            scene.set_attr(text, "fill", Color::BLACK)?;
            lines.push((field, text));
        }
        Ok(Self {
            group,
            lines,
            config,
        })
    }

    pub fn node(&self) -> NodeId {
        self.group
    }

    /// Fills every line from `record`, moves the tooltip next to `anchor`
    /// and brings it to the front
    pub fn show(
        &self,
        scene: &mut SceneGraph,
        anchor: [f64; 2],
        record: &DataRecord,
    ) -> Result<(), EventStreamError> {
        for (field, text) in &self.lines {
            let content = field.render(record).unwrap_or_else(|| {
                debug!("Tooltip field {:?} missing from record", field.path);
                String::new()
            });
            scene.set_text(*text, content)?;
        }
        scene.set_attr(
            self.group,
            "transform",
            translate(anchor[0] + self.config.offset[0], anchor[1] + self.config.offset[1]),
        )?;
        scene.remove_attr(self.group, "display")?;
        scene.raise(self.group)?;
        Ok(())
    }

    pub fn hide(&self, scene: &mut SceneGraph) -> Result<(), EventStreamError> {
        scene.set_attr(self.group, "display", "none")?;
        Ok(())
    }

    pub fn is_visible(&self, scene: &SceneGraph) -> bool {
        scene.contains(self.group) && scene.attr(self.group, "display").is_none()
    }

    /// Current text of the line with `class`
    pub fn line_text<'a>(&self, scene: &'a SceneGraph, class: &str) -> Option<&'a str> {
        self.lines
            .iter()
            .find(|(field, _)| field.class == class)
            .and_then(|(_, text)| scene.node(*text))
            .and_then(|node| node.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use quiver_scales::formatter::{CurrencyFormatter, PercentFormatter, TimeFormatter};
    use quiver_scenegraph::node::AttrValue;

    fn record() -> DataRecord {
        DataRecord::new()
            .with("date", Utc.with_ymd_and_hms(2020, 3, 9, 0, 0, 0).unwrap())
            .with("close", 1234.5)
            .with("share", 0.25)
            .with("name", "ACME")
    }

    #[test]
    fn test_field_formats() {
        let r = record();
        assert_eq!(
            TooltipField::number("price", "close", CurrencyFormatter::default()).render(&r),
            Some("$1,234.50".to_string())
        );
        assert_eq!(
            TooltipField::date("date", "date", TimeFormatter::new("%B %-d, %Y")).render(&r),
            Some("March 9, 2020".to_string())
        );
        assert_eq!(
            TooltipField::number("share", "share", PercentFormatter::default()).render(&r),
            Some("25%".to_string())
        );
        assert_eq!(TooltipField::text("name", "name").render(&r), Some("ACME".to_string()));
        assert_eq!(TooltipField::text("x", "missing").render(&r), None);
    }

    #[test]
    fn test_show_and_hide() {
        let mut scene = SceneGraph::new(100.0, 100.0);
        let root = scene.root();
        let tooltip = Tooltip::create(
            &mut scene,
            root,
            vec![
                TooltipField::number("price", "close", CurrencyFormatter::default()),
                TooltipField::text("name", "name"),
            ],
            TooltipConfig::default(),
        )
        .unwrap();
        let later = scene.append(root, "rect").unwrap();
        assert!(!tooltip.is_visible(&scene));

        tooltip.show(&mut scene, [40.0, 60.0], &record()).unwrap();
        assert!(tooltip.is_visible(&scene));
        assert_eq!(tooltip.line_text(&scene, "price"), Some("$1,234.50"));
        assert_eq!(
            scene.attr(tooltip.node(), "transform").and_then(AttrValue::as_text),
            Some("translate(40,40)")
        );
        // Raised above elements appended after it
        assert_eq!(scene.children(root), &[later, tooltip.node()]);

        tooltip.hide(&mut scene).unwrap();
        assert!(!tooltip.is_visible(&scene));
    }
}
