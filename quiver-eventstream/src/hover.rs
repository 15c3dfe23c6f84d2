use log::{debug, trace};
use quiver_common::color::Color;
use quiver_common::value::{DataRecord, Dataset};
use quiver_scenegraph::node::NodeId;
use quiver_scenegraph::scene_graph::SceneGraph;

use crate::error::EventStreamError;
use crate::event::{PointerEvent, PointerEventType};
use crate::locator::RecordLocator;
use crate::tooltip::Tooltip;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HoverState {
    #[default]
    Idle,
    Hovering {
        record: usize,
    },
}

/// Marker dot drawn over the hovered record
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightConfig {
    pub radius: f64,
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f64,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            radius: 5.0,
            fill: Color::from_rgb8(0xfc, 0x87, 0x81),
            stroke: Color::BLACK,
            stroke_width: 2.0,
        }
    }
}

/// Drives `Idle -> Hovering(record) -> Idle` from pointer events.
///
/// Entering or moving over a record shows the tooltip at the record's anchor
/// and places the highlight dot there. Leaving the region, or moving to a
/// spot no record claims, hides the tooltip and removes the dot.
pub struct HoverController<L: RecordLocator> {
    locator: L,
    dataset: Dataset,
    anchor: Box<dyn Fn(&DataRecord) -> Option<[f64; 2]>>,
    tooltip: Tooltip,
    overlay: NodeId,
    highlight_config: Option<HighlightConfig>,
    highlight: Option<NodeId>,
    state: HoverState,
}

impl<L: RecordLocator> HoverController<L> {
    /// `anchor` maps a record to its position in the overlay's coordinates,
    /// usually the scaled x/y accessors.
    pub fn new(
        locator: L,
        dataset: Dataset,
        anchor: impl Fn(&DataRecord) -> Option<[f64; 2]> + 'static,
        tooltip: Tooltip,
        overlay: NodeId,
    ) -> Self {
        Self {
            locator,
            dataset,
            anchor: Box::new(anchor),
            tooltip,
            overlay,
            highlight_config: None,
            highlight: None,
            state: HoverState::Idle,
        }
    }

    pub fn with_highlight(mut self, config: HighlightConfig) -> Self {
        self.highlight_config = Some(config);
        self
    }

    pub fn state(&self) -> HoverState {
        self.state
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    pub fn highlight(&self) -> Option<NodeId> {
        self.highlight
    }

    pub fn handle(
        &mut self,
        scene: &mut SceneGraph,
        event: &PointerEvent,
    ) -> Result<HoverState, EventStreamError> {
        match event.event_type {
            PointerEventType::Leave => self.clear(scene)?,
            PointerEventType::Enter | PointerEventType::Move => {
                match self
                    .locator
                    .locate(event)
                    .filter(|i| *i < self.dataset.len())
                {
                    Some(record) => self.hover(scene, record)?,
                    None => self.clear(scene)?,
                }
            }
        }
        Ok(self.state)
    }

    fn hover(&mut self, scene: &mut SceneGraph, index: usize) -> Result<(), EventStreamError> {
        let record = &self.dataset[index];
        let Some(anchor) = (self.anchor)(record) else {
            debug!("Record {index} has no anchor position, clearing hover");
            return self.clear(scene);
        };
        trace!("Hovering record {index} at {anchor:?}");
        self.tooltip.show(scene, anchor, record)?;

        if let Some(config) = &self.highlight_config {
            let dot = match self.highlight.filter(|n| scene.contains(*n)) {
                Some(dot) => dot,
                None => {
                    let dot = scene.append(self.overlay, "circle")?;
                    scene.classed(dot, "highlight", true)?;
                    scene.set_attr(dot, "r", config.radius)?;
                    scene.set_attr(dot, "fill", config.fill)?;
                    scene.set_attr(dot, "stroke", config.stroke)?;
                    scene.set_attr(dot, "stroke-width", config.stroke_width)?;
                    scene.set_attr(dot, "pointer-events", "none")?;
                    dot
                }
            };
            scene.set_attr(dot, "cx", anchor[0])?;
            scene.set_attr(dot, "cy", anchor[1])?;
            scene.raise(dot)?;
            self.highlight = Some(dot);
        }

        if self.state != (HoverState::Hovering { record: index }) {
            debug!("Hover state {:?} -> Hovering({index})", self.state);
        }
        self.state = HoverState::Hovering { record: index };
        Ok(())
    }

    fn clear(&mut self, scene: &mut SceneGraph) -> Result<(), EventStreamError> {
        if self.state == HoverState::Idle && self.highlight.is_none() {
            return Ok(());
        }
        if scene.contains(self.tooltip.node()) {
            self.tooltip.hide(scene)?;
        }
        if let Some(dot) = self.highlight.take() {
            if scene.contains(dot) {
                scene.remove(dot)?;
            }
        }
        debug!("Hover state {:?} -> Idle", self.state);
        self.state = HoverState::Idle;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::{ElementLocator, NearestLocator};
    use crate::tooltip::{TooltipConfig, TooltipField};
    use quiver_scales::formatter::PercentFormatter;
    use quiver_scenegraph::node::AttrValue;

    fn dataset() -> Dataset {
        Dataset::new(vec![
            DataRecord::new().with("x", 10.0).with("y", 10.0).with("share", 0.1),
            DataRecord::new().with("x", 90.0).with("y", 50.0).with("share", 0.9),
        ])
    }

    fn anchor(r: &DataRecord) -> Option<[f64; 2]> {
        Some([r.number("x")?, r.number("y")?])
    }

    fn setup() -> (SceneGraph, NodeId, Tooltip) {
        let mut scene = SceneGraph::new(100.0, 100.0);
        let root = scene.root();
        let overlay = scene.append(root, "g").unwrap();
        let tooltip = Tooltip::create(
            &mut scene,
            root,
            vec![TooltipField::number("share", "share", PercentFormatter::default())],
            TooltipConfig::default(),
        )
        .unwrap();
        (scene, overlay, tooltip)
    }

    #[test]
    fn test_nearest_hover_cycle() {
        let (mut scene, overlay, tooltip) = setup();
        let data = dataset();
        let points: Vec<Option<[f64; 2]>> = data.iter().map(anchor).collect();
        let mut hover = HoverController::new(
            NearestLocator::from_partial(points),
            data,
            anchor,
            tooltip,
            overlay,
        )
        .with_highlight(HighlightConfig::default());

        let state = hover
            .handle(&mut scene, &PointerEvent::enter([20.0, 20.0], None))
            .unwrap();
        assert_eq!(state, HoverState::Hovering { record: 0 });
        assert_eq!(hover.tooltip().line_text(&scene, "share"), Some("10%"));
        let dot = hover.highlight().unwrap();
        assert_eq!(scene.attr(dot, "cx"), Some(&AttrValue::Number(10.0)));

        let state = hover
            .handle(&mut scene, &PointerEvent::moved([80.0, 60.0], None))
            .unwrap();
        assert_eq!(state, HoverState::Hovering { record: 1 });
        // The same dot is moved rather than recreated
        assert_eq!(hover.highlight(), Some(dot));
        assert_eq!(scene.attr(dot, "cy"), Some(&AttrValue::Number(50.0)));
        assert_eq!(hover.tooltip().line_text(&scene, "share"), Some("90%"));

        let state = hover.handle(&mut scene, &PointerEvent::leave([200.0, 0.0])).unwrap();
        assert_eq!(state, HoverState::Idle);
        assert!(!scene.contains(dot));
        assert!(!hover.tooltip().is_visible(&scene));
    }

    #[test]
    fn test_element_hover_leaves_on_unbound_target() {
        let (mut scene, overlay, tooltip) = setup();
        let bar = scene.append(overlay, "rect").unwrap();
        let background = scene.append(overlay, "rect").unwrap();
        let mut locator = ElementLocator::new();
        locator.insert(bar, 1);
        let mut hover = HoverController::new(locator, dataset(), anchor, tooltip, overlay);

        let state = hover
            .handle(&mut scene, &PointerEvent::enter([5.0, 5.0], Some(bar)))
            .unwrap();
        assert_eq!(state, HoverState::Hovering { record: 1 });
        assert!(hover.tooltip().is_visible(&scene));
        assert!(hover.highlight().is_none());

        let state = hover
            .handle(&mut scene, &PointerEvent::moved([5.0, 5.0], Some(background)))
            .unwrap();
        assert_eq!(state, HoverState::Idle);
        assert!(!hover.tooltip().is_visible(&scene));
    }
}
