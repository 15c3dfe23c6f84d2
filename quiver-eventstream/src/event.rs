use quiver_scenegraph::node::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventType {
    Enter,
    Move,
    Leave,
}

/// A pointer event in the coordinate space of the interactive region
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub event_type: PointerEventType,
    pub position: [f64; 2],
    /// Scene node under the pointer, when the host can hit-test elements
    pub target: Option<NodeId>,
}

impl PointerEvent {
    pub fn enter(position: [f64; 2], target: Option<NodeId>) -> Self {
        Self {
            event_type: PointerEventType::Enter,
            position,
            target,
        }
    }

    pub fn moved(position: [f64; 2], target: Option<NodeId>) -> Self {
        Self {
            event_type: PointerEventType::Move,
            position,
            target,
        }
    }

    pub fn leave(position: [f64; 2]) -> Self {
        Self {
            event_type: PointerEventType::Leave,
            position,
            target: None,
        }
    }
}
