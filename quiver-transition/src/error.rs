use quiver_scenegraph::node::NodeId;

use crate::scheduler::TransitionId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransitionError {
    #[error("Node {0:?} is not in the scene graph")]
    NodeNotFound(NodeId),

    #[error("Unknown transition {0:?}")]
    UnknownTransition(TransitionId),
}
