use crate::node::NodeId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneGraphError {
    #[error("Node {0:?} is not in the scene graph")]
    NodeNotFound(NodeId),

    #[error("Invalid selector: {0:?}")]
    InvalidSelector(String),

    #[error("No node matches selector {0:?}")]
    NoMatch(String),

    #[error("The root node can not be removed or moved")]
    RootNode,
}
