use quiver_scenegraph::error::SceneGraphError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EventStreamError {
    #[error("Scene graph error: {0}")]
    SceneGraph(#[from] SceneGraphError),
}
