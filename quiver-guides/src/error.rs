use quiver_scenegraph::error::SceneGraphError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GuidesError {
    #[error("Axis range must be finite, received {0:?}")]
    InvalidRange((f64, f64)),

    #[error("Scene graph error: {0}")]
    SceneGraph(#[from] SceneGraphError),
}
