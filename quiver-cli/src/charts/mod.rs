//! One module per chart. Each exposes its default [`Dimensions`] and a
//! `render` function that draws an already loaded dataset into a fresh
//! [`SceneGraph`].

pub mod heatmap;
pub mod histogram;
pub mod join_demo;
pub mod line;
pub mod log_scale;
pub mod map;
pub mod pie;
pub mod scatter;
pub mod stacked_bar;

use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use quiver_common::dimensions::Dimensions;
use quiver_scenegraph::node::{translate, NodeId};
use quiver_scenegraph::scene_graph::SceneGraph;
use quiver_scenegraph::svg::to_svg;

/// A scene of the outer size with a `g.container` shifted by the margins.
/// Charts draw into the container in inner coordinates.
pub fn frame(dims: &Dimensions) -> Result<(SceneGraph, NodeId)> {
    let mut scene = SceneGraph::new(dims.width, dims.height);
    let container = scene.append(scene.root(), "g")?;
    scene.classed(container, "container", true)?;
    let [x, y] = dims.container_origin();
    scene.set_attr(container, "transform", translate(x, y))?;
    Ok((scene, container))
}

pub async fn write_svg(scene: &SceneGraph, path: &Path) -> Result<()> {
    let svg = to_svg(scene);
    tokio::fs::write(path, svg.as_bytes())
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    info!("Wrote {} nodes to {}", scene.len(), path.display());
    Ok(())
}
