pub mod error;
pub mod join;
pub mod node;
pub mod scene_graph;
pub mod selector;
pub mod svg;
