pub mod arc;
pub mod bin;
pub mod error;
pub mod geo_path;
pub mod line;
pub mod stack;
pub mod svg;
pub mod voronoi;
