pub mod charts;
pub mod config;
