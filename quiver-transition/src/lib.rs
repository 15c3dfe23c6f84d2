pub mod easing;
pub mod error;
pub mod interpolate;
pub mod scheduler;
