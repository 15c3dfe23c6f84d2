pub mod error;
pub mod event;
pub mod hover;
pub mod locator;
pub mod tooltip;
