pub mod color;
pub mod dimensions;
pub mod error;
pub mod value;
