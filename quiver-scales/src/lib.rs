pub mod array;
pub mod band;
pub mod color;
pub mod error;
pub mod formatter;
pub mod numeric;
pub mod ordinal;
pub mod projection;
pub mod quantile;
pub mod quantize;
pub mod threshold;
pub mod time;
