pub mod auto_type;
pub mod dsv;
pub mod error;
pub mod json;
pub mod topojson;
