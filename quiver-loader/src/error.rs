use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a JSON array of records, found {0}")]
    NotRecords(&'static str),

    #[error("Topology has no object named {0:?}")]
    MissingObject(String),

    #[error("Arc index {0} is out of bounds")]
    InvalidArc(i64),
}
