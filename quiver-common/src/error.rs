#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuiverCommonError {
    #[error("Invalid color string: {0}")]
    InvalidColor(String),
}
