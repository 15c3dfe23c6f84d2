#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeError {
    #[error("Bin thresholds must be in ascending order: {0:?}")]
    ThresholdsNotAscending(Vec<f64>),

    #[error("Invalid bin domain [{0}, {1}]")]
    InvalidDomain(f64, f64),

    #[error("Site {index} is not a finite point: {point:?}")]
    NonFinitePoint { index: usize, point: [f64; 2] },
}
