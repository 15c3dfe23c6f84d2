#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuiverScaleError {
    #[error("Degenerate domain [{start}, {end}]: start and end must differ and be finite")]
    DegenerateDomain { start: f64, end: f64 },

    #[error("Invalid log domain [{start}, {end}]: must not include or straddle zero")]
    InvalidLogDomain { start: f64, end: f64 },

    #[error("Domain length ({domain_len}) does not match range length ({range_len})")]
    DomainRangeMismatch { domain_len: usize, range_len: usize },

    #[error("Empty domain")]
    EmptyDomain,

    #[error("Empty range")]
    EmptyRange,

    #[error("Thresholds must be in ascending order: {0:?}")]
    ThresholdsNotAscending(Vec<f64>),

    #[error(
        "Threshold domain length ({domain_len}) must be one less than range length ({range_len})"
    )]
    ThresholdDomainMismatch { domain_len: usize, range_len: usize },

    #[error("Invalid color: {0}")]
    InvalidColor(String),
}
