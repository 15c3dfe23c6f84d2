use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use quiver_common::dimensions::{Dimensions, Margin};
use serde::Deserialize;

/// A margin given either as one number for every side or per side
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MarginOverride {
    Uniform(f64),
    Sides(Margin),
}

impl From<MarginOverride> for Margin {
    fn from(value: MarginOverride) -> Self {
        match value {
            MarginOverride::Uniform(v) => Margin::uniform(v),
            MarginOverride::Sides(margin) => margin,
        }
    }
}

/// Dimensions read from `--config`. Fields left out keep the chart's own
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DimensionsOverride {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub margin: Option<MarginOverride>,
}

impl DimensionsOverride {
    pub fn apply(&self, mut dims: Dimensions) -> Dimensions {
        if let Some(width) = self.width {
            dims.width = width;
        }
        if let Some(height) = self.height {
            dims.height = height;
        }
        if let Some(margin) = self.margin {
            dims.margin = margin.into();
        }
        dims
    }
}

pub fn parse_override(bytes: &[u8]) -> Result<DimensionsOverride> {
    Ok(serde_json::from_slice(bytes)?)
}

pub async fn load_override(path: &Path) -> Result<DimensionsOverride> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading config {}", path.display()))?;
    let config =
        parse_override(&bytes).with_context(|| format!("parsing config {}", path.display()))?;
    debug!("Dimension overrides from {}: {config:?}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = parse_override(br#"{"width": 1000}"#).unwrap();
        let dims = config.apply(Dimensions::new(800.0, 800.0).with_margin(Margin::uniform(50.0)));
        assert_eq!(dims.width, 1000.0);
        assert_eq!(dims.height, 800.0);
        assert_eq!(dims.margin, Margin::uniform(50.0));
    }

    #[test]
    fn test_margin_forms() {
        let uniform = parse_override(br#"{"margin": 20}"#).unwrap();
        assert_eq!(uniform.apply(Dimensions::default()).margin, Margin::uniform(20.0));

        let sides = parse_override(br#"{"margin": {"top": 10, "left": 40}}"#).unwrap();
        let margin = sides.apply(Dimensions::default()).margin;
        assert_eq!(margin.top, 10.0);
        assert_eq!(margin.left, 40.0);
        assert_eq!(margin.right, 0.0);
    }

    #[test]
    fn test_unknown_field_is_an_error() {
        assert!(parse_override(br#"{"widht": 10}"#).is_err());
    }
}
