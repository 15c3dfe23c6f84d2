use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// Outer chart size plus margins.
///
/// The inner drawing area is derived on read and never stored, so changing
/// the width or margins can not leave it stale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 400.0,
            margin: Margin::default(),
        }
    }
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            margin: Margin::default(),
        }
    }

    pub fn with_margin(mut self, margin: Margin) -> Self {
        self.margin = margin;
        self
    }

    pub fn container_width(&self) -> f64 {
        (self.width - self.margin.left - self.margin.right).max(0.0)
    }

    pub fn container_height(&self) -> f64 {
        (self.height - self.margin.top - self.margin.bottom).max(0.0)
    }

    /// Translation of the inner container relative to the outer frame
    pub fn container_origin(&self) -> [f64; 2] {
        [self.margin.left, self.margin.top]
    }
}
