pub mod linear;
pub mod log;

use std::fmt::Debug;

use self::linear::{LinearScale, LinearScaleConfig};
use self::log::{LogScale, LogScaleConfig};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

use crate::error::QuiverScaleError;

/// A scale mapping a continuous numeric domain onto a continuous numeric range.
pub trait ContinuousNumericScale: Debug + Clone {
    fn domain(&self) -> (f64, f64);

    fn range(&self) -> (f64, f64);

    fn clamp(&self) -> bool;

    /// Maps a domain value to the range
    fn scale(&self, value: f64) -> f64;

    /// Maps a range value back to the domain, so that `invert(scale(v)) ≈ v`
    fn invert(&self, value: f64) -> f64;

    fn ticks(&self, count: Option<f64>) -> Vec<f64>;

    fn scale_all(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|v| self.scale(*v)).collect()
    }
}

/// Closed set of continuous numeric scales, for callers that pick the kind at runtime
/// (e.g. a chart that switches between linear and log axes).
#[derive(Clone, Debug)]
pub enum NumericScale {
    Linear(LinearScale),
    Log(LogScale),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, VariantNames)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NumericScaleKind {
    #[default]
    Linear,
    Log,
}

/// Options shared by every continuous numeric scale kind
#[derive(Debug, Clone, Default)]
pub struct NumericScaleOptions {
    pub clamp: bool,
    pub nice: bool,
    pub round: bool,
}

impl NumericScale {
    /// Builds a scale of the given kind, failing on domains the kind can not represent.
    pub fn try_make(
        kind: NumericScaleKind,
        domain: (f64, f64),
        range: (f64, f64),
        options: &NumericScaleOptions,
    ) -> Result<Self, QuiverScaleError> {
        Ok(match kind {
            NumericScaleKind::Linear => LinearScale::try_new(&LinearScaleConfig {
                domain,
                range,
                clamp: options.clamp,
                nice: options.nice.then_some(10),
                round: options.round,
            })?
            .into(),
            NumericScaleKind::Log => LogScale::try_new(&LogScaleConfig {
                domain,
                range,
                clamp: options.clamp,
                nice: options.nice,
                ..Default::default()
            })?
            .into(),
        })
    }

    /// Infallible variant of [`NumericScale::try_make`] using the documented fallbacks
    pub fn make(
        kind: NumericScaleKind,
        domain: (f64, f64),
        range: (f64, f64),
        options: &NumericScaleOptions,
    ) -> Self {
        match kind {
            NumericScaleKind::Linear => LinearScale::new(&LinearScaleConfig {
                domain,
                range,
                clamp: options.clamp,
                nice: options.nice.then_some(10),
                round: options.round,
            })
            .into(),
            NumericScaleKind::Log => LogScale::new(&LogScaleConfig {
                domain,
                range,
                clamp: options.clamp,
                nice: options.nice,
                ..Default::default()
            })
            .into(),
        }
    }

    pub fn nice(self, count: Option<usize>) -> Self {
        match self {
            NumericScale::Linear(scale) => NumericScale::Linear(scale.nice(count)),
            NumericScale::Log(scale) => NumericScale::Log(scale.nice()),
        }
    }
}

impl ContinuousNumericScale for NumericScale {
    fn domain(&self) -> (f64, f64) {
        match self {
            NumericScale::Linear(scale) => scale.domain(),
            NumericScale::Log(scale) => scale.domain(),
        }
    }

    fn range(&self) -> (f64, f64) {
        match self {
            NumericScale::Linear(scale) => scale.range(),
            NumericScale::Log(scale) => scale.range(),
        }
    }

    fn clamp(&self) -> bool {
        match self {
            NumericScale::Linear(scale) => scale.clamp(),
            NumericScale::Log(scale) => scale.clamp(),
        }
    }

    fn scale(&self, value: f64) -> f64 {
        match self {
            NumericScale::Linear(scale) => scale.scale(value),
            NumericScale::Log(scale) => scale.scale(value),
        }
    }

    fn invert(&self, value: f64) -> f64 {
        match self {
            NumericScale::Linear(scale) => scale.invert(value),
            NumericScale::Log(scale) => scale.invert(value),
        }
    }

    fn ticks(&self, count: Option<f64>) -> Vec<f64> {
        match self {
            NumericScale::Linear(scale) => scale.ticks(count),
            NumericScale::Log(scale) => scale.ticks(count),
        }
    }
}

impl From<LinearScale> for NumericScale {
    fn from(scale: LinearScale) -> Self {
        NumericScale::Linear(scale)
    }
}

impl From<LogScale> for NumericScale {
    fn from(scale: LogScale) -> Self {
        NumericScale::Log(scale)
    }
}
