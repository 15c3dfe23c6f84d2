use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

/// Easing curves mapping normalized time in [0, 1] to progress in [0, 1]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, VariantNames,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Easing {
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    #[default]
    CubicInOut,
    SinIn,
    SinOut,
    SinInOut,
}

impl Easing {
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => t * (2.0 - t),
            Easing::QuadInOut => {
                let t = t * 2.0;
                if t <= 1.0 {
                    t * t / 2.0
                } else {
                    let t = t - 1.0;
                    (t * (2.0 - t) + 1.0) / 2.0
                }
            }
            Easing::CubicIn => t * t * t,
            Easing::CubicOut => {
                let t = t - 1.0;
                t * t * t + 1.0
            }
            Easing::CubicInOut => {
                let t = t * 2.0;
                if t <= 1.0 {
                    t * t * t / 2.0
                } else {
                    let t = t - 2.0;
                    (t * t * t + 2.0) / 2.0
                }
            }
            Easing::SinIn => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - (t * FRAC_PI_2).cos()
                }
            }
            Easing::SinOut => (t * FRAC_PI_2).sin(),
            Easing::SinInOut => (1.0 - (std::f64::consts::PI * t).cos()) / 2.0,
        }
    }
}
