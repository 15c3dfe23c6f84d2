use serde::{Deserialize, Serialize};

use crate::error::QuiverCommonError;

/// Straight-alpha RGBA color with components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    /// Parses any CSS color string (`#ccc`, `orange`, `rgb(1, 2, 3)`, ...)
    pub fn parse(css: &str) -> Result<Self, QuiverCommonError> {
        let c = css
            .trim()
            .parse::<css_color_parser::Color>()
            .map_err(|_| QuiverCommonError::InvalidColor(css.to_string()))?;
        Ok(Self::new(
            c.r as f32 / 255.0,
            c.g as f32 / 255.0,
            c.b as f32 / 255.0,
            c.a,
        ))
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    fn channel(v: f32) -> u8 {
        (v.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    /// CSS serialization: `#rrggbb` when opaque, `rgba(...)` otherwise
    pub fn to_css(&self) -> String {
        let (r, g, b) = (
            Self::channel(self.r),
            Self::channel(self.g),
            Self::channel(self.b),
        );
        if self.a >= 1.0 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("rgba({r}, {g}, {b}, {})", self.a.clamp(0.0, 1.0))
        }
    }
}

impl From<[f32; 4]> for Color {
    fn from(c: [f32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_css())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("#ccc", "#cccccc")]
    #[case("orange", "#ffa500")]
    #[case("#eee", "#eeeeee")]
    #[case("rgb(255, 0, 0)", "#ff0000")]
    fn test_parse_roundtrip(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Color::parse(input).unwrap().to_css(), expected);
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(
            Color::parse("not-a-color"),
            Err(QuiverCommonError::InvalidColor("not-a-color".to_string()))
        );
    }

    #[test]
    fn test_translucent_css() {
        assert_eq!(
            Color::new(1.0, 0.0, 0.0, 0.5).to_css(),
            "rgba(255, 0, 0, 0.5)"
        );
    }
}
