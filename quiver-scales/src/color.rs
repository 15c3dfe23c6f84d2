use palette::{Mix, Srgba};
use quiver_common::color::Color;

/// ColorBrewer "Spectral" schemes for 3 through 11 classes
const SPECTRAL: [&[u32]; 9] = [
    &[0xfc8d59, 0xffffbf, 0x99d594],
    &[0xd7191c, 0xfdae61, 0xabdda4, 0x2b83ba],
    &[0xd7191c, 0xfdae61, 0xffffbf, 0xabdda4, 0x2b83ba],
    &[0xd53e4f, 0xfc8d59, 0xfee08b, 0xe6f598, 0x99d594, 0x3288bd],
    &[0xd53e4f, 0xfc8d59, 0xfee08b, 0xffffbf, 0xe6f598, 0x99d594, 0x3288bd],
    &[
        0xd53e4f, 0xf46d43, 0xfdae61, 0xfee08b, 0xe6f598, 0xabdda4, 0x66c2a5, 0x3288bd,
    ],
    &[
        0xd53e4f, 0xf46d43, 0xfdae61, 0xfee08b, 0xffffbf, 0xe6f598, 0xabdda4, 0x66c2a5,
        0x3288bd,
    ],
    &[
        0x9e0142, 0xd53e4f, 0xf46d43, 0xfdae61, 0xfee08b, 0xe6f598, 0xabdda4, 0x66c2a5,
        0x3288bd, 0x5e4fa2,
    ],
    &[
        0x9e0142, 0xd53e4f, 0xf46d43, 0xfdae61, 0xfee08b, 0xffffbf, 0xe6f598, 0xabdda4,
        0x66c2a5, 0x3288bd, 0x5e4fa2,
    ],
];

fn from_hex(hex: u32) -> Color {
    Color::from_rgb8((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

/// The Spectral scheme with `k` colors, for `k` in `3..=11`
pub fn scheme_spectral(k: usize) -> Option<Vec<Color>> {
    let colors = SPECTRAL.get(k.checked_sub(3)?)?;
    Some(colors.iter().copied().map(from_hex).collect())
}

fn to_srgba(c: Color) -> Srgba {
    Srgba::new(c.r, c.g, c.b, c.a)
}

fn from_srgba(c: Srgba) -> Color {
    let (r, g, b, a) = c.into_components();
    Color::new(r, g, b, a)
}

/// Straight interpolation between two colors in sRGB space
pub fn interpolate_rgb(a: Color, b: Color, t: f64) -> Color {
    from_srgba(to_srgba(a).mix(to_srgba(b), t.clamp(0.0, 1.0) as f32))
}

/// Piecewise-linear interpolation through evenly spaced colors
pub fn interpolate_rgb_piecewise(colors: &[Color], t: f64) -> Color {
    match colors.len() {
        0 => Color::TRANSPARENT,
        1 => colors[0],
        n => {
            let scaled = t.clamp(0.0, 1.0) * (n - 1) as f64;
            let i = (scaled.floor() as usize).min(n - 2);
            interpolate_rgb(colors[i], colors[i + 1], scaled - i as f64)
        }
    }
}

fn basis(t1: f64, v0: f64, v1: f64, v2: f64, v3: f64) -> f64 {
    let t2 = t1 * t1;
    let t3 = t2 * t1;
    ((1.0 - 3.0 * t1 + 3.0 * t2 - t3) * v0
        + (4.0 - 6.0 * t2 + 3.0 * t3) * v1
        + (1.0 + 3.0 * t1 + 3.0 * t2 - 3.0 * t3) * v2
        + t3 * v3)
        / 6.0
}

fn basis_channel(values: &[f64], t: f64) -> f64 {
    let n = values.len() - 1;
    let t = t.clamp(0.0, 1.0);
    let i = if t >= 1.0 {
        n - 1
    } else {
        (t * n as f64).floor() as usize
    };
    let v1 = values[i];
    let v2 = values[i + 1];
    let v0 = if i > 0 { values[i - 1] } else { 2.0 * v1 - v2 };
    let v3 = if i < n - 1 {
        values[i + 2]
    } else {
        2.0 * v2 - v1
    };
    basis((t - i as f64 / n as f64) * n as f64, v0, v1, v2, v3)
}

/// Uniform B-spline through the colors, giving a smooth ramp without kinks
pub fn interpolate_rgb_basis(colors: &[Color], t: f64) -> Color {
    if colors.len() < 2 {
        return colors.first().copied().unwrap_or(Color::TRANSPARENT);
    }
    let channel = |f: fn(&Color) -> f32| {
        let values: Vec<f64> = colors.iter().map(|c| f(c) as f64).collect();
        basis_channel(&values, t).clamp(0.0, 1.0) as f32
    };
    Color::new(channel(|c| c.r), channel(|c| c.g), channel(|c| c.b), 1.0)
}

/// Continuous Spectral ramp: red at 0, yellow at 0.5, blue at 1
pub fn interpolate_spectral(t: f64) -> Color {
    let colors: Vec<Color> = SPECTRAL[SPECTRAL.len() - 1]
        .iter()
        .copied()
        .map(from_hex)
        .collect();
    interpolate_rgb_basis(&colors, t)
}

/// Samples `n` evenly spaced colors from an interpolator, endpoints included
pub fn quantize_colors(interpolator: impl Fn(f64) -> Color, n: usize) -> Vec<Color> {
    match n {
        0 => vec![],
        1 => vec![interpolator(0.0)],
        _ => (0..n)
            .map(|i| interpolator(i as f64 / (n - 1) as f64))
            .collect(),
    }
}
