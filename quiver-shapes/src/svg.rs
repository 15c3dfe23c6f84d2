use std::fmt::Write;

use lyon_path::{Path, PathEvent};

/// Formats a coordinate with at most three decimals and no trailing zeros
pub fn fmt_coord(v: f32) -> String {
    let rounded = (v as f64 * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let s = format!("{rounded:.3}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Serializes a path to SVG path data (`d` attribute)
pub fn path_to_svg(path: &Path) -> String {
    let mut d = String::new();
    for event in path.iter() {
        // Writing to a String can not fail
        let _ = match event {
            PathEvent::Begin { at } => write!(d, "M{},{}", fmt_coord(at.x), fmt_coord(at.y)),
            PathEvent::Line { to, .. } => write!(d, "L{},{}", fmt_coord(to.x), fmt_coord(to.y)),
            PathEvent::Quadratic { ctrl, to, .. } => write!(
                d,
                "Q{},{},{},{}",
                fmt_coord(ctrl.x),
                fmt_coord(ctrl.y),
                fmt_coord(to.x),
                fmt_coord(to.y)
            ),
            PathEvent::Cubic {
                ctrl1, ctrl2, to, ..
            } => write!(
                d,
                "C{},{},{},{},{},{}",
                fmt_coord(ctrl1.x),
                fmt_coord(ctrl1.y),
                fmt_coord(ctrl2.x),
                fmt_coord(ctrl2.y),
                fmt_coord(to.x),
                fmt_coord(to.y)
            ),
            PathEvent::End { close: true, .. } => write!(d, "Z"),
            PathEvent::End { close: false, .. } => Ok(()),
        };
    }
    d
}
