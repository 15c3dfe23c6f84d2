use log::debug;
use lyon_path::math::point;
use lyon_path::Path;

use crate::svg::path_to_svg;

/// Builds a polyline through `points`.
///
/// A `None` or non-finite point ends the current segment, leaving a gap.
/// Isolated single points become closed zero-length segments so they still
/// render with round caps.
pub fn line_path(points: impl IntoIterator<Item = Option<[f64; 2]>>) -> Path {
    let mut builder = Path::builder();
    let mut segment_len = 0usize;
    let mut gaps = 0usize;

    for p in points {
        match p.filter(|[x, y]| x.is_finite() && y.is_finite()) {
            Some([x, y]) => {
                let at = point(x as f32, y as f32);
                if segment_len == 0 {
                    builder.begin(at);
                } else {
                    builder.line_to(at);
                }
                segment_len += 1;
            }
            None => {
                gaps += 1;
                if segment_len > 0 {
                    builder.end(segment_len == 1);
                }
                segment_len = 0;
            }
        }
    }
    if segment_len > 0 {
        builder.end(segment_len == 1);
    }
    if gaps > 0 {
        debug!("line has {gaps} undefined points");
    }
    builder.build()
}

/// Line generator reading x and y through accessors.
pub struct LineGenerator<'a, T> {
    x: Box<dyn Fn(&T) -> Option<f64> + 'a>,
    y: Box<dyn Fn(&T) -> Option<f64> + 'a>,
}

impl<'a, T> LineGenerator<'a, T> {
    pub fn new(
        x: impl Fn(&T) -> Option<f64> + 'a,
        y: impl Fn(&T) -> Option<f64> + 'a,
    ) -> Self {
        Self {
            x: Box::new(x),
            y: Box::new(y),
        }
    }

    pub fn path<'b>(&self, items: impl IntoIterator<Item = &'b T>) -> Path
    where
        T: 'b,
    {
        line_path(
            items
                .into_iter()
                .map(|item| Some([(self.x)(item)?, (self.y)(item)?])),
        )
    }

    pub fn svg<'b>(&self, items: impl IntoIterator<Item = &'b T>) -> String
    where
        T: 'b,
    {
        path_to_svg(&self.path(items))
    }
}
