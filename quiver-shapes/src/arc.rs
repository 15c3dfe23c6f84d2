//! Pie layout and arc (annular sector) paths.
//!
//! Angles are in radians, measured clockwise from 12 o'clock, with the arc
//! centered on the origin.

use std::cmp::Ordering;
use std::f64::consts::{FRAC_PI_2, TAU};

use log::warn;
use lyon_path::geom::{Angle, Arc};
use lyon_path::math::{point, vector};
use lyon_path::Path;

use crate::svg::path_to_svg;

const EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PieSort {
    /// Largest slice first
    #[default]
    ValueDescending,
    ValueAscending,
    /// Keep input order
    Preserve,
}

#[derive(Debug, Clone)]
pub struct Pie {
    pub sort: PieSort,
    pub start_angle: f64,
    pub end_angle: f64,
    pub pad_angle: f64,
}

impl Default for Pie {
    fn default() -> Self {
        Self {
            sort: PieSort::ValueDescending,
            start_angle: 0.0,
            end_angle: TAU,
            pad_angle: 0.0,
        }
    }
}

/// One slice of a pie layout, reported in input order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieSlice {
    /// Position of the slice's datum in the input
    pub index: usize,
    pub value: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub pad_angle: f64,
}

impl PieSlice {
    pub fn angle(&self) -> f64 {
        self.end_angle - self.start_angle
    }
}

impl Pie {
    /// Lays out `values` using the configured sort.
    pub fn layout(&self, values: &[f64]) -> Vec<PieSlice> {
        match self.sort {
            PieSort::ValueDescending => {
                self.layout_by(values, |v| *v, |a, b| b.total_cmp(a))
            }
            PieSort::ValueAscending => self.layout_by(values, |v| *v, |a, b| a.total_cmp(b)),
            PieSort::Preserve => self.layout_by(values, |v| *v, |_, _| Ordering::Equal),
        }
    }

    /// Lays out `items`, assigning angles in the order given by `compare`.
    ///
    /// The sort is stable, so a comparator that always returns `Equal` keeps
    /// input order. Non-positive and missing values get zero-width slices.
    /// When nothing is positive every slice has zero width at `start_angle`.
    pub fn layout_by<T>(
        &self,
        items: &[T],
        value: impl Fn(&T) -> f64,
        compare: impl Fn(&T, &T) -> Ordering,
    ) -> Vec<PieSlice> {
        let n = items.len();
        let values: Vec<f64> = items.iter().map(&value).collect();
        let sum: f64 = values.iter().filter(|v| **v > 0.0).sum();

        let span = (self.end_angle - self.start_angle).clamp(-TAU, TAU);
        let pad = self.pad_angle.min(span.abs() / n.max(1) as f64);
        let padding = if span < 0.0 { -pad } else { pad };
        let k = if sum > 0.0 {
            (span - n as f64 * padding) / sum
        } else {
            if n > 0 {
                warn!("pie layout over {n} values has no positive total; slices have zero width");
            }
            0.0
        };

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|a, b| compare(&items[*a], &items[*b]));

        let mut slices = vec![
            PieSlice {
                index: 0,
                value: 0.0,
                start_angle: 0.0,
                end_angle: 0.0,
                pad_angle: 0.0,
            };
            n
        ];

        let mut a0 = self.start_angle;
        for i in order {
            let v = values[i];
            let width = if v > 0.0 { v * k } else { 0.0 };
            let a1 = a0 + width + if sum > 0.0 { padding } else { 0.0 };
            slices[i] = PieSlice {
                index: i,
                value: v,
                start_angle: a0,
                end_angle: a1,
                pad_angle: pad,
            };
            a0 = a1;
        }
        slices
    }
}

/// Annular sector generator; an inner radius of zero gives pie wedges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcGenerator {
    pub inner_radius: f64,
    pub outer_radius: f64,
}

impl ArcGenerator {
    pub fn new(inner_radius: f64, outer_radius: f64) -> Self {
        Self {
            inner_radius,
            outer_radius,
        }
    }

    /// Point on a circle of radius `r` at pie angle `a`
    fn at(r: f64, a: f64) -> [f64; 2] {
        [r * a.sin(), -r * a.cos()]
    }

    fn sweep(builder: &mut lyon_path::path::Builder, r: f64, from: f64, sweep: f64) {
        let arc = Arc {
            center: point(0.0, 0.0),
            radii: vector(r as f32, r as f32),
            start_angle: Angle::radians((from - FRAC_PI_2) as f32),
            sweep_angle: Angle::radians(sweep as f32),
            x_rotation: Angle::radians(0.0),
        };
        arc.for_each_quadratic_bezier(&mut |q| {
            builder.quadratic_bezier_to(q.ctrl, q.to);
        });
    }

    /// Path for a sector between `start_angle` and `end_angle`
    pub fn path(&self, start_angle: f64, end_angle: f64) -> Path {
        let (r0, r1) = if self.inner_radius <= self.outer_radius {
            (self.inner_radius.max(0.0), self.outer_radius.max(0.0))
        } else {
            (self.outer_radius.max(0.0), self.inner_radius.max(0.0))
        };
        let da = (end_angle - start_angle).clamp(-TAU, TAU);

        let mut builder = Path::builder();
        if r1 <= EPSILON {
            builder.begin(point(0.0, 0.0));
            builder.end(true);
            return builder.build();
        }

        let [x, y] = Self::at(r1, start_angle);
        builder.begin(point(x as f32, y as f32));
        Self::sweep(&mut builder, r1, start_angle, da);

        let full_circle = da.abs() >= TAU - EPSILON;
        if r0 > EPSILON {
            if full_circle {
                // Separate subpath for the hole
                builder.end(true);
                let [x, y] = Self::at(r0, end_angle);
                builder.begin(point(x as f32, y as f32));
            } else {
                let [x, y] = Self::at(r0, end_angle);
                builder.line_to(point(x as f32, y as f32));
            }
            Self::sweep(&mut builder, r0, end_angle, -da);
        } else if !full_circle {
            builder.line_to(point(0.0, 0.0));
        }
        builder.end(true);
        builder.build()
    }

    pub fn slice_path(&self, slice: &PieSlice) -> Path {
        self.path(slice.start_angle, slice.end_angle)
    }

    pub fn slice_svg(&self, slice: &PieSlice) -> String {
        path_to_svg(&self.slice_path(slice))
    }

    /// Midpoint of the sector, halfway between the radii and the angles.
    /// Used to place slice labels.
    pub fn centroid(&self, slice: &PieSlice) -> [f64; 2] {
        let r = (self.inner_radius + self.outer_radius) / 2.0;
        let a = (slice.start_angle + slice.end_angle) / 2.0;
        Self::at(r, a)
    }
}
