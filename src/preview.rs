//! Screen mapping for previews only.
//!
//! Exported drawings and toolpaths stay in raw curve space; only the preview
//! is scaled so a `unit_span` radius fills half the canvas.

use crate::config::ParameterSet;
use crate::curve::Point;
use crate::error::{CurveError, Result};

/// Side of the square drawing canvas.
pub const CANVAS_SIZE: f64 = 2000.0;
/// Curve-space distance from centre to canvas edge in the preview.
pub const UNIT_SPAN: f64 = 350.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PreviewProjector {
    pub canvas: f64,
    pub unit_span: f64,
}

impl Default for PreviewProjector {
    fn default() -> Self {
        Self {
            canvas: CANVAS_SIZE,
            unit_span: UNIT_SPAN,
        }
    }
}

impl PreviewProjector {
    pub fn new(canvas: f64, unit_span: f64) -> Result<Self> {
        if !(canvas.is_finite() && canvas > 0.0) {
            return Err(CurveError::invalid("canvas", format!("must be > 0, got {canvas}")));
        }
        if !(unit_span.is_finite() && unit_span > 0.0) {
            return Err(CurveError::invalid("unitSpan", format!("must be > 0, got {unit_span}")));
        }
        Ok(Self { canvas, unit_span })
    }

    #[inline]
    pub fn scale(&self) -> f64 {
        self.canvas / 2.0 / self.unit_span
    }

    #[inline]
    pub fn project(&self, p: Point, x_offset: f64, y_offset: f64) -> Point {
        let s = self.scale();
        let c = self.canvas / 2.0;
        Point::new(c + x_offset * s + p.x * s, c + y_offset * s + p.y * s)
    }

    pub fn project_all(&self, points: &[Point], params: &ParameterSet) -> Vec<Point> {
        points
            .iter()
            .map(|&p| self.project(p, params.x_offset, params.y_offset))
            .collect()
    }
}
