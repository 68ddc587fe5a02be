use std::fmt;
use std::path::Path;

use crate::config::ParameterSet;
use crate::curve::Point;
use crate::error::Result;

pub const STROKE: &str = "blue";

/// A square drawing holding one open, stroke-only polyline inside a
/// translated group. Points are raw curve space; only the group moves them.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorDocument {
    pub size: f64,
    pub translate: (f64, f64),
    pub stroke_width: f64,
    pub points: Vec<Point>,
}

/// Build the drawing, or `None` when there is nothing to draw.
pub fn export(points: &[Point], params: &ParameterSet, canvas: f64) -> Option<VectorDocument> {
    if points.is_empty() {
        return None;
    }
    Some(VectorDocument {
        size: canvas,
        translate: (canvas / 2.0 + params.x_offset, canvas / 2.0 + params.y_offset),
        stroke_width: params.pen_width,
        points: points.to_vec(),
    })
}

impl VectorDocument {
    /// Points as they land on the page after the group transform.
    pub fn placed_points(&self) -> impl Iterator<Item = Point> + '_ {
        let (tx, ty) = self.translate;
        self.points.iter().map(move |p| Point::new(p.x + tx, p.y + ty))
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_string())?;
        tracing::info!(path = %path.as_ref().display(), points = self.points.len(), "saved svg");
        Ok(())
    }
}

impl fmt::Display for VectorDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, r#"<?xml version="1.0" encoding="utf-8" ?>"#)?;
        write!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" baseProfile="full" width="{s}" height="{s}">"#,
            s = self.size
        )?;
        write!(
            f,
            r#"<g transform="translate({}, {})">"#,
            self.translate.0, self.translate.1
        )?;
        f.write_str(r#"<polyline points=""#)?;
        for (i, p) in self.points.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{},{}", p.x, p.y)?;
        }
        write!(
            f,
            r#"" fill="none" stroke="{STROKE}" stroke-width="{}" />"#,
            self.stroke_width
        )?;
        writeln!(f, "</g></svg>")
    }
}
