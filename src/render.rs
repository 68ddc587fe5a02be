use std::path::Path;

use image::ImageEncoder;
use image::codecs::png::PngEncoder;

use crate::config::ParameterSet;
use crate::curve::Point;
use crate::error::{CurveError, Result};
use crate::preview::PreviewProjector;

const BACKGROUND: [u8; 4] = [255, 255, 255, 255];
const PEN: [u8; 4] = [0, 0, 200, 255];

/// Largest preview side accepted, in pixels.
pub const MAX_PREVIEW_SIDE: u32 = 8192;

/// Square RGBA raster of the projected curve.
pub struct Raster {
    pub side: u32,
    pub rgba: Vec<u8>,
}

impl Raster {
    fn blank(side: u32) -> Self {
        let n = side as usize * side as usize;
        let mut rgba = Vec::with_capacity(n * 4);
        for _ in 0..n {
            rgba.extend_from_slice(&BACKGROUND);
        }
        Self { side, rgba }
    }

    #[inline]
    fn plot(&mut self, x: f64, y: f64) {
        let (x, y) = (x.round(), y.round());
        let side = self.side as f64;
        if !(x >= 0.0 && y >= 0.0 && x < side && y < side) {
            return;
        }
        let i = (y as usize * self.side as usize + x as usize) * 4;
        self.rgba[i..i + 4].copy_from_slice(&PEN);
    }

    /// Liang-Barsky clip of `a..b` to the raster square (with a half-pixel margin).
    fn clip(&self, a: Point, b: Point) -> Option<(Point, Point)> {
        let (lo, hi) = (-0.5, self.side as f64 - 0.5);
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let (mut t0, mut t1) = (0.0f64, 1.0f64);
        for (p, q) in [(-dx, a.x - lo), (dx, hi - a.x), (-dy, a.y - lo), (dy, hi - a.y)] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
            if t0 > t1 {
                return None;
            }
        }
        Some((
            Point::new(a.x + dx * t0, a.y + dy * t0),
            Point::new(a.x + dx * t1, a.y + dy * t1),
        ))
    }

    /// DDA line, one plot per pixel step along the major axis.
    fn line(&mut self, a: Point, b: Point) {
        let Some((a, b)) = self.clip(a, b) else {
            return;
        };
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let steps = dx.abs().max(dy.abs()).ceil();
        if !steps.is_finite() {
            return;
        }
        let n = (steps as u32).max(1);
        for k in 0..=n {
            let t = k as f64 / n as f64;
            self.plot(a.x + dx * t, a.y + dy * t);
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.side as usize + x as usize) * 4;
        [self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]]
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        PngEncoder::new(&mut buf).write_image(
            &self.rgba,
            self.side,
            self.side,
            image::ExtendedColorType::Rgba8,
        )?;
        Ok(buf)
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        image::save_buffer(
            path.as_ref(),
            &self.rgba,
            self.side,
            self.side,
            image::ColorType::Rgba8,
        )?;
        tracing::info!(path = %path.as_ref().display(), side = self.side, "saved preview");
        Ok(())
    }
}

/// Pixel side of the raster for `projector`, checked against the limit.
pub fn preview_side(projector: &PreviewProjector) -> Result<u32> {
    let side = projector.canvas.round();
    if !(side >= 1.0 && side <= MAX_PREVIEW_SIDE as f64) {
        return Err(CurveError::invalid(
            "previewSize",
            format!("must be within 1..={MAX_PREVIEW_SIDE}, got {side}"),
        ));
    }
    Ok(side as u32)
}

/// Stroke the curve as the interactive preview shows it.
pub fn render_preview(
    points: &[Point],
    params: &ParameterSet,
    projector: &PreviewProjector,
) -> Result<Raster> {
    let mut raster = Raster::blank(preview_side(projector)?);
    let screen = projector.project_all(points, params);
    for seg in screen.windows(2) {
        raster.line(seg[0], seg[1]);
    }
    if let [only] = screen.as_slice() {
        raster.plot(only.x, only.y);
    }
    Ok(raster)
}
