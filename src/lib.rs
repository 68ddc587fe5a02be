pub mod config;
pub mod curve;
pub mod error;
pub mod gcode;
pub mod noise;
pub mod preview;
pub mod render;
pub mod svg;
pub mod telemetry;

use std::time::Instant;

use rand::Rng;

use config::ParameterSet;
use curve::Curve;
use error::Result;
use gcode::ToolpathSettings;
use svg::VectorDocument;

pub use curve::Point;
pub use error::CurveError;

/// Everything one run produces. Exports are `None` for an empty curve.
pub struct Run {
    pub curve: Curve,
    pub svg: Option<VectorDocument>,
    pub gcode: Option<String>,
}

pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

/// Generate the curve and both exports.
pub fn generate(
    params: &ParameterSet,
    canvas: f64,
    toolpath: &ToolpathSettings,
) -> Result<(Run, Vec<Timing>)> {
    generate_with_rng(params, canvas, toolpath, &mut rand::rng())
}

pub fn generate_with_rng(
    params: &ParameterSet,
    canvas: f64,
    toolpath: &ToolpathSettings,
    rng: &mut impl Rng,
) -> Result<(Run, Vec<Timing>)> {
    if !(canvas.is_finite() && canvas > 0.0) {
        return Err(CurveError::invalid("canvas", format!("must be > 0, got {canvas}")));
    }

    let mut timings = Vec::new();
    let total_start = Instant::now();

    // 1. Curve
    let t = Instant::now();
    let curve = curve::generate_with_rng(params, rng)?;
    timings.push(Timing {
        name: "curve",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 2. Vector drawing
    let t = Instant::now();
    let svg = svg::export(&curve.points, &curve.params, canvas);
    timings.push(Timing {
        name: "svg",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 3. Toolpath
    let t = Instant::now();
    let gcode = gcode::export(&curve.points, &curve.params, toolpath);
    timings.push(Timing {
        name: "gcode",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    timings.push(Timing {
        name: "TOTAL",
        ms: total_start.elapsed().as_secs_f64() * 1000.0,
    });

    for t in &timings {
        tracing::debug!(stage = t.name, ms = t.ms, "stage finished");
    }

    Ok((Run { curve, svg, gcode }, timings))
}
