use std::fmt;
use std::path::Path;

use crate::config::ParameterSet;
use crate::curve::Point;
use crate::error::Result;

/// Machine constants written into every program.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolpathSettings {
    pub coordinate_system: String,
    pub safe_z: f64,
    pub tool: u32,
    pub feed: f64,
    pub cut_z: f64,
    pub retract_z: f64,
}

impl Default for ToolpathSettings {
    fn default() -> Self {
        Self {
            coordinate_system: "G54".into(),
            safe_z: 5.0,
            tool: 1,
            feed: 1500.0,
            cut_z: -3.0,
            retract_z: 2.0,
        }
    }
}

fn write_program(
    out: &mut impl fmt::Write,
    first: &Point,
    rest: &[Point],
    p: &ParameterSet,
    s: &ToolpathSettings,
) -> fmt::Result {
    writeln!(out, "( Noise circles )")?;
    writeln!(
        out,
        "( startRadius {:?}  maxCircles {}  resolution {:?}  dRadius {:?}  rdn {:?}  \
         xOffset {:?}  yOffset {:?}  nSeed {:?}  penWidth {:?}  lineDistance {:?} )",
        p.start_radius,
        p.max_circles,
        p.resolution,
        p.d_radius,
        p.rdn,
        p.x_offset,
        p.y_offset,
        p.n_seed,
        p.pen_width,
        p.line_distance,
    )?;
    writeln!(out, "{}", s.coordinate_system)?;
    writeln!(out, "G90")?;
    writeln!(out, "G00 Z{}", s.safe_z)?;
    writeln!(out, "T{:02} M06", s.tool)?;
    writeln!(out, "G01 F{}", s.feed)?;

    writeln!(out, "G00 X{:.3} Y{:.3}", first.x, first.y)?;
    writeln!(out, "G01 Z{}", s.cut_z)?;
    for pt in rest {
        writeln!(out, "G01 X{:.3} Y{:.3}", pt.x, pt.y)?;
    }

    writeln!(out, "G00 Z{}", s.retract_z)?;
    writeln!(out, "T00 M06")?;
    writeln!(out, "M30")
}

/// Render the program, or `None` for an empty curve. Points are emitted in
/// raw curve space; offsets only apply to drawings.
pub fn export(points: &[Point], params: &ParameterSet, settings: &ToolpathSettings) -> Option<String> {
    let (first, rest) = points.split_first()?;

    // ~28 bytes per motion line
    let mut out = String::with_capacity(512 + points.len() * 28);
    // formatting into a String cannot fail
    write_program(&mut out, first, rest, params, settings).ok()?;
    Some(out)
}

/// Write `program` to `path` in one write.
pub fn write(program: &str, path: impl AsRef<Path>) -> Result<()> {
    std::fs::write(path.as_ref(), program)?;
    tracing::info!(path = %path.as_ref().display(), bytes = program.len(), "saved toolpath");
    Ok(())
}

/// Number of cutting moves (`G01 X.. Y..`) in a program.
pub fn count_linear_moves(program: &str) -> usize {
    program.lines().filter(|l| l.starts_with("G01 X")).count()
}
