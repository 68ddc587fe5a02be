use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;

use noisecircle::config::{MAX_SAMPLES, ParameterSet};
use noisecircle::gcode::{self, ToolpathSettings};
use noisecircle::preview::{CANVAS_SIZE, PreviewProjector, UNIT_SPAN};
use noisecircle::render;

#[derive(Parser)]
#[command(name = "noisecircle")]
#[command(about = "Grow a noise-perturbed spiral and export it as SVG and G-code", long_about = None)]
struct Cli {
    /// Parameter mapping (JSON) to start from; otherwise default_params.json
    /// in the working directory, otherwise the built-ins
    #[arg(long)]
    params: Option<PathBuf>,

    #[arg(long)]
    start_radius: Option<f64>,
    #[arg(long)]
    max_circles: Option<u32>,
    #[arg(long)]
    resolution: Option<f64>,
    #[arg(long)]
    d_radius: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    rdn: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    x_offset: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    y_offset: Option<f64>,
    /// 0 picks a random seed; the one used lands in params.json
    #[arg(long, allow_hyphen_values = true)]
    seed: Option<f64>,
    #[arg(long)]
    pen_width: Option<f64>,
    #[arg(long)]
    line_distance: Option<f64>,

    /// Side of the square drawing canvas
    #[arg(long, default_value_t = CANVAS_SIZE)]
    canvas: f64,

    /// Side of preview.png in pixels [default: canvas, at most 2000]
    #[arg(long)]
    preview_size: Option<f64>,

    /// Output directory
    #[arg(long, default_value = "artifacts")]
    out: PathBuf,

    /// Skip preview.png
    #[arg(long)]
    no_preview: bool,
}

impl Cli {
    fn parameters(&self) -> anyhow::Result<ParameterSet> {
        let mut p = match &self.params {
            Some(path) => ParameterSet::load(path)
                .with_context(|| format!("failed to load parameters from {}", path.display()))?,
            None => ParameterSet::defaults_in(".").context("failed to load default parameters")?,
        };
        if let Some(v) = self.start_radius {
            p.start_radius = v;
        }
        if let Some(v) = self.max_circles {
            p.max_circles = v;
        }
        if let Some(v) = self.resolution {
            p.resolution = v;
        }
        if let Some(v) = self.d_radius {
            p.d_radius = v;
        }
        if let Some(v) = self.rdn {
            p.rdn = v;
        }
        if let Some(v) = self.x_offset {
            p.x_offset = v;
        }
        if let Some(v) = self.y_offset {
            p.y_offset = v;
        }
        if let Some(v) = self.seed {
            p.n_seed = v;
        }
        if let Some(v) = self.pen_width {
            p.pen_width = v;
        }
        if let Some(v) = self.line_distance {
            p.line_distance = v;
        }
        Ok(p)
    }
}

fn main() -> anyhow::Result<()> {
    noisecircle::telemetry::init_tracing();
    let cli = Cli::parse();

    let params = cli.parameters()?;
    params.validate()?;
    let samples = params.sample_count();
    if samples > MAX_SAMPLES {
        bail!("run would produce {samples} points (limit {MAX_SAMPLES}); lower maxCircles or resolution");
    }

    let projector = if cli.no_preview {
        None
    } else {
        let side = cli.preview_size.unwrap_or(cli.canvas.min(CANVAS_SIZE));
        let projector = PreviewProjector::new(side, UNIT_SPAN)?;
        render::preview_side(&projector)?;
        Some(projector)
    };

    std::fs::create_dir_all(&cli.out)
        .with_context(|| format!("failed to create {}", cli.out.display()))?;

    tracing::info!(
        max_circles = params.max_circles,
        resolution = params.resolution,
        seed = params.n_seed,
        samples,
        "generating curve"
    );

    let (run, timings) =
        noisecircle::generate(&params, cli.canvas, &ToolpathSettings::default())?;

    for t in &timings {
        tracing::info!("  {:20} {:8.1} ms", t.name, t.ms);
    }

    run.curve.params.save(cli.out.join("params.json"))?;
    tracing::info!(seed = run.curve.seed, "resolved seed");

    match &run.svg {
        Some(doc) => doc.write(cli.out.join("curve.svg"))?,
        None => tracing::warn!("empty curve, no svg written"),
    }
    match &run.gcode {
        Some(program) => gcode::write(program, cli.out.join("curve.nc"))?,
        None => tracing::warn!("empty curve, no toolpath written"),
    }

    if let Some(projector) = &projector {
        let raster = render::render_preview(&run.curve.points, &run.curve.params, projector)?;
        raster.save_png(cli.out.join("preview.png"))?;
    }

    tracing::info!("done");
    Ok(())
}
