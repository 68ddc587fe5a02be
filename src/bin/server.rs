use std::net::SocketAddr;

use anyhow::Context;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use noisecircle::CurveError;
use noisecircle::config::{MAX_SAMPLES, ParameterSet};
use noisecircle::gcode::ToolpathSettings;
use noisecircle::preview::{CANVAS_SIZE, PreviewProjector, UNIT_SPAN};
use noisecircle::render;

#[derive(Parser)]
#[command(name = "server", about = "HTTP front end for the noise circle generator")]
struct Args {
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: SocketAddr,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    start_radius: Option<f64>,
    max_circles: Option<u32>,
    resolution: Option<f64>,
    d_radius: Option<f64>,
    rdn: Option<f64>,
    x_offset: Option<f64>,
    y_offset: Option<f64>,
    n_seed: Option<f64>,
    pen_width: Option<f64>,
    line_distance: Option<f64>,
    // Output
    canvas: Option<f64>,
    preview_size: Option<f64>,
}

impl GenerateRequest {
    fn params(&self) -> ParameterSet {
        let d = ParameterSet::default();
        ParameterSet {
            start_radius: self.start_radius.unwrap_or(d.start_radius),
            max_circles: self.max_circles.unwrap_or(d.max_circles),
            resolution: self.resolution.unwrap_or(d.resolution),
            d_radius: self.d_radius.unwrap_or(d.d_radius),
            rdn: self.rdn.unwrap_or(d.rdn),
            x_offset: self.x_offset.unwrap_or(d.x_offset),
            y_offset: self.y_offset.unwrap_or(d.y_offset),
            n_seed: self.n_seed.unwrap_or(d.n_seed),
            pen_width: self.pen_width.unwrap_or(d.pen_width),
            line_distance: self.line_distance.unwrap_or(d.line_distance),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    params: ParameterSet,
    seed: i64,
    point_count: usize,
    svg: Option<String>,
    gcode: Option<String>,
    preview: String,
    timings: Vec<TimingEntry>,
}

#[derive(Serialize)]
struct TimingEntry {
    name: String,
    ms: f64,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

enum ApiError {
    Invalid(String),
    Internal(String),
}

impl From<CurveError> for ApiError {
    fn from(err: CurveError) -> Self {
        match err {
            CurveError::InvalidConfiguration { .. } => ApiError::Invalid(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::Invalid(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        tracing::warn!(%status, %error, "request failed");
        (status, Json(ErrorBody { error })).into_response()
    }
}

fn run(req: GenerateRequest) -> Result<GenerateResponse, ApiError> {
    let params = req.params();
    params.validate()?;
    let samples = params.sample_count();
    if samples > MAX_SAMPLES {
        return Err(ApiError::Invalid(format!(
            "run would produce {samples} points (limit {MAX_SAMPLES})"
        )));
    }

    let canvas = req.canvas.unwrap_or(CANVAS_SIZE);
    let (run, timings) = noisecircle::generate(&params, canvas, &ToolpathSettings::default())?;

    let projector = PreviewProjector::new(req.preview_size.unwrap_or(canvas), UNIT_SPAN)?;
    let raster = render::render_preview(&run.curve.points, &run.curve.params, &projector)?;
    let png = raster.encode_png()?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&png);

    Ok(GenerateResponse {
        seed: run.curve.seed,
        point_count: run.curve.points.len(),
        svg: run.svg.map(|doc| doc.to_string()),
        gcode: run.gcode,
        preview: format!("data:image/png;base64,{}", b64),
        timings: timings
            .iter()
            .map(|t| TimingEntry {
                name: t.name.to_string(),
                ms: t.ms,
            })
            .collect(),
        params: run.curve.params,
    })
}

async fn generate_handler(
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let response = tokio::task::spawn_blocking(move || run(req))
        .await
        .map_err(|err| ApiError::Internal(format!("generation task failed: {err}")))??;
    tracing::info!(
        seed = response.seed,
        points = response.point_count,
        "generated"
    );
    Ok(Json(response))
}

async fn defaults_handler() -> Json<ParameterSet> {
    Json(ParameterSet::default())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    noisecircle::telemetry::init_tracing();
    let args = Args::parse();

    let app = Router::new()
        .route("/api/generate", post(generate_handler))
        .route("/api/defaults", get(defaults_handler))
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .with_context(|| format!("failed to bind {}", args.addr))?;
    tracing::info!("noisecircle server at http://{}", args.addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
