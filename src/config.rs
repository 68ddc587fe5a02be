use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CurveError, Result};

/// File looked up by [`ParameterSet::defaults_in`].
pub const DEFAULT_PARAMS_FILE: &str = "default_params.json";

/// Upper bound on points per run accepted by the front ends.
pub const MAX_SAMPLES: u64 = 20_000_000;

/// Seeds are truncated to `i64`; magnitudes from 2^63 up would saturate.
const SEED_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// One generation run's inputs. Persisted as a flat camelCase JSON mapping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParameterSet {
    pub start_radius: f64,
    pub max_circles: u32,
    /// Angular sampling density; 1.0 samples every degree.
    pub resolution: f64,
    pub d_radius: f64,
    pub rdn: f64,
    pub x_offset: f64,
    pub y_offset: f64,
    /// Zero means "pick one", see [`crate::curve::resolve_seed`].
    pub n_seed: f64,
    pub pen_width: f64,
    pub line_distance: f64,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            start_radius: 25.0,
            max_circles: 310,
            resolution: 1.0,
            d_radius: 0.5,
            rdn: 10.0,
            x_offset: 0.0,
            y_offset: 0.0,
            n_seed: 0.0,
            pen_width: 0.25,
            line_distance: 1.0,
        }
    }
}

fn finite(field: &'static str, v: f64) -> Result<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CurveError::invalid(field, format!("must be finite, got {v}")))
    }
}

fn positive(field: &'static str, v: f64) -> Result<()> {
    if finite(field, v)? > 0.0 {
        Ok(())
    } else {
        Err(CurveError::invalid(field, format!("must be > 0, got {v}")))
    }
}

fn non_negative(field: &'static str, v: f64) -> Result<()> {
    if finite(field, v)? >= 0.0 {
        Ok(())
    } else {
        Err(CurveError::invalid(field, format!("must be >= 0, got {v}")))
    }
}

impl ParameterSet {
    /// Reject any field outside its allowed range.
    pub fn validate(&self) -> Result<()> {
        positive("startRadius", self.start_radius)?;
        positive("resolution", self.resolution)?;
        non_negative("dRadius", self.d_radius)?;
        finite("rdn", self.rdn)?;
        finite("xOffset", self.x_offset)?;
        finite("yOffset", self.y_offset)?;
        finite("nSeed", self.n_seed)?;
        positive("penWidth", self.pen_width)?;
        non_negative("lineDistance", self.line_distance)?;
        if self.n_seed.abs() >= SEED_LIMIT {
            return Err(CurveError::invalid(
                "nSeed",
                format!("must lie within the 64-bit integer range, got {}", self.n_seed),
            ));
        }
        self.check_growth()
    }

    /// Radius increment applied after every sample.
    pub fn growth_step(&self) -> f64 {
        self.line_distance * self.d_radius / (360.0 * self.resolution)
    }

    /// The radius only grows, so the largest terms of the loop are reached
    /// at one of its two ends. Every such term must stay finite.
    fn check_growth(&self) -> Result<()> {
        let dr = self.growth_step();
        if !dr.is_finite() {
            return Err(CurveError::invalid(
                "dRadius",
                format!("growth per sample overflows ({dr})"),
            ));
        }
        let last = self.start_radius + dr * (self.sample_count() - 1) as f64;
        if !last.is_finite() {
            return Err(CurveError::invalid(
                "maxCircles",
                format!("final radius overflows ({last})"),
            ));
        }
        let offset = (self.start_radius - self.rdn).abs().max((last - self.rdn).abs());
        let vval = (offset * 1.5 + 55.0).powi(2) / 40000.0;
        let amp = last * vval;
        let bend = offset.powf(1.75) / 3500.0 * 50.0;
        if !(amp.is_finite() && bend.is_finite()) {
            return Err(CurveError::invalid(
                "dRadius",
                format!("radius range {}..{last} overflows the sample terms", self.start_radius),
            ));
        }
        Ok(())
    }

    /// Degrees between consecutive samples. Halves round to even; a step
    /// beyond the sweep saturates to one sample per sweep.
    pub fn angular_step(&self) -> usize {
        let s = (1.0 / self.resolution).round_ties_even();
        // `as` saturates, so +inf becomes usize::MAX
        if s > 1.0 { s as usize } else { 1 }
    }

    /// Samples per sweep over degrees 1..=359.
    pub fn samples_per_sweep(&self) -> usize {
        358 / self.angular_step() + 1
    }

    /// Number of points `generate` will produce, initial point included.
    pub fn sample_count(&self) -> u64 {
        let sweeps = self.max_circles as u64 + 1;
        sweeps
            .saturating_mul(self.samples_per_sweep() as u64)
            .saturating_add(1)
    }

    /// Load a parameter mapping. Accepts either the flat mapping or a
    /// window-state object holding it under `"params"`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let value = match value {
            Value::Object(mut state) if state.get("params").is_some_and(Value::is_object) => {
                state.remove("params").unwrap_or(Value::Null)
            }
            other => other,
        };
        Ok(serde_json::from_value(value)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), text)?;
        tracing::info!(path = %path.as_ref().display(), "saved parameters");
        Ok(())
    }

    /// `default_params.json` from `dir` if present, otherwise the built-ins.
    pub fn defaults_in(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join(DEFAULT_PARAMS_FILE);
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading default parameters");
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_defaults_are_valid() {
        ParameterSet::default().validate().unwrap();
    }

    #[test]
    fn rejects_non_positive_resolution_and_radius() {
        let p = ParameterSet { resolution: 0.0, ..Default::default() };
        assert!(matches!(
            p.validate(),
            Err(CurveError::InvalidConfiguration { field: "resolution", .. })
        ));
        let p = ParameterSet { start_radius: -1.0, ..Default::default() };
        assert!(matches!(
            p.validate(),
            Err(CurveError::InvalidConfiguration { field: "startRadius", .. })
        ));
        let p = ParameterSet { pen_width: f64::NAN, ..Default::default() };
        assert!(p.validate().is_err());
    }

    #[test]
    fn rejects_growth_that_overflows() {
        let huge_step = ParameterSet { d_radius: 1e200, max_circles: 0, n_seed: 3.0, ..Default::default() };
        assert!(matches!(
            huge_step.validate(),
            Err(CurveError::InvalidConfiguration { field: "dRadius", .. })
        ));
        let tiny_resolution = ParameterSet { resolution: 1e-310, max_circles: 0, n_seed: 3.0, ..Default::default() };
        assert!(tiny_resolution.validate().is_err());
        let far_offset = ParameterSet { rdn: -1e300, n_seed: 3.0, ..Default::default() };
        assert!(far_offset.validate().is_err());
        let infinite_step = ParameterSet { d_radius: 1e306, line_distance: 1e306, ..Default::default() };
        assert!(infinite_step.validate().is_err());
    }

    #[test]
    fn rejects_seeds_beyond_integer_range() {
        for n_seed in [1e30, -2e30, 9.3e18] {
            let p = ParameterSet { n_seed, ..Default::default() };
            assert!(matches!(
                p.validate(),
                Err(CurveError::InvalidConfiguration { field: "nSeed", .. })
            ));
        }
        let p = ParameterSet { n_seed: 9.2e18, ..Default::default() };
        p.validate().unwrap();
    }

    #[test]
    fn subnormal_resolution_samples_once_per_sweep() {
        let p = ParameterSet { resolution: 1e-310, d_radius: 0.0, max_circles: 2, ..Default::default() };
        p.validate().unwrap();
        assert_eq!(p.angular_step(), usize::MAX);
        assert_eq!(p.samples_per_sweep(), 1);
        assert_eq!(p.sample_count(), 4);
    }

    #[test]
    fn angular_step_rounds_half_to_even() {
        let step = |resolution| ParameterSet { resolution, ..Default::default() }.angular_step();
        assert_eq!(step(1.0), 1);
        assert_eq!(step(2.0), 1);
        assert_eq!(step(0.5), 2);
        assert_eq!(step(0.4), 2); // 2.5 -> 2
        assert_eq!(step(1.0 / 3.5), 4);
        assert_eq!(step(0.1), 10);
    }

    #[test]
    fn sample_count_matches_sweep_arithmetic() {
        let p = ParameterSet { max_circles: 0, ..Default::default() };
        assert_eq!(p.sample_count(), 360);
        let p = ParameterSet { max_circles: 2, resolution: 0.1, ..Default::default() };
        // j = 1, 11, ..., 351
        assert_eq!(p.samples_per_sweep(), 36);
        assert_eq!(p.sample_count(), 1 + 3 * 36);
    }

    #[test]
    fn json_uses_flat_camel_case_keys() {
        let json = serde_json::to_value(ParameterSet::default()).unwrap();
        for key in [
            "startRadius", "maxCircles", "resolution", "dRadius", "rdn",
            "xOffset", "yOffset", "nSeed", "penWidth", "lineDistance",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn partial_mapping_falls_back_to_defaults() {
        let p = ParameterSet::from_json(r#"{"maxCircles": 3, "nSeed": 42}"#).unwrap();
        assert_eq!(p.max_circles, 3);
        assert_eq!(p.n_seed, 42.0);
        assert_eq!(p.start_radius, 25.0);
    }

    #[test]
    fn window_state_object_is_unwrapped() {
        let state = r#"{"size": [1024, 768], "pos": [0, 0], "max": false,
                        "params": {"rdn": 4.5, "penWidth": 1.0}}"#;
        let p = ParameterSet::from_json(state).unwrap();
        assert_eq!(p.rdn, 4.5);
        assert_eq!(p.pen_width, 1.0);
    }

    #[test]
    fn defaults_in_prefers_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(ParameterSet::defaults_in(dir.path()).unwrap(), ParameterSet::default());

        let custom = ParameterSet { max_circles: 7, ..Default::default() };
        custom.save(dir.path().join(DEFAULT_PARAMS_FILE)).unwrap();
        assert_eq!(ParameterSet::defaults_in(dir.path()).unwrap(), custom);
    }
}
