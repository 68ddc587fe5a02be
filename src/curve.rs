//! Noise-modulated radial growth.
//!
//! The generator walks degrees 1..=359 once per sweep while a radius grows
//! by a fixed increment per sample. Each sample is pushed off the base
//! circle by three noise lookups. Points are in raw curve space: no
//! offsets, no scaling.

use rand::Rng;

use crate::config::{MAX_SAMPLES, ParameterSet};
use crate::error::Result;
use crate::noise::NoiseSampler;

/// Seeds closer to zero than this are replaced by a random one.
pub const ZERO_SEED_EPSILON: f64 = 1e-6;
/// Inclusive range random seeds are drawn from.
pub const RANDOM_SEED_MIN: i64 = 1;
pub const RANDOM_SEED_MAX: i64 = 10_000;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Output of one run: the parameters actually used and the path.
#[derive(Clone, Debug)]
pub struct Curve {
    pub params: ParameterSet,
    pub seed: i64,
    pub points: Vec<Point>,
}

/// Resolve `nSeed` into the integer seed for this run. A (near) zero seed
/// is replaced by a random one, which is written back into the returned
/// parameters so the run can be repeated. Any other seed is truncated
/// toward zero; validation keeps it inside the `i64` range.
pub fn resolve_seed(params: &ParameterSet, rng: &mut impl Rng) -> (ParameterSet, i64) {
    let mut params = params.clone();
    if params.n_seed.abs() < ZERO_SEED_EPSILON {
        let seed = rng.random_range(RANDOM_SEED_MIN..=RANDOM_SEED_MAX);
        params.n_seed = seed as f64;
        (params, seed)
    } else {
        let seed = params.n_seed.trunc() as i64;
        (params, seed)
    }
}

/// `sign(b) * |b|^e`, defined for negative bases.
#[inline]
pub fn signed_pow(base: f64, exp: f64) -> f64 {
    base.signum() * base.abs().powf(exp)
}

/// Generate with a thread-local RNG backing zero-seed resolution.
pub fn generate(params: &ParameterSet) -> Result<Curve> {
    generate_with_rng(params, &mut rand::rng())
}

pub fn generate_with_rng(params: &ParameterSet, rng: &mut impl Rng) -> Result<Curve> {
    params.validate()?;
    let (params, seed) = resolve_seed(params, rng);
    let noise = NoiseSampler::new(seed);
    let points = trace(&params, &noise);
    tracing::debug!(seed, points = points.len(), "curve generated");
    Ok(Curve { params, seed, points })
}

/// The growth loop proper. `params` must already be validated.
pub fn trace(params: &ParameterSet, noise: &NoiseSampler) -> Vec<Point> {
    let step = params.angular_step();
    let base = params.start_radius;
    let dr = params.growth_step();

    let capacity = params.sample_count().min(MAX_SAMPLES) as usize;
    let mut points = Vec::with_capacity(capacity);
    points.push(Point::new(base, 0.0));

    let mut radius = base;
    for _ in 0..=params.max_circles {
        for j in (1..360).step_by(step) {
            let deg = j as f64;
            let a = deg.to_radians();
            let rr = radius - params.rdn;
            let cx = rr * a.cos();
            let cy = rr * a.sin();

            let n1 = noise.sample(rr / 25.0, deg / 25.0);
            let nf1 = noise.sample(cx / 250.0 + n1, (cy * deg) / 15500.0);
            let vval = (rr * 1.5 + 55.0).powi(2) / 40000.0;
            let nf2 = noise.sample(cx / 30.0, cy / 30.0) * signed_pow(rr, 1.75) / 3500.0;
            let nf2 = nf2.abs();

            // x and y are bent by different amounts
            let ax = a + nf2 * 40.0;
            let ay = a + nf2 * 50.0;
            let amp = radius * nf1 * vval;
            points.push(Point::new(
                base * ax.cos() + amp * ax.cos(),
                base * ay.sin() + amp * ay.sin(),
            ));

            radius += dr;
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn scenario(seed: f64) -> ParameterSet {
        ParameterSet {
            start_radius: 25.0,
            max_circles: 0,
            resolution: 1.0,
            d_radius: 0.5,
            rdn: 10.0,
            x_offset: 0.0,
            y_offset: 0.0,
            n_seed: seed,
            pen_width: 0.25,
            line_distance: 1.0,
        }
    }

    #[test]
    fn first_point_is_on_base_circle() {
        let curve = generate(&scenario(1.0)).unwrap();
        assert_eq!(curve.points.len(), 360);
        assert_eq!(curve.points[0], Point::new(25.0, 0.0));
        assert_eq!(curve.seed, 1);
    }

    #[test]
    fn same_seed_same_curve() {
        let p = ParameterSet { max_circles: 3, n_seed: 321.0, ..Default::default() };
        let a = generate(&p).unwrap();
        let b = generate(&p).unwrap();
        assert_eq!(a.points, b.points);
    }

    #[test]
    fn seed_changes_curve() {
        let a = generate(&scenario(1.0)).unwrap();
        let b = generate(&scenario(2.0)).unwrap();
        assert_ne!(a.points, b.points);
    }

    #[test]
    fn zero_seed_is_resolved_and_reproducible() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let first = generate_with_rng(&scenario(0.0), &mut rng).unwrap();
        assert!((RANDOM_SEED_MIN..=RANDOM_SEED_MAX).contains(&first.seed));
        assert_eq!(first.params.n_seed, first.seed as f64);

        let again = generate(&first.params).unwrap();
        assert_eq!(again.seed, first.seed);
        assert_eq!(again.points, first.points);
    }

    #[test]
    fn fractional_seed_truncates() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let (p, seed) = resolve_seed(&scenario(7.9), &mut rng);
        assert_eq!(seed, 7);
        assert_eq!(p.n_seed, 7.9);
        let (_, seed) = resolve_seed(&scenario(-3.5), &mut rng);
        assert_eq!(seed, -3);
    }

    #[test]
    fn point_count_follows_step() {
        for (resolution, max_circles) in [(1.0, 2), (0.5, 1), (0.1, 4), (0.03, 0), (3.0, 1)] {
            let p = ParameterSet { resolution, max_circles, n_seed: 9.0, ..Default::default() };
            let step = p.angular_step();
            let per_sweep = (1..360).step_by(step).count();
            let curve = generate(&p).unwrap();
            assert_eq!(curve.points.len(), 1 + (max_circles as usize + 1) * per_sweep);
            assert_eq!(curve.points.len() as u64, p.sample_count());
        }
    }

    #[test]
    fn invalid_params_rejected_before_generation() {
        let p = ParameterSet { resolution: -1.0, ..scenario(1.0) };
        assert!(generate(&p).is_err());
        let p = ParameterSet { start_radius: 0.0, ..scenario(1.0) };
        assert!(generate(&p).is_err());
    }

    #[test]
    fn accepted_params_only_yield_finite_points() {
        let runs = [
            ParameterSet { d_radius: 1e90, max_circles: 0, ..scenario(3.0) },
            ParameterSet { rdn: -1e70, ..scenario(3.0) },
            ParameterSet { resolution: 1e-310, d_radius: 0.0, max_circles: 3, ..scenario(3.0) },
        ];
        for p in runs {
            let curve = generate(&p).unwrap();
            assert!(
                curve.points.iter().all(|pt| pt.x.is_finite() && pt.y.is_finite()),
                "non-finite point for {p:?}"
            );
        }
        let overflowing = ParameterSet { d_radius: 1e200, max_circles: 0, ..scenario(3.0) };
        assert!(generate(&overflowing).is_err());
    }

    #[test]
    fn negative_base_stays_finite() {
        // rdn beyond the radius drives r - rdn negative for the whole run
        let p = ParameterSet { rdn: 500.0, max_circles: 1, ..scenario(4.0) };
        let curve = generate(&p).unwrap();
        assert!(curve.points.iter().all(|pt| pt.x.is_finite() && pt.y.is_finite()));
        assert_eq!(signed_pow(-16.0, 0.5), -4.0);
        assert_eq!(signed_pow(16.0, 0.5), 4.0);
    }
}
