use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Octaves summed per sample.
pub const OCTAVES: u32 = 4;
/// Amplitude multiplier applied per added octave.
pub const PERSISTENCE: f64 = 0.35;
/// Frequency multiplier applied per added octave.
pub const LACUNARITY: f64 = 2.0;

/// 2D lattice gradients: the four axes and the four diagonals.
const GRAD2: [[f64; 2]; 8] = [
    [1.0, 1.0], [-1.0, 1.0], [1.0, -1.0], [-1.0, -1.0],
    [1.0, 0.0], [-1.0, 0.0], [0.0, 1.0], [0.0, -1.0],
];

#[inline]
fn smootherstep(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Seeded Perlin noise. The permutation table is owned, so samplers built
/// from different seeds never interfere.
#[derive(Clone)]
pub struct NoiseSampler {
    seed: i64,
    perm: [u8; 512],
}

impl NoiseSampler {
    pub fn new(seed: i64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed as u64);
        let mut perm = [0u8; 512];
        for (i, p) in perm.iter_mut().take(256).enumerate() {
            *p = i as u8;
        }
        // Fisher-Yates
        for i in (1..256).rev() {
            let j = rng.random_range(0..=i);
            perm.swap(i, j);
        }
        perm.copy_within(0..256, 256);
        Self { seed, perm }
    }

    pub fn seed(&self) -> i64 {
        self.seed
    }

    #[inline]
    fn grad(&self, hash: u8, dx: f64, dy: f64) -> f64 {
        let g = GRAD2[(hash & 7) as usize];
        g[0] * dx + g[1] * dy
    }

    /// Single-octave gradient noise, roughly in [-1, 1].
    pub fn perlin(&self, x: f64, y: f64) -> f64 {
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let ix = (x0 as i64 & 255) as usize;
        let iy = (y0 as i64 & 255) as usize;

        let p = &self.perm;
        let a = p[ix] as usize + iy;
        let b = p[ix + 1] as usize + iy;

        let v00 = self.grad(p[a], fx, fy);
        let v10 = self.grad(p[b], fx - 1.0, fy);
        let v01 = self.grad(p[a + 1], fx, fy - 1.0);
        let v11 = self.grad(p[b + 1], fx - 1.0, fy - 1.0);

        let sx = smootherstep(fx);
        let sy = smootherstep(fy);
        lerp(lerp(v00, v10, sx), lerp(v01, v11, sx), sy)
    }

    /// Octave sum normalised by the total amplitude.
    pub fn fbm(&self, x: f64, y: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
        let mut sum = 0.0;
        let mut amp = 1.0;
        let mut freq = 1.0;
        let mut norm = 0.0;
        for _ in 0..octaves {
            sum += self.perlin(x * freq, y * freq) * amp;
            norm += amp;
            amp *= persistence;
            freq *= lacunarity;
        }
        if norm > 0.0 { sum / norm } else { 0.0 }
    }

    /// Noise used by the curve generator, mapped to [0, 1].
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let raw = self.fbm(x, y, OCTAVES, PERSISTENCE, LACUNARITY);
        ((raw + 1.0) / 2.0).clamp(0.0, 1.0)
    }
}
