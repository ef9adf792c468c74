//! Seedable 3D gradient noise.
//!
//! The field owns a 512-entry permutation table: 256 random bytes followed by
//! the same 256 bytes again, so lattice lookups can index `perm[i + 1]`
//! without wrapping. After construction the table is never touched, which
//! makes [`NoiseField::noise`] a pure function of its inputs and lets one
//! field be shared by reference between threads.

use std::fmt;

use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};

const TABLE_SIZE: usize = 256;

/// Coherent noise oracle used to roughen the vase surface.
#[derive(Clone)]
pub struct NoiseField {
    seed: u64,
    perm: [u8; TABLE_SIZE * 2],
}

impl NoiseField {
    /// Builds the permutation table from an explicit seed. Equal seeds yield
    /// identical fields.
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut first = [0u8; TABLE_SIZE];
        rng.fill_bytes(&mut first);

        let mut perm = [0u8; TABLE_SIZE * 2];
        perm[..TABLE_SIZE].copy_from_slice(&first);
        perm[TABLE_SIZE..].copy_from_slice(&first);

        Self { seed, perm }
    }

    /// Draws a seed from the thread-local generator. The chosen seed is kept
    /// and available through [`NoiseField::seed`] so a result can be rebuilt.
    pub fn with_random_seed() -> Self {
        Self::new(rand::rng().random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Samples the field. The result lies roughly in `[-1, 1]` and is exactly
    /// zero on integer lattice points.
    pub fn noise(&self, x: f64, y: f64, z: f64) -> f64 {
        let (xi, xf) = split(x);
        let (yi, yf) = split(y);
        let (zi, zf) = split(z);

        let u = fade(xf);
        let v = fade(yf);
        let w = fade(zf);

        let p = &self.perm;
        let a = usize::from(p[xi]) + yi;
        let aa = usize::from(p[a]) + zi;
        let ab = usize::from(p[a + 1]) + zi;
        let b = usize::from(p[xi + 1]) + yi;
        let ba = usize::from(p[b]) + zi;
        let bb = usize::from(p[b + 1]) + zi;

        lerp(
            w,
            lerp(
                v,
                lerp(u, grad(p[aa], xf, yf, zf), grad(p[ba], xf - 1.0, yf, zf)),
                lerp(
                    u,
                    grad(p[ab], xf, yf - 1.0, zf),
                    grad(p[bb], xf - 1.0, yf - 1.0, zf),
                ),
            ),
            lerp(
                v,
                lerp(
                    u,
                    grad(p[aa + 1], xf, yf, zf - 1.0),
                    grad(p[ba + 1], xf - 1.0, yf, zf - 1.0),
                ),
                lerp(
                    u,
                    grad(p[ab + 1], xf, yf - 1.0, zf - 1.0),
                    grad(p[bb + 1], xf - 1.0, yf - 1.0, zf - 1.0),
                ),
            ),
        )
    }
}

impl fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoiseField")
            .field("seed", &self.seed)
            .finish()
    }
}

/// Lattice cell (wrapped into the table) and fractional offset.
fn split(value: f64) -> (usize, f64) {
    let floor = value.floor();
    let cell = (floor as i64).rem_euclid(TABLE_SIZE as i64) as usize;
    (cell, value - floor)
}

/// Quintic `6t^5 - 15t^4 + 10t^3`.
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

/// Dot product with one of 12 cube-edge directions picked by the low four
/// bits of the hash (16 cases, four of them repeated).
fn grad(hash: u8, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    let u = if h & 1 == 0 { u } else { -u };
    let v = if h & 2 == 0 { v } else { -v };
    u + v
}
