use std::f32::consts::TAU;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{FeatureSequence, NoiseField, TriangleMesh};

/// Rings or columns below this are raised to it.
pub const MIN_SEGMENTS: u32 = 3;

/// Radii (and heights) below this are treated as zero. Vertices this close
/// to the axis are left where they are instead of being rescaled.
const GEOMETRY_EPSILON: f32 = 1e-6;

/// Noise coordinate weights for the angular, height and loudness axes.
const ANGLE_FREQUENCY: f32 = 2.0;
const CENTROID_WEIGHT: f32 = 0.001;
const HEIGHT_FREQUENCY: f32 = 5.0;
const AMPLITUDE_FREQUENCY: f32 = 10.0;

/// Shape parameters for a generated vase. Lengths are in centimetres by
/// convention; nothing here enforces a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub height: f32,
    pub base_radius: f32,
    pub top_radius: f32,
    pub radial_segments: u32,
    pub height_segments: u32,
    /// Radial displacement per unit of amplitude.
    pub amplitude_gain: f32,
    /// Multiplier on the coordinates fed into the noise field.
    pub noise_scale: f32,
    /// Radial displacement per unit of noise.
    pub noise_intensity: f32,
    /// Strength of the amplitude low-pass, `0 <= f < 0.5`.
    pub smoothing_factor: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            height: 20.0,
            base_radius: 5.0,
            top_radius: 4.0,
            radial_segments: 64,
            height_segments: 64,
            amplitude_gain: 2.0,
            noise_scale: 1.0,
            noise_intensity: 0.5,
            smoothing_factor: 0.2,
        }
    }
}

impl GenerationSettings {
    fn radial_segments(&self) -> u32 {
        self.radial_segments.max(MIN_SEGMENTS)
    }

    fn height_segments(&self) -> u32 {
        self.height_segments.max(MIN_SEGMENTS)
    }

    /// Undisplaced radius at relative height `t` (0 = bottom, 1 = top).
    pub fn taper_radius(&self, t: f32) -> f32 {
        self.base_radius + (self.top_radius - self.base_radius) * t
    }
}

/// Deforms a tapered, open-ended cylinder with audio features and noise.
#[derive(Debug, Clone, Copy)]
pub struct VaseSynthesizer<'a> {
    settings: &'a GenerationSettings,
    noise: &'a NoiseField,
}

impl<'a> VaseSynthesizer<'a> {
    pub fn new(settings: &'a GenerationSettings, noise: &'a NoiseField) -> Self {
        Self { settings, noise }
    }

    /// Builds the displaced shell from already smoothed features.
    ///
    /// Returns `None` when `features` is empty.
    pub fn synthesize(&self, features: &FeatureSequence) -> Option<TriangleMesh> {
        if features.is_empty() {
            return None;
        }

        let (positions, indices) = taper_lattice(self.settings);
        let positions = positions
            .into_iter()
            .map(|position| self.displace(position, features))
            .collect();

        Some(TriangleMesh::indexed(positions, indices))
    }

    /// Pushes one lattice vertex outwards along its ring.
    ///
    /// The feature sample is the nearest one at or below the vertex height;
    /// adjacent samples are not blended.
    fn displace(&self, position: Vec3, features: &FeatureSequence) -> Vec3 {
        let settings = self.settings;
        let normalized_height = normalized_height(position.y, settings.height);

        let last = features.len().saturating_sub(1);
        let index = (normalized_height * last as f32).floor() as usize;
        let sample = features.get(index).copied().unwrap_or_default();

        let radius = position.x.hypot(position.z);
        if radius < GEOMETRY_EPSILON {
            return position;
        }

        let angle = position.z.atan2(position.x);
        let scale = f64::from(settings.noise_scale);
        let noise = self.noise.noise(
            f64::from(angle * ANGLE_FREQUENCY + sample.frequency_centroid * CENTROID_WEIGHT) * scale,
            f64::from(normalized_height * HEIGHT_FREQUENCY) * scale,
            f64::from(sample.amplitude * AMPLITUDE_FREQUENCY) * scale,
        ) as f32;

        let new_radius =
            radius + sample.amplitude * settings.amplitude_gain + noise * settings.noise_intensity;
        let factor = new_radius / radius;

        Vec3::new(position.x * factor, position.y, position.z * factor)
    }
}

/// Height relative to the bottom rim, clamped to `[0, 1]`.
fn normalized_height(y: f32, height: f32) -> f32 {
    if height.abs() < GEOMETRY_EPSILON {
        return 0.0;
    }

    ((y + height * 0.5) / height).clamp(0.0, 1.0)
}

/// Ruled-surface lattice: `height_segments + 1` rings from bottom to top, each
/// with `radial_segments + 1` vertices (the seam column is duplicated).
/// Triangles wind counter-clockwise seen from outside.
fn taper_lattice(settings: &GenerationSettings) -> (Vec<Vec3>, Vec<[u32; 3]>) {
    let columns = settings.radial_segments();
    let rows = settings.height_segments();
    let half_height = settings.height * 0.5;

    let mut positions = Vec::with_capacity(((columns + 1) * (rows + 1)) as usize);
    for row in 0..=rows {
        let t = row as f32 / rows as f32;
        let radius = settings.taper_radius(t);
        let y = -half_height + t * settings.height;

        for column in 0..=columns {
            let theta = column as f32 / columns as f32 * TAU;
            positions.push(Vec3::new(radius * theta.sin(), y, radius * theta.cos()));
        }
    }

    let stride = columns + 1;
    let mut indices = Vec::with_capacity((columns * rows * 2) as usize);
    for row in 0..rows {
        for column in 0..columns {
            let a = row * stride + column;
            let b = a + 1;
            let c = a + stride;
            let d = c + 1;
            indices.push([a, b, c]);
            indices.push([b, d, c]);
        }
    }

    (positions, indices)
}
