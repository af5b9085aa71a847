//! Seeded fractal noise field.
//!
//! Two sampling modes are supported:
//! 1. Plane: plain 2D fBm over world-space positions.
//! 2. Torus: every octave samples 4D noise along two interlocking circles, so the
//!    field repeats exactly with the grid's world extent in both directions.

use std::f64::consts::TAU;

use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::coords::WorldPos;
use crate::error::ConfigError;
use crate::seeds::noise_seed;

// =============================================================================
// NOISE PARAMETERS
// =============================================================================

/// Parameters for the fractal noise field
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    /// Frequency of the first octave (lower = larger features)
    pub base_frequency: f64,
    /// Number of noise octaves
    pub octaves: u32,
    /// Amplitude decay per octave (0.0-1.0)
    pub persistence: f64,
    /// Frequency multiplier per octave
    pub lacunarity: f64,
    /// Shift applied to every coordinate of the forest channel
    pub forest_offset: f64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            base_frequency: 0.02,
            octaves: 5,
            persistence: 0.5,
            lacunarity: 2.0,
            forest_offset: 4000.0,
        }
    }
}

impl NoiseParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.octaves == 0 {
            return Err(ConfigError::InvalidNoise("octaves must be at least 1".into()));
        }
        if !(self.base_frequency > 0.0 && self.base_frequency.is_finite()) {
            return Err(ConfigError::InvalidNoise(format!(
                "base_frequency must be positive, got {}",
                self.base_frequency
            )));
        }
        if !(self.lacunarity > 0.0 && self.lacunarity.is_finite()) {
            return Err(ConfigError::InvalidNoise(format!(
                "lacunarity must be positive, got {}",
                self.lacunarity
            )));
        }
        if !(self.persistence > 0.0 && self.persistence.is_finite()) {
            return Err(ConfigError::InvalidNoise(format!(
                "persistence must be positive, got {}",
                self.persistence
            )));
        }
        if !self.forest_offset.is_finite() {
            return Err(ConfigError::InvalidNoise("forest_offset must be finite".into()));
        }
        Ok(())
    }
}

/// How grid positions are mapped into the noise domain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapMode {
    /// Flat 2D field; opposite map edges do not match.
    Plane,
    /// Seam-free field that wraps in both directions.
    #[default]
    Torus,
}

// =============================================================================
// FRACTAL NOISE FIELD
// =============================================================================

#[derive(Clone, Copy, Debug)]
enum Domain {
    Plane,
    Torus { period_x: f64, period_y: f64 },
}

/// Deterministic multi-octave noise field over world space.
///
/// Stateless once built: every sample depends only on the position, so the field
/// can be shared across rayon workers.
pub struct FractalNoise {
    primitive: Perlin,
    params: NoiseParams,
    domain: Domain,
}

impl FractalNoise {
    /// Build a field for a grid whose world-space extent is `extent`.
    ///
    /// `extent` is only used in [`WrapMode::Torus`], where it becomes the wrap period.
    pub fn new(seed: u64, params: NoiseParams, mode: WrapMode, extent: (f64, f64)) -> Self {
        let domain = match mode {
            WrapMode::Plane => Domain::Plane,
            WrapMode::Torus => Domain::Torus {
                period_x: extent.0,
                period_y: extent.1,
            },
        };
        Self {
            primitive: Perlin::new(noise_seed(seed)),
            params,
            domain,
        }
    }

    pub fn params(&self) -> &NoiseParams {
        &self.params
    }

    /// Primary height channel, in [0, 1].
    pub fn height(&self, pos: WorldPos) -> f64 {
        self.sample_shifted(pos, 0.0)
    }

    /// Auxiliary forest channel, in [0, 1]. Same field, shifted far enough to be
    /// decorrelated from [`FractalNoise::height`].
    pub fn forest(&self, pos: WorldPos) -> f64 {
        self.sample_shifted(pos, self.params.forest_offset)
    }

    fn sample_shifted(&self, pos: WorldPos, offset: f64) -> f64 {
        let total = match self.domain {
            Domain::Plane => fbm_plane(&self.primitive, &self.params, pos, offset),
            Domain::Torus { period_x, period_y } => {
                fbm_torus(&self.primitive, &self.params, pos, period_x, period_y, offset)
            }
        };
        (total * 0.5 + 0.5).clamp(0.0, 1.0)
    }
}

/// Fractional Brownian motion on the plane, normalized to [-1, 1].
fn fbm_plane(noise: &impl NoiseFn<f64, 2>, params: &NoiseParams, pos: WorldPos, offset: f64) -> f64 {
    let x = pos.x + offset;
    let y = pos.y + offset;

    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = params.base_frequency;
    let mut max_value = 0.0;

    for _ in 0..params.octaves {
        total += amplitude * primitive_2d(noise, x * frequency, y * frequency);
        max_value += amplitude;
        amplitude *= params.persistence;
        frequency *= params.lacunarity;
    }

    total / max_value
}

/// Fractional Brownian motion on a torus embedded in 4D, normalized to [-1, 1].
///
/// Each axis becomes a circle whose circumference equals that axis' period times the
/// octave frequency, so feature size matches [`fbm_plane`] while both edges wrap.
fn fbm_torus(
    noise: &impl NoiseFn<f64, 4>,
    params: &NoiseParams,
    pos: WorldPos,
    period_x: f64,
    period_y: f64,
    offset: f64,
) -> f64 {
    let angle_x = TAU * pos.x / period_x;
    let angle_y = TAU * pos.y / period_y;
    let (sin_x, cos_x) = angle_x.sin_cos();
    let (sin_y, cos_y) = angle_y.sin_cos();
    let radius_x = period_x / TAU;
    let radius_y = period_y / TAU;

    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = params.base_frequency;
    let mut max_value = 0.0;

    for _ in 0..params.octaves {
        let rx = radius_x * frequency;
        let ry = radius_y * frequency;
        let point = [
            rx * cos_x + offset,
            rx * sin_x + offset,
            ry * cos_y + offset,
            ry * sin_y + offset,
        ];
        total += amplitude * noise.get(point).clamp(-1.0, 1.0);
        max_value += amplitude;
        amplitude *= params.persistence;
        frequency *= params.lacunarity;
    }

    total / max_value
}

fn primitive_2d(noise: &impl NoiseFn<f64, 2>, x: f64, y: f64) -> f64 {
    noise.get([x, y]).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn torus_field(seed: u64) -> FractalNoise {
        FractalNoise::new(seed, NoiseParams::default(), WrapMode::Torus, (40.0, 30.0))
    }

    #[test]
    fn test_same_seed_same_field() {
        let a = torus_field(7);
        let b = torus_field(7);
        for i in 0..50 {
            let pos = WorldPos { x: i as f64 * 0.77, y: i as f64 * 1.31 };
            assert_eq!(a.height(pos).to_bits(), b.height(pos).to_bits());
            assert_eq!(a.forest(pos).to_bits(), b.forest(pos).to_bits());
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = torus_field(1);
        let b = torus_field(2);
        let differs = (0..50).any(|i| {
            let pos = WorldPos { x: i as f64 * 0.9, y: i as f64 * 0.4 };
            (a.height(pos) - b.height(pos)).abs() > 1e-9
        });
        assert!(differs);
    }

    #[test]
    fn test_output_in_unit_range() {
        for mode in [WrapMode::Plane, WrapMode::Torus] {
            let field = FractalNoise::new(99, NoiseParams::default(), mode, (64.0, 32.0));
            for i in 0..200 {
                let pos = WorldPos { x: i as f64 * 0.37, y: i as f64 * 0.53 };
                let h = field.height(pos);
                let f = field.forest(pos);
                assert!((0.0..=1.0).contains(&h), "height {} out of range", h);
                assert!((0.0..=1.0).contains(&f), "forest {} out of range", f);
            }
        }
    }

    #[test]
    fn test_torus_wraps_both_axes() {
        let field = torus_field(1234);
        for i in 0..40 {
            let pos = WorldPos { x: i as f64 * 1.7, y: i as f64 * 0.9 };
            let h = field.height(pos);
            let wrapped_x = field.height(WorldPos { x: pos.x + 40.0, y: pos.y });
            let wrapped_y = field.height(WorldPos { x: pos.x, y: pos.y + 30.0 });
            assert!((h - wrapped_x).abs() < 1e-9);
            assert!((h - wrapped_y).abs() < 1e-9);

            let f = field.forest(pos);
            let f_wrapped = field.forest(WorldPos { x: pos.x - 40.0, y: pos.y + 30.0 });
            assert!((f - f_wrapped).abs() < 1e-9);
        }
    }

    #[test]
    fn test_forest_channel_is_decorrelated() {
        let field = torus_field(5);
        let differs = (0..50).any(|i| {
            let pos = WorldPos { x: i as f64 * 0.8, y: i as f64 * 0.6 };
            (field.height(pos) - field.forest(pos)).abs() > 1e-6
        });
        assert!(differs);
    }

    #[test]
    fn test_fbm_normalizes_by_amplitude_sum() {
        // A constant primitive must come back unchanged regardless of octave count.
        struct Constant(f64);
        impl NoiseFn<f64, 2> for Constant {
            fn get(&self, _point: [f64; 2]) -> f64 {
                self.0
            }
        }
        for octaves in 1..6 {
            let params = NoiseParams { octaves, ..NoiseParams::default() };
            let total = fbm_plane(&Constant(0.4), &params, WorldPos { x: 3.0, y: 4.0 }, 0.0);
            assert!((total - 0.4).abs() < 1e-12);
        }
    }

    #[test]
    fn test_params_validation() {
        assert!(NoiseParams::default().validate().is_ok());
        let bad = NoiseParams { octaves: 0, ..NoiseParams::default() };
        assert!(matches!(bad.validate(), Err(ConfigError::InvalidNoise(_))));
        let bad = NoiseParams { base_frequency: 0.0, ..NoiseParams::default() };
        assert!(bad.validate().is_err());
        let bad = NoiseParams { lacunarity: f64::NAN, ..NoiseParams::default() };
        assert!(bad.validate().is_err());
    }
}
