//! Map assembly.
//!
//! Samples the height field, normalizes it against its global extrema, then
//! classifies every cell into a biome. Both passes are parallel and the result
//! depends only on the seed and the config.

use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::artifact::{BiomeHistogram, MapArtifact};
use crate::biomes::{BiomeClassifier, CellSample};
use crate::cell::HexCell;
use crate::config::GeneratorConfig;
use crate::coords::to_world_space;
use crate::error::ConfigError;
use crate::noise_field::FractalNoise;
use crate::seeds::{cell_seed, MapSeeds};
use crate::tilemap::Tilemap;

// =============================================================================
// HEIGHT CONSTANTS
// =============================================================================

/// Height assigned to every cell when the raw field is perfectly flat.
pub const FLAT_FIELD_HEIGHT: f64 = 0.5;

/// Step used when quantizing normalized heights into integer levels.
pub const QUANTIZE_STEP: f64 = 0.025;

/// Highest quantized level (`1.0 / QUANTIZE_STEP`).
pub const MAX_HEIGHT_LEVEL: u8 = 40;

/// Statistics gathered while generating a map
#[derive(Clone, Debug)]
pub struct GenerationReport {
    /// Smallest raw noise value before normalization
    pub raw_min: f64,
    /// Largest raw noise value before normalization
    pub raw_max: f64,
    /// True when the raw field was flat and every height fell back to 0.5
    pub flat: bool,
    pub histogram: BiomeHistogram,
    pub height_pass: Duration,
    pub classify_pass: Duration,
}

/// A generated map together with its normalized height field.
pub struct GeneratedMap {
    pub artifact: MapArtifact,
    /// Normalized heights in [0, 1], index-aligned with the artifact's cells
    pub heights: Tilemap<f64>,
    pub report: GenerationReport,
}

// =============================================================================
// MAIN MAP GENERATION
// =============================================================================

/// Generate a map for `seed`. Identical inputs always produce identical maps.
pub fn generate_map(seed: &str, config: &GeneratorConfig) -> Result<MapArtifact, ConfigError> {
    Ok(generate_map_detailed(seed, config)?.artifact)
}

/// Generate a map and keep the intermediate height field and statistics.
pub fn generate_map_detailed(seed: &str, config: &GeneratorConfig) -> Result<GeneratedMap, ConfigError> {
    generate_with_seeds(&MapSeeds::from_master(seed), config)
}

/// Generate a map with explicit sub-seeds:
/// 1. Pass 1 samples the height field for every cell and reduces it to global extrema
/// 2. Heights are normalized against those extrema
/// 3. Pass 2 samples the forest channel, draws the cosmetic coin flip and classifies
///
/// Both passes run on the rayon pool. Pass 2 never starts before the extrema exist,
/// and each cell draws from its own random stream, so the result does not depend on
/// how work is scheduled.
pub fn generate_with_seeds(seeds: &MapSeeds, config: &GeneratorConfig) -> Result<GeneratedMap, ConfigError> {
    config.validate()?;

    let dims = config.dimensions();
    info!(seed = %seeds.master, dimensions = %dims, wrap = ?config.wrap, "generating map");

    let field = FractalNoise::new(seeds.height, config.noise.clone(), config.wrap, dims.world_extent());

    // Pass 1: raw height field + global extrema
    let start = Instant::now();
    let raw = Tilemap::par_from_fn(dims, |_, coord| field.height(to_world_space(coord)));
    let (raw_min, raw_max) = raw.min_max().unwrap_or((FLAT_FIELD_HEIGHT, FLAT_FIELD_HEIGHT));
    let flat = raw_max <= raw_min;
    if flat {
        warn!(value = raw_min, "height field is flat, using {} for every cell", FLAT_FIELD_HEIGHT);
    }
    let heights = normalize_heights(&raw, raw_min, raw_max);
    let height_pass = start.elapsed();
    debug!(raw_min, raw_max, elapsed = ?height_pass, "height pass complete");

    // Pass 2: classification
    let start = Instant::now();
    let classifier = BiomeClassifier::new(&config.thresholds);
    let normalized = heights.as_slice();
    let cells = Tilemap::par_from_fn(dims, |index, coord| {
        let mut rng = ChaCha8Rng::seed_from_u64(cell_seed(seeds.cosmetic, index));
        let sample = CellSample {
            height: normalized[index as usize],
            forest: field.forest(to_world_space(coord)),
            draw: rng.gen::<f64>(),
        };
        HexCell::new(coord, classifier.classify(&sample))
    });
    let classify_pass = start.elapsed();

    let artifact = MapArtifact::from_canonical(dims, seeds.master.clone(), cells.into_vec());
    let histogram = artifact.biome_histogram();
    info!(
        elapsed = ?(height_pass + classify_pass),
        "map generated: {}",
        histogram
    );

    Ok(GeneratedMap {
        artifact,
        heights,
        report: GenerationReport {
            raw_min,
            raw_max,
            flat,
            histogram,
            height_pass,
            classify_pass,
        },
    })
}

// =============================================================================
// NORMALIZATION
// =============================================================================

/// Map a raw height into [0, 1] against the global extrema.
///
/// A flat field (`max <= min`) maps everything to [`FLAT_FIELD_HEIGHT`].
pub fn normalize(h: f64, min: f64, max: f64) -> f64 {
    if max > min {
        ((h - min) / (max - min)).clamp(0.0, 1.0)
    } else {
        FLAT_FIELD_HEIGHT
    }
}

/// Normalize a whole raw field in parallel.
pub fn normalize_heights(raw: &Tilemap<f64>, min: f64, max: f64) -> Tilemap<f64> {
    let values = raw.as_slice();
    Tilemap::par_from_fn(raw.dimensions(), |index, _| normalize(values[index as usize], min, max))
}

/// Quantize a normalized height into an integer level in `0..=MAX_HEIGHT_LEVEL`.
pub fn quantize_height(h: f64) -> u8 {
    (h.clamp(0.0, 1.0) / QUANTIZE_STEP).round() as u8
}
