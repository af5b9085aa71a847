//! Biome classification.
//!
//! A cell is classified by walking an ordered rule table; the first rule whose
//! condition matches picks the biome and decides the cosmetic variant. New biomes are
//! added as new rules rather than new branches.

use serde::{Deserialize, Serialize};

use crate::cell::{grass, Biome, CellDetails};
use crate::error::ConfigError;

// =============================================================================
// THRESHOLDS
// =============================================================================

/// Tunable thresholds for the default rule table. Heights are normalized to [0, 1].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeThresholds {
    /// Heights at or below this are water
    pub sea_level: f64,
    /// Width of the beach band above sea level
    pub beach_band: f64,
    /// Heights at or above this are mountains
    pub mountain_level: f64,
    /// Forest channel values at or above this are forest
    pub forest_threshold: f64,
    /// Probability that a grass cell gets tall grass
    pub long_grass_chance: f64,
}

impl Default for BiomeThresholds {
    fn default() -> Self {
        Self {
            sea_level: 0.44,
            beach_band: 0.01,
            mountain_level: 0.84,
            forest_threshold: 0.65,
            long_grass_chance: 0.15,
        }
    }
}

impl BiomeThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit = |name: &str, v: f64| -> Result<(), ConfigError> {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(ConfigError::InvalidThresholds(format!(
                    "{} must be within [0, 1], got {}",
                    name, v
                )))
            }
        };
        unit("sea_level", self.sea_level)?;
        unit("beach_band", self.beach_band)?;
        unit("mountain_level", self.mountain_level)?;
        unit("forest_threshold", self.forest_threshold)?;
        unit("long_grass_chance", self.long_grass_chance)?;
        if self.sea_level > self.mountain_level {
            return Err(ConfigError::InvalidThresholds(format!(
                "sea_level ({}) is above mountain_level ({})",
                self.sea_level, self.mountain_level
            )));
        }
        Ok(())
    }
}

// =============================================================================
// RULE TABLE
// =============================================================================

/// Per-cell inputs to classification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellSample {
    /// Normalized height in [0, 1]
    pub height: f64,
    /// Forest channel in [0, 1]
    pub forest: f64,
    /// Uniform draw in [0, 1) from the cell's own random stream
    pub draw: f64,
}

/// When a rule applies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RuleCondition {
    HeightAtMost(f64),
    HeightAtLeast(f64),
    ForestAtLeast(f64),
    Always,
}

impl RuleCondition {
    fn matches(&self, sample: &CellSample) -> bool {
        match *self {
            RuleCondition::HeightAtMost(level) => sample.height <= level,
            RuleCondition::HeightAtLeast(level) => sample.height >= level,
            RuleCondition::ForestAtLeast(level) => sample.forest >= level,
            RuleCondition::Always => true,
        }
    }
}

/// How the cosmetic nibble is chosen once a rule has matched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CosmeticRule {
    None,
    /// `value` with the given probability, otherwise 0.
    Chance { value: u8, probability: f64 },
}

impl CosmeticRule {
    fn pick(&self, draw: f64) -> u8 {
        match *self {
            CosmeticRule::None => 0,
            CosmeticRule::Chance { value, probability } => {
                if draw < probability {
                    value
                } else {
                    0
                }
            }
        }
    }
}

/// One entry in the classification table
#[derive(Clone, Debug)]
pub struct BiomeRule {
    pub condition: RuleCondition,
    pub biome: Biome,
    pub cosmetic: CosmeticRule,
    /// Description for debugging
    pub description: &'static str,
}

/// Build the default ordered rule table from thresholds.
pub fn default_rules(t: &BiomeThresholds) -> Vec<BiomeRule> {
    vec![
        BiomeRule {
            condition: RuleCondition::HeightAtMost(t.sea_level),
            biome: Biome::Water,
            cosmetic: CosmeticRule::None,
            description: "At or below sea level",
        },
        BiomeRule {
            condition: RuleCondition::HeightAtMost(t.sea_level + t.beach_band),
            biome: Biome::Beach,
            cosmetic: CosmeticRule::None,
            description: "Thin band just above sea level",
        },
        BiomeRule {
            condition: RuleCondition::HeightAtLeast(t.mountain_level),
            biome: Biome::Mountain,
            cosmetic: CosmeticRule::None,
            description: "High ground",
        },
        BiomeRule {
            condition: RuleCondition::ForestAtLeast(t.forest_threshold),
            biome: Biome::Forest,
            cosmetic: CosmeticRule::None,
            description: "Land where the forest channel is strong",
        },
        BiomeRule {
            condition: RuleCondition::Always,
            biome: Biome::Grass,
            cosmetic: CosmeticRule::Chance {
                value: grass::TALL_GRASS,
                probability: t.long_grass_chance,
            },
            description: "Everything else, sometimes with tall grass",
        },
    ]
}

/// Ordered, first-match-wins biome classifier.
#[derive(Clone, Debug)]
pub struct BiomeClassifier {
    rules: Vec<BiomeRule>,
}

impl BiomeClassifier {
    pub fn new(thresholds: &BiomeThresholds) -> Self {
        Self::with_rules(default_rules(thresholds))
    }

    /// Use a custom table. A trailing catch-all is appended if the table lacks one,
    /// so every sample is classified.
    pub fn with_rules(mut rules: Vec<BiomeRule>) -> Self {
        let has_fallback = rules
            .last()
            .is_some_and(|rule| rule.condition == RuleCondition::Always);
        if !has_fallback {
            rules.push(BiomeRule {
                condition: RuleCondition::Always,
                biome: Biome::Grass,
                cosmetic: CosmeticRule::None,
                description: "Fallback",
            });
        }
        Self { rules }
    }

    pub fn rules(&self) -> &[BiomeRule] {
        &self.rules
    }

    pub fn classify(&self, sample: &CellSample) -> CellDetails {
        self.rules
            .iter()
            .find(|rule| rule.condition.matches(sample))
            .map(|rule| CellDetails::new(rule.biome, rule.cosmetic.pick(sample.draw)))
            .unwrap_or_else(|| CellDetails::new(Biome::Grass, 0))
    }
}

impl Default for BiomeClassifier {
    fn default() -> Self {
        Self::new(&BiomeThresholds::default())
    }
}
