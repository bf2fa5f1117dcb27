//! Scoring configuration: per-category weight vectors, fitness tolerances and
//! age-bracket multipliers.
//!
//! The built-in defaults live here as data. A deployment can replace them with
//! a JSON file (see `SCORING_CONFIG_PATH`), which is validated on load.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::models::{ActivityCategory, AgeRange, WeatherAttribute};

/// Allowed drift when checking that a weight vector sums to 1.0.
const WEIGHT_SUM_EPSILON: f64 = 1e-6;

#[derive(Debug, thiserror::Error)]
pub enum ScoringConfigError {
    #[error("IO error reading scoring config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid scoring config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No weight vector for category '{0:?}'")]
    MissingCategory(ActivityCategory),
    #[error("Weights for '{category:?}' sum to {sum}, expected 1.0")]
    WeightSum { category: ActivityCategory, sum: f64 },
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// One number per scored weather attribute.
///
/// Used both for category weight vectors (which must sum to 1.0) and for
/// age-bracket multipliers (which need not).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeWeights {
    pub temperature: f64,
    pub precipitation: f64,
    pub wind: f64,
    pub cloud_cover: f64,
}

impl AttributeWeights {
    pub const UNIT: AttributeWeights = AttributeWeights {
        temperature: 1.0,
        precipitation: 1.0,
        wind: 1.0,
        cloud_cover: 1.0,
    };

    pub fn get(&self, attribute: WeatherAttribute) -> f64 {
        match attribute {
            WeatherAttribute::Temperature => self.temperature,
            WeatherAttribute::Precipitation => self.precipitation,
            WeatherAttribute::Wind => self.wind,
            WeatherAttribute::CloudCover => self.cloud_cover,
        }
    }

    pub fn sum(&self) -> f64 {
        self.temperature + self.precipitation + self.wind + self.cloud_cover
    }

    fn all_finite_non_negative(&self) -> bool {
        WeatherAttribute::ALL
            .iter()
            .map(|a| self.get(*a))
            .all(|w| w.is_finite() && w >= 0.0)
    }
}

/// Distance beyond the ideal range at which fitness reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    pub temperature_c: f64,
    pub precipitation_pct: f64,
    pub wind_kmh: f64,
    pub cloud_cover_pct: f64,
}

impl Tolerances {
    pub fn get(&self, attribute: WeatherAttribute) -> f64 {
        match attribute {
            WeatherAttribute::Temperature => self.temperature_c,
            WeatherAttribute::Precipitation => self.precipitation_pct,
            WeatherAttribute::Wind => self.wind_kmh,
            WeatherAttribute::CloudCover => self.cloud_cover_pct,
        }
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            temperature_c: 10.0,
            precipitation_pct: 40.0,
            wind_kmh: 25.0,
            cloud_cover_pct: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub category_weights: HashMap<ActivityCategory, AttributeWeights>,
    #[serde(default)]
    pub tolerances: Tolerances,
    /// Brackets without an entry are left unweighted.
    #[serde(default)]
    pub age_multipliers: HashMap<AgeRange, AttributeWeights>,
}

impl ScoringConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ScoringConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json(&raw)?;
        tracing::info!("Loaded scoring config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self, ScoringConfigError> {
        let config: ScoringConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        for category in ActivityCategory::ALL {
            let weights = self
                .category_weights
                .get(&category)
                .ok_or(ScoringConfigError::MissingCategory(category))?;
            if !weights.all_finite_non_negative() {
                return Err(ScoringConfigError::InvalidValue {
                    field: format!("category_weights.{:?}", category),
                    message: "weights must be finite and non-negative".to_string(),
                });
            }
            let sum = weights.sum();
            if (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
                return Err(ScoringConfigError::WeightSum { category, sum });
            }
        }

        for attribute in WeatherAttribute::ALL {
            let tolerance = self.tolerances.get(attribute);
            if !tolerance.is_finite() || tolerance <= 0.0 {
                return Err(ScoringConfigError::InvalidValue {
                    field: format!("tolerances.{:?}", attribute),
                    message: format!("must be a positive number, got {}", tolerance),
                });
            }
        }

        for (age_range, multipliers) in &self.age_multipliers {
            if !multipliers.all_finite_non_negative() {
                return Err(ScoringConfigError::InvalidValue {
                    field: format!("age_multipliers.{:?}", age_range),
                    message: "multipliers must be finite and non-negative".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Weight vector for a category. Validation guarantees every category is
    /// present, so the fallback only matters for hand-built configs.
    pub fn weights_for(&self, category: ActivityCategory) -> AttributeWeights {
        self.category_weights
            .get(&category)
            .or_else(|| self.category_weights.get(&ActivityCategory::Other))
            .copied()
            .unwrap_or(OTHER_WEIGHTS)
    }

    pub fn multipliers_for(&self, age_range: AgeRange) -> AttributeWeights {
        self.age_multipliers
            .get(&age_range)
            .copied()
            .unwrap_or(AttributeWeights::UNIT)
    }
}

// Outdoor activities care most about temperature, then rain.
const OUTDOOR_WEIGHTS: AttributeWeights = AttributeWeights {
    temperature: 0.45,
    precipitation: 0.30,
    wind: 0.15,
    cloud_cover: 0.10,
};

const SOCIAL_WEIGHTS: AttributeWeights = AttributeWeights {
    temperature: 0.40,
    precipitation: 0.35,
    wind: 0.15,
    cloud_cover: 0.10,
};

// Mostly indoors: rain and wind barely matter.
const CREATIVE_WEIGHTS: AttributeWeights = AttributeWeights {
    temperature: 0.60,
    precipitation: 0.20,
    wind: 0.05,
    cloud_cover: 0.15,
};

const OTHER_WEIGHTS: AttributeWeights = AttributeWeights {
    temperature: 0.40,
    precipitation: 0.30,
    wind: 0.20,
    cloud_cover: 0.10,
};

impl Default for ScoringConfig {
    fn default() -> Self {
        let category_weights = HashMap::from([
            (ActivityCategory::Outdoor, OUTDOOR_WEIGHTS),
            (ActivityCategory::Social, SOCIAL_WEIGHTS),
            (ActivityCategory::Creative, CREATIVE_WEIGHTS),
            (ActivityCategory::Other, OTHER_WEIGHTS),
        ]);

        let age_multipliers = HashMap::from([
            (
                AgeRange::From18To24,
                AttributeWeights {
                    temperature: 0.9,
                    ..AttributeWeights::UNIT
                },
            ),
            (
                AgeRange::From45To54,
                AttributeWeights {
                    temperature: 1.1,
                    wind: 1.1,
                    ..AttributeWeights::UNIT
                },
            ),
            (
                AgeRange::Over55,
                AttributeWeights {
                    temperature: 1.25,
                    precipitation: 1.1,
                    wind: 1.25,
                    cloud_cover: 1.0,
                },
            ),
        ]);

        Self {
            category_weights,
            tolerances: Tolerances::default(),
            age_multipliers,
        }
    }
}
