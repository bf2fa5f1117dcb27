//! Day scoring engine.
//!
//! Turns one `WeatherDay` plus an activity's preferred conditions into a
//! 0-100 suitability score and a templated summary that names the limiting
//! factor. Everything here is pure: identical inputs give identical outputs.
//!
//! Per attribute, fitness is 1.0 inside the ideal range and decays linearly
//! to 0.0 at the configured tolerance beyond it. Fitness values are combined
//! with the category weight vector (optionally adjusted for the user's age
//! bracket), renormalized over the attributes actually present.

use chrono::NaiveDate;

use crate::errors::AppError;
use crate::helpers::{finite_or_none, fitness_to_score};
use crate::models::{Activity, PreferredConditions, UserProfile, WeatherAttribute, WeatherDay};
use crate::services::weights::{AttributeWeights, ScoringConfig, Tolerances};

/// Fitness of `value` against the inclusive range `[low, high]`.
///
/// 1.0 inside the range, falling linearly to 0.0 at `tolerance` outside
/// either edge, and 0.0 beyond that.
pub fn range_fitness(value: f64, low: f64, high: f64, tolerance: f64) -> f64 {
    let distance = if value < low {
        low - value
    } else if value > high {
        value - high
    } else {
        return 1.0;
    };

    if tolerance <= 0.0 {
        return 0.0;
    }
    (1.0 - distance / tolerance).clamp(0.0, 1.0)
}

/// Fitness for attributes that only have an upper bound (rain, wind, cloud).
pub fn ceiling_fitness(value: f64, ceiling: f64, tolerance: f64) -> f64 {
    range_fitness(value, f64::NEG_INFINITY, ceiling, tolerance)
}

/// Observed value the engine scores for `attribute`, if the day has one.
///
/// Temperature is judged on the daytime high; the low is only used when the
/// provider did not report a high.
pub fn observed_value(day: &WeatherDay, attribute: WeatherAttribute) -> Option<f64> {
    match attribute {
        WeatherAttribute::Temperature => finite_or_none(day.temperature_max_c, "temperature_max_c")
            .or_else(|| finite_or_none(day.temperature_min_c, "temperature_min_c")),
        WeatherAttribute::Precipitation => finite_or_none(
            day.precipitation_probability_pct,
            "precipitation_probability_pct",
        ),
        WeatherAttribute::Wind => finite_or_none(day.wind_speed_kmh, "wind_speed_kmh"),
        WeatherAttribute::CloudCover => finite_or_none(day.cloud_cover_pct, "cloud_cover_pct"),
    }
}

fn attribute_fitness(
    attribute: WeatherAttribute,
    value: f64,
    preferred: &PreferredConditions,
    tolerances: &Tolerances,
) -> f64 {
    let tolerance = tolerances.get(attribute);
    match attribute {
        WeatherAttribute::Temperature => range_fitness(
            value,
            preferred.ideal_temperature.min_c,
            preferred.ideal_temperature.max_c,
            tolerance,
        ),
        WeatherAttribute::Precipitation => {
            ceiling_fitness(value, preferred.max_precipitation_pct, tolerance)
        }
        WeatherAttribute::Wind => ceiling_fitness(value, preferred.max_wind_kmh, tolerance),
        WeatherAttribute::CloudCover => {
            ceiling_fitness(value, preferred.max_cloud_cover_pct, tolerance)
        }
    }
}

/// Fitness of one attribute on one day.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeFitness {
    pub attribute: WeatherAttribute,
    pub observed: f64,
    /// 0.0 (at or beyond tolerance) to 1.0 (ideal)
    pub fitness: f64,
    /// Share of the combined score after renormalization
    pub weight: f64,
}

/// Result of scoring one day for one activity.
#[derive(Debug, Clone, PartialEq)]
pub struct DayScore {
    pub date: NaiveDate,
    pub score: u8,
    pub summary: String,
    pub limiting_factor: Option<WeatherAttribute>,
    pub breakdown: Vec<AttributeFitness>,
}

/// Scores days against activities using a fixed `ScoringConfig`.
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    config: ScoringConfig,
}

impl Scorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Effective (not yet renormalized) weights for an activity and profile.
    fn effective_weights(
        &self,
        activity: &Activity,
        profile: Option<&UserProfile>,
    ) -> AttributeWeights {
        let base = self.config.weights_for(activity.category);
        let multipliers = profile
            .map(|p| self.config.multipliers_for(p.age_range))
            .unwrap_or(AttributeWeights::UNIT);

        AttributeWeights {
            temperature: base.temperature * multipliers.temperature,
            precipitation: base.precipitation * multipliers.precipitation,
            wind: base.wind * multipliers.wind,
            cloud_cover: base.cloud_cover * multipliers.cloud_cover,
        }
    }

    /// Score a single day.
    ///
    /// Attributes with zero weight or no observation are skipped and the
    /// remaining weights renormalized. Fails with `InsufficientData` when
    /// nothing is left to score.
    pub fn score(
        &self,
        day: &WeatherDay,
        activity: &Activity,
        profile: Option<&UserProfile>,
    ) -> Result<DayScore, AppError> {
        let weights = self.effective_weights(activity, profile);

        let mut breakdown: Vec<AttributeFitness> = WeatherAttribute::ALL
            .iter()
            .filter_map(|&attribute| {
                let weight = weights.get(attribute);
                if weight <= 0.0 {
                    return None;
                }
                let observed = observed_value(day, attribute)?;
                Some(AttributeFitness {
                    attribute,
                    observed,
                    fitness: attribute_fitness(
                        attribute,
                        observed,
                        &activity.preferred,
                        &self.config.tolerances,
                    ),
                    weight,
                })
            })
            .collect();

        let total_weight: f64 = breakdown.iter().map(|f| f.weight).sum();
        if breakdown.is_empty() || total_weight <= 0.0 {
            return Err(AppError::InsufficientData(day.date));
        }
        for f in &mut breakdown {
            f.weight /= total_weight;
        }

        let combined: f64 = breakdown.iter().map(|f| f.weight * f.fitness).sum();
        let score = fitness_to_score(combined);

        let limiting = limiting_factor(&breakdown);
        let summary = summarize(day, activity, score, limiting);

        Ok(DayScore {
            date: day.date,
            score,
            summary,
            limiting_factor: limiting.map(|f| f.attribute),
            breakdown,
        })
    }
}

/// The weighted attribute with the lowest fitness, if any is below ideal.
///
/// Ties go to the attribute with the larger weight, then to attribute order.
fn limiting_factor(breakdown: &[AttributeFitness]) -> Option<&AttributeFitness> {
    breakdown
        .iter()
        .filter(|f| f.fitness < 1.0)
        .min_by(|a, b| {
            a.fitness
                .total_cmp(&b.fitness)
                .then_with(|| b.weight.total_cmp(&a.weight))
                .then_with(|| a.attribute.cmp(&b.attribute))
        })
}

fn quality_label(score: u8) -> &'static str {
    match score {
        85..=100 => "Perfect",
        70..=84 => "Great",
        50..=69 => "Good",
        30..=49 => "Fair",
        _ => "Poor",
    }
}

/// Sky description: the WMO condition when known, otherwise a rough guess
/// from the precipitation probability.
fn sky_phrase(day: &WeatherDay) -> String {
    if let Some(condition) = day.condition() {
        return condition.description().to_string();
    }
    match finite_or_none(
        day.precipitation_probability_pct,
        "precipitation_probability_pct",
    ) {
        Some(p) if p > 70.0 => "rainy".to_string(),
        Some(p) if p > 40.0 => "chance of rain".to_string(),
        Some(p) if p > 20.0 => "partly cloudy".to_string(),
        Some(_) => "clear".to_string(),
        None => "sky conditions unknown".to_string(),
    }
}

fn limiting_phrase(f: &AttributeFitness, preferred: &PreferredConditions) -> String {
    match f.attribute {
        WeatherAttribute::Temperature if f.observed < preferred.ideal_temperature.min_c => {
            format!("cool temperatures ({:.0}°C)", f.observed)
        }
        WeatherAttribute::Temperature => format!("warm temperatures ({:.0}°C)", f.observed),
        WeatherAttribute::Precipitation => {
            format!("{:.0}% chance of precipitation", f.observed)
        }
        WeatherAttribute::Wind => format!("wind ({:.0} km/h)", f.observed),
        WeatherAttribute::CloudCover => format!("cloud cover ({:.0}%)", f.observed),
    }
}

fn summarize(
    day: &WeatherDay,
    activity: &Activity,
    score: u8,
    limiting: Option<&AttributeFitness>,
) -> String {
    let mut summary = format!(
        "{} day for {}: {}",
        quality_label(score),
        activity.name,
        sky_phrase(day)
    );

    if let Some(high) = finite_or_none(day.temperature_max_c, "temperature_max_c") {
        summary.push_str(&format!(", high of {:.0}°C", high));
    } else if let Some(temp) = observed_value(day, WeatherAttribute::Temperature) {
        summary.push_str(&format!(", temperature {:.0}°C", temp));
    }
    summary.push('.');

    match limiting {
        Some(f) => summary.push_str(&format!(
            " Limited by {}.",
            limiting_phrase(f, &activity.preferred)
        )),
        None => summary.push_str(" Nothing holds this day back."),
    }

    summary
}
