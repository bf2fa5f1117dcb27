//! Domain types shared by the weather adapter, scoring engine and routes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;

/// A geographic point (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(-90.0..=90.0).contains(&self.latitude) || !(-180.0..=180.0).contains(&self.longitude)
        {
            return Err(AppError::BadRequest(
                "latitude must be -90 to 90, longitude must be -180 to 180".to_string(),
            ));
        }
        Ok(())
    }
}

/// Normalized forecast for one calendar day.
///
/// Every measurement is optional because providers occasionally return `null`
/// for individual variables. The scoring engine skips missing attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeatherDay {
    pub date: NaiveDate,
    /// Daily low in Celsius
    #[serde(default)]
    pub temperature_min_c: Option<f64>,
    /// Daily high in Celsius
    #[serde(default)]
    pub temperature_max_c: Option<f64>,
    /// Maximum precipitation probability over the day, 0-100
    #[serde(default)]
    pub precipitation_probability_pct: Option<f64>,
    /// Maximum wind speed at 10 m in km/h
    #[serde(default)]
    pub wind_speed_kmh: Option<f64>,
    /// Mean cloud cover, 0-100
    #[serde(default)]
    pub cloud_cover_pct: Option<f64>,
    /// WMO weather interpretation code
    #[serde(default)]
    pub condition_code: Option<u8>,
}

impl WeatherDay {
    /// An empty record for `date`, to be filled in by the adapter.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            temperature_min_c: None,
            temperature_max_c: None,
            precipitation_probability_pct: None,
            wind_speed_kmh: None,
            cloud_cover_pct: None,
            condition_code: None,
        }
    }

    pub fn condition(&self) -> Option<WeatherCondition> {
        self.condition_code.map(WeatherCondition::from_wmo_code)
    }
}

/// Weather condition decoded from a WMO code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    ClearSky,
    MainlyClear,
    PartlyCloudy,
    Overcast,
    Fog,
    Drizzle,
    FreezingDrizzle,
    Rain,
    FreezingRain,
    Snow,
    SnowGrains,
    RainShowers,
    SnowShowers,
    Thunderstorm,
    ThunderstormWithHail,
    Unknown,
}

impl WeatherCondition {
    /// See <https://open-meteo.com/en/docs> for the code table.
    pub const fn from_wmo_code(code: u8) -> Self {
        match code {
            0 => Self::ClearSky,
            1 => Self::MainlyClear,
            2 => Self::PartlyCloudy,
            3 => Self::Overcast,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            56 | 57 => Self::FreezingDrizzle,
            61 | 63 | 65 => Self::Rain,
            66 | 67 => Self::FreezingRain,
            71 | 73 | 75 => Self::Snow,
            77 => Self::SnowGrains,
            80..=82 => Self::RainShowers,
            85 | 86 => Self::SnowShowers,
            95 => Self::Thunderstorm,
            96 | 99 => Self::ThunderstormWithHail,
            _ => Self::Unknown,
        }
    }

    pub const fn description(&self) -> &'static str {
        match self {
            Self::ClearSky => "clear sky",
            Self::MainlyClear => "mainly clear",
            Self::PartlyCloudy => "partly cloudy",
            Self::Overcast => "overcast",
            Self::Fog => "fog",
            Self::Drizzle => "drizzle",
            Self::FreezingDrizzle => "freezing drizzle",
            Self::Rain => "rain",
            Self::FreezingRain => "freezing rain",
            Self::Snow => "snow",
            Self::SnowGrains => "snow grains",
            Self::RainShowers => "rain showers",
            Self::SnowShowers => "snow showers",
            Self::Thunderstorm => "thunderstorm",
            Self::ThunderstormWithHail => "thunderstorm with hail",
            Self::Unknown => "mixed conditions",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    Outdoor,
    Creative,
    Social,
    Other,
}

impl ActivityCategory {
    pub const ALL: [ActivityCategory; 4] = [
        ActivityCategory::Outdoor,
        ActivityCategory::Creative,
        ActivityCategory::Social,
        ActivityCategory::Other,
    ];
}

/// Inclusive temperature range in Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TemperatureRange {
    pub min_c: f64,
    pub max_c: f64,
}

/// The conditions under which an activity is at its best.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PreferredConditions {
    pub ideal_temperature: TemperatureRange,
    /// Highest precipitation probability (0-100) still considered ideal
    pub max_precipitation_pct: f64,
    /// Highest wind speed (km/h) still considered ideal
    pub max_wind_kmh: f64,
    /// Highest cloud cover (0-100) still considered ideal
    pub max_cloud_cover_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Activity {
    pub id: u32,
    pub name: String,
    pub category: ActivityCategory,
    pub description: String,
    pub preferred: PreferredConditions,
    /// Youngest age the activity is suggested for
    pub min_age: Option<u8>,
    /// Oldest age the activity is suggested for
    pub max_age: Option<u8>,
    /// Restricts suggestions to one gender when set
    pub gender_preference: Option<Gender>,
}

/// A user's own take on an activity. Any field left out keeps the
/// activity's default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ActivityPreferences {
    #[serde(default)]
    pub ideal_temperature: Option<TemperatureRange>,
    #[serde(default)]
    pub max_precipitation_pct: Option<f64>,
    /// Replaces the age-bracket time window on every recommended day
    #[serde(default)]
    pub preferred_time: Option<TimeWindow>,
}

impl ActivityPreferences {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(t) = self.ideal_temperature {
            if !t.min_c.is_finite() || !t.max_c.is_finite() || t.min_c > t.max_c {
                return Err(AppError::BadRequest(
                    "ideal_temperature must have finite bounds with min_c <= max_c".to_string(),
                ));
            }
        }
        if let Some(p) = self.max_precipitation_pct {
            if !(0.0..=100.0).contains(&p) {
                return Err(AppError::BadRequest(
                    "max_precipitation_pct must be between 0 and 100".to_string(),
                ));
            }
        }
        if let Some(w) = self.preferred_time {
            if w.start_hour >= w.end_hour || w.end_hour > 23 {
                return Err(AppError::BadRequest(
                    "preferred_time hours must be 0-23 with start_hour < end_hour".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// `preferred` with this user's overrides applied.
    pub fn apply_to(&self, preferred: &PreferredConditions) -> PreferredConditions {
        PreferredConditions {
            ideal_temperature: self.ideal_temperature.unwrap_or(preferred.ideal_temperature),
            max_precipitation_pct: self
                .max_precipitation_pct
                .unwrap_or(preferred.max_precipitation_pct),
            ..*preferred
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
pub enum AgeRange {
    #[serde(rename = "18-24")]
    From18To24,
    #[default]
    #[serde(rename = "25-34")]
    From25To34,
    #[serde(rename = "35-44")]
    From35To44,
    #[serde(rename = "45-54")]
    From45To54,
    #[serde(rename = "55+")]
    Over55,
}

impl AgeRange {
    pub const ALL: [AgeRange; 5] = [
        AgeRange::From18To24,
        AgeRange::From25To34,
        AgeRange::From35To44,
        AgeRange::From45To54,
        AgeRange::Over55,
    ];

    /// Inclusive age bounds of the bucket. The open-ended bucket tops out at 100.
    pub const fn bounds(&self) -> (u8, u8) {
        match self {
            AgeRange::From18To24 => (18, 24),
            AgeRange::From25To34 => (25, 34),
            AgeRange::From35To44 => (35, 44),
            AgeRange::From45To54 => (45, 54),
            AgeRange::Over55 => (55, 100),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    Male,
    NonBinary,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub age_range: AgeRange,
    #[serde(default)]
    pub gender: Option<Gender>,
}

/// Weather attributes the scoring engine knows how to evaluate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum WeatherAttribute {
    Temperature,
    Precipitation,
    Wind,
    CloudCover,
}

impl WeatherAttribute {
    pub const ALL: [WeatherAttribute; 4] = [
        WeatherAttribute::Temperature,
        WeatherAttribute::Precipitation,
        WeatherAttribute::Wind,
        WeatherAttribute::CloudCover,
    ];
}

/// Hours of the day (0-23) the user is likely free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TimeWindow {
    pub start_hour: u8,
    pub end_hour: u8,
}

/// One ranked day for an activity.
///
/// Scores are only comparable to other recommendations from the same run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Recommendation {
    /// 1-based position after ranking
    pub rank: usize,
    pub date: NaiveDate,
    /// Suitability from 0 (unsuitable) to 100 (ideal)
    pub score: u8,
    pub weather_summary: String,
    /// Attribute holding the day back, if any
    pub limiting_factor: Option<WeatherAttribute>,
    pub preferred_time: TimeWindow,
    /// "Weekend availability" or "Evening availability"
    pub availability: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_validate() {
        assert!(Location {
            latitude: 47.37,
            longitude: 8.54
        }
        .validate()
        .is_ok());
        assert!(Location {
            latitude: 90.0,
            longitude: -180.0
        }
        .validate()
        .is_ok());
        assert!(Location {
            latitude: 91.0,
            longitude: 0.0
        }
        .validate()
        .is_err());
        assert!(Location {
            latitude: 0.0,
            longitude: 181.0
        }
        .validate()
        .is_err());
        assert!(Location {
            latitude: f64::NAN,
            longitude: 0.0
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_wmo_codes() {
        assert_eq!(WeatherCondition::from_wmo_code(0), WeatherCondition::ClearSky);
        assert_eq!(WeatherCondition::from_wmo_code(63), WeatherCondition::Rain);
        assert_eq!(
            WeatherCondition::from_wmo_code(81),
            WeatherCondition::RainShowers
        );
        assert_eq!(WeatherCondition::from_wmo_code(73), WeatherCondition::Snow);
        assert_eq!(WeatherCondition::from_wmo_code(42), WeatherCondition::Unknown);
    }

    #[test]
    fn test_age_range_serde() {
        let r: AgeRange = serde_json::from_str("\"55+\"").unwrap();
        assert_eq!(r, AgeRange::Over55);
        assert_eq!(serde_json::to_string(&AgeRange::From18To24).unwrap(), "\"18-24\"");
        assert_eq!(AgeRange::Over55.bounds(), (55, 100));
    }

    fn conditions() -> PreferredConditions {
        PreferredConditions {
            ideal_temperature: TemperatureRange {
                min_c: 10.0,
                max_c: 29.4,
            },
            max_precipitation_pct: 20.0,
            max_wind_kmh: 24.0,
            max_cloud_cover_pct: 70.0,
        }
    }

    #[test]
    fn test_preferences_apply_only_given_fields() {
        let prefs = ActivityPreferences {
            ideal_temperature: Some(TemperatureRange {
                min_c: 5.0,
                max_c: 12.0,
            }),
            ..Default::default()
        };
        let merged = prefs.apply_to(&conditions());
        assert_eq!(merged.ideal_temperature.min_c, 5.0);
        assert_eq!(merged.ideal_temperature.max_c, 12.0);
        assert_eq!(merged.max_precipitation_pct, 20.0);
        assert_eq!(merged.max_wind_kmh, 24.0);

        assert_eq!(ActivityPreferences::default().apply_to(&conditions()), conditions());
    }

    #[test]
    fn test_preferences_validate() {
        assert!(ActivityPreferences::default().validate().is_ok());

        let inverted = ActivityPreferences {
            ideal_temperature: Some(TemperatureRange {
                min_c: 20.0,
                max_c: 10.0,
            }),
            ..Default::default()
        };
        assert!(matches!(inverted.validate(), Err(AppError::BadRequest(_))));

        let rain = ActivityPreferences {
            max_precipitation_pct: Some(120.0),
            ..Default::default()
        };
        assert!(matches!(rain.validate(), Err(AppError::BadRequest(_))));

        let window = ActivityPreferences {
            preferred_time: Some(TimeWindow {
                start_hour: 20,
                end_hour: 8,
            }),
            ..Default::default()
        };
        assert!(matches!(window.validate(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_weather_day_missing_fields_deserialize_as_none() {
        let day: WeatherDay =
            serde_json::from_str(r#"{"date": "2026-06-01", "temperature_max_c": 21.5}"#).unwrap();
        assert_eq!(day.temperature_max_c, Some(21.5));
        assert_eq!(day.wind_speed_kmh, None);
        assert_eq!(day.condition(), None);
    }
}
