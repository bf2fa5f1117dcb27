//! Built-in activity catalog and demographic filtering.
//!
//! Temperatures are in Celsius. Activities that happen mostly indoors accept
//! any precipitation probability (100%).

use crate::errors::AppError;
use crate::models::{
    Activity, ActivityCategory, AgeRange, Gender, PreferredConditions, TemperatureRange,
};

/// Read-only list of activities users can pick from.
#[derive(Debug, Clone)]
pub struct ActivityCatalog {
    activities: Vec<Activity>,
}

#[allow(clippy::too_many_arguments)]
fn activity(
    id: u32,
    name: &str,
    category: ActivityCategory,
    description: &str,
    ideal_temperature_c: (f64, f64),
    max_precipitation_pct: f64,
    max_wind_kmh: f64,
    max_cloud_cover_pct: f64,
) -> Activity {
    Activity {
        id,
        name: name.to_string(),
        category,
        description: description.to_string(),
        preferred: PreferredConditions {
            ideal_temperature: TemperatureRange {
                min_c: ideal_temperature_c.0,
                max_c: ideal_temperature_c.1,
            },
            max_precipitation_pct,
            max_wind_kmh,
            max_cloud_cover_pct,
        },
        min_age: None,
        max_age: None,
        gender_preference: None,
    }
}

impl ActivityCatalog {
    pub fn new(activities: Vec<Activity>) -> Self {
        Self { activities }
    }

    pub fn builtin() -> Self {
        use ActivityCategory::{Creative, Outdoor, Social};

        Self::new(vec![
            activity(
                1,
                "Hiking",
                Outdoor,
                "Explore nature trails and enjoy the outdoors",
                (10.0, 29.4),
                20.0,
                24.0,
                70.0,
            ),
            activity(
                2,
                "Photography",
                Creative,
                "Capture beautiful moments and scenes",
                (7.2, 32.2),
                100.0,
                30.0,
                80.0,
            ),
            activity(
                3,
                "Cycling",
                Outdoor,
                "Go for a bike ride",
                (12.8, 29.4),
                20.0,
                20.0,
                80.0,
            ),
            activity(
                4,
                "Picnic",
                Social,
                "Enjoy a meal outdoors",
                (18.3, 29.4),
                20.0,
                20.0,
                50.0,
            ),
            activity(
                5,
                "Painting",
                Creative,
                "Express yourself through art",
                (10.0, 32.2),
                100.0,
                30.0,
                100.0,
            ),
            activity(
                6,
                "Reading",
                Creative,
                "Enjoy a good book",
                (10.0, 32.2),
                100.0,
                40.0,
                100.0,
            ),
            activity(
                7,
                "Running",
                Outdoor,
                "Go for a jog or run",
                (7.2, 26.7),
                20.0,
                24.0,
                100.0,
            ),
            activity(
                8,
                "Beach Day",
                Outdoor,
                "Relax by the water",
                (23.9, 35.0),
                10.0,
                20.0,
                40.0,
            ),
            activity(
                9,
                "Coffee Shop Work",
                Creative,
                "Productive time at a local coffee shop",
                (4.4, 37.8),
                100.0,
                40.0,
                100.0,
            ),
            activity(
                10,
                "Gardening",
                Outdoor,
                "Tend to plants and garden",
                (12.8, 29.4),
                20.0,
                24.0,
                80.0,
            ),
            activity(
                11,
                "Yoga",
                Outdoor,
                "Practice yoga outdoors",
                (15.6, 29.4),
                20.0,
                15.0,
                70.0,
            ),
        ])
    }

    pub fn all(&self) -> &[Activity] {
        &self.activities
    }

    pub fn find(&self, id: u32) -> Result<&Activity, AppError> {
        self.activities
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Activity {} not found", id)))
    }

    /// Activities suitable for a user's age bracket and gender, either of
    /// which may be unknown.
    ///
    /// The whole bracket must fit inside an activity's age limits, and a
    /// gender preference only excludes users who stated a different gender.
    /// An unknown bracket skips the age limits.
    pub fn filter_by_demographics(
        &self,
        age_range: Option<AgeRange>,
        gender: Option<Gender>,
    ) -> Vec<&Activity> {
        let bounds = age_range.map(|r| r.bounds());

        self.activities
            .iter()
            .filter(|a| match (bounds, a.min_age) {
                (Some((user_min, _)), Some(min)) => user_min >= min,
                _ => true,
            })
            .filter(|a| match (bounds, a.max_age) {
                (Some((_, user_max)), Some(max)) => user_max <= max,
                _ => true,
            })
            .filter(|a| match (gender, a.gender_preference) {
                (Some(g), Some(pref)) => g == pref,
                _ => true,
            })
            .collect()
    }
}

impl Default for ActivityCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
