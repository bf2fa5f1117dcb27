//! Recommendation builder.
//!
//! Scores every candidate day, drops the ones that cannot be scored, ranks
//! the rest (score descending, earliest date first on ties) and keeps the
//! top N. Each call is an independent scoring run.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::errors::AppError;
use crate::models::{
    Activity, ActivityPreferences, AgeRange, Recommendation, TimeWindow, UserProfile, WeatherDay,
};
use crate::services::scoring::{DayScore, Scorer};

/// Typical free hours per age bracket: (weekday, weekend).
const TIME_WINDOWS: [(AgeRange, TimeWindow, TimeWindow); 5] = [
    (
        AgeRange::From18To24,
        TimeWindow { start_hour: 17, end_hour: 22 },
        TimeWindow { start_hour: 10, end_hour: 22 },
    ),
    (
        AgeRange::From25To34,
        TimeWindow { start_hour: 18, end_hour: 21 },
        TimeWindow { start_hour: 9, end_hour: 21 },
    ),
    (
        AgeRange::From35To44,
        TimeWindow { start_hour: 17, end_hour: 20 },
        TimeWindow { start_hour: 8, end_hour: 20 },
    ),
    (
        AgeRange::From45To54,
        TimeWindow { start_hour: 17, end_hour: 20 },
        TimeWindow { start_hour: 8, end_hour: 19 },
    ),
    (
        AgeRange::Over55,
        TimeWindow { start_hour: 10, end_hour: 18 },
        TimeWindow { start_hour: 9, end_hour: 18 },
    ),
];

const WEEKEND_AVAILABILITY: &str = "Weekend availability";
const WEEKDAY_AVAILABILITY: &str = "Evening availability";

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Hours the user is likely free on `date`, based on their age bracket.
pub fn preferred_time_window(age_range: AgeRange, date: NaiveDate) -> TimeWindow {
    let (_, weekday, weekend) = TIME_WINDOWS
        .iter()
        .find(|(range, _, _)| *range == age_range)
        .copied()
        .unwrap_or(TIME_WINDOWS[1]);

    if is_weekend(date) {
        weekend
    } else {
        weekday
    }
}

/// Rank candidate days for an activity and return at most `top_n` of them.
///
/// `preferences` overrides the activity's preferred conditions for this run
/// and, when it names a time window, replaces the age-bracket window.
/// Days the scoring engine rejects are logged and skipped. Fails with
/// `NoCandidates` if the input is empty or no day could be scored.
pub fn recommend(
    scorer: &Scorer,
    activity: &Activity,
    candidate_days: &[WeatherDay],
    profile: Option<&UserProfile>,
    preferences: Option<&ActivityPreferences>,
    top_n: usize,
) -> Result<Vec<Recommendation>, AppError> {
    if candidate_days.is_empty() {
        return Err(AppError::NoCandidates);
    }

    let personalized;
    let activity = match preferences {
        Some(p) => {
            personalized = Activity {
                preferred: p.apply_to(&activity.preferred),
                ..activity.clone()
            };
            &personalized
        }
        None => activity,
    };

    let mut scored: Vec<DayScore> = candidate_days
        .iter()
        .filter_map(|day| match scorer.score(day, activity, profile) {
            Ok(s) => {
                tracing::debug!(
                    date = %s.date,
                    score = s.score,
                    breakdown = ?s.breakdown,
                    "Scored candidate day for '{}'",
                    activity.name
                );
                Some(s)
            }
            Err(e) => {
                tracing::warn!(
                    "Excluding {} from recommendations for '{}': {}",
                    day.date,
                    activity.name,
                    e
                );
                None
            }
        })
        .collect();

    if scored.is_empty() {
        return Err(AppError::NoCandidates);
    }

    scored.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.date.cmp(&b.date)));
    scored.truncate(top_n);

    let age_range = profile.map(|p| p.age_range).unwrap_or_default();
    let chosen_window = preferences.and_then(|p| p.preferred_time);

    Ok(scored
        .into_iter()
        .enumerate()
        .map(|(i, s)| Recommendation {
            rank: i + 1,
            date: s.date,
            score: s.score,
            weather_summary: s.summary,
            limiting_factor: s.limiting_factor,
            preferred_time: chosen_window
                .unwrap_or_else(|| preferred_time_window(age_range, s.date)),
            availability: if is_weekend(s.date) {
                WEEKEND_AVAILABILITY.to_string()
            } else {
                WEEKDAY_AVAILABILITY.to_string()
            },
        })
        .collect())
}
