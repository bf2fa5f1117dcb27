//! Recommendation HTTP endpoints.
//!
//! - POST /api/v1/recommendations             (fetches the forecast)
//! - POST /api/v1/recommendations/candidates  (caller supplies the days)

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::config::{MAX_FORECAST_DAYS, MAX_TOP_N};
use crate::errors::{AppError, ErrorResponse};
use crate::models::{ActivityPreferences, Location, Recommendation, UserProfile, WeatherDay};
use crate::services::cache::ForecastCache;
use crate::services::catalog::ActivityCatalog;
use crate::services::forecast::{resolve_forecast, ResolutionPolicy};
use crate::services::open_meteo::WeatherSource;
use crate::services::recommend::recommend;
use crate::services::scoring::Scorer;

/// Shared application state for recommendation endpoints.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) source: Arc<dyn WeatherSource>,
    pub(crate) cache: ForecastCache,
    pub(crate) scorer: Arc<Scorer>,
    pub(crate) catalog: Arc<ActivityCatalog>,
    pub(crate) policy: ResolutionPolicy,
    pub(crate) forecast_days: u32,
    pub(crate) default_top_n: usize,
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecommendationRequest {
    /// Activity to plan for (see GET /api/v1/activities)
    pub activity_id: u32,
    pub location: Location,
    /// First day to consider (defaults to today, UTC)
    pub start_date: Option<NaiveDate>,
    /// Number of days to consider, 1 to 16
    pub days: Option<u32>,
    /// Maximum number of recommendations, 1 to 16
    pub top_n: Option<usize>,
    /// Personalizes weights and time windows when present
    pub profile: Option<UserProfile>,
    /// Overrides the activity's preferred conditions for this request
    #[serde(default)]
    pub preferences: Option<ActivityPreferences>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CandidateRequest {
    pub activity_id: u32,
    /// Pre-fetched weather, one record per candidate day
    pub candidate_days: Vec<WeatherDay>,
    /// Maximum number of recommendations, 1 to 16
    pub top_n: Option<usize>,
    pub profile: Option<UserProfile>,
    #[serde(default)]
    pub preferences: Option<ActivityPreferences>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecommendationResponse {
    pub activity_id: u32,
    pub activity_name: String,
    /// Whether the forecast was served from an expired cache entry
    pub stale: bool,
    /// Best days first
    pub recommendations: Vec<Recommendation>,
}

fn validate_top_n(top_n: usize) -> Result<usize, AppError> {
    if !(1..=MAX_TOP_N).contains(&top_n) {
        return Err(AppError::BadRequest(format!(
            "top_n must be between 1 and {}",
            MAX_TOP_N
        )));
    }
    Ok(top_n)
}

/// Open-Meteo serves at most this many days of past forecast data.
const MAX_PAST_DAYS: u64 = 92;

/// Reject windows the provider cannot serve: starting more than
/// `MAX_PAST_DAYS` before `today` or ending past the forecast horizon.
fn check_forecast_horizon(
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> Result<(), AppError> {
    let earliest = today
        .checked_sub_days(Days::new(MAX_PAST_DAYS))
        .unwrap_or(NaiveDate::MIN);
    let latest = today
        .checked_add_days(Days::new(u64::from(MAX_FORECAST_DAYS - 1)))
        .unwrap_or(NaiveDate::MAX);

    if start < earliest || end > latest {
        return Err(AppError::BadRequest(format!(
            "forecast window {}..{} is outside {}..{}",
            start, end, earliest, latest
        )));
    }
    Ok(())
}

fn validate_preferences(preferences: Option<&ActivityPreferences>) -> Result<(), AppError> {
    preferences.map_or(Ok(()), ActivityPreferences::validate)
}

/// Last day of a `days`-long window starting at `start`.
fn window_end(start: NaiveDate, days: u32) -> Result<NaiveDate, AppError> {
    if !(1..=MAX_FORECAST_DAYS).contains(&days) {
        return Err(AppError::BadRequest(format!(
            "days must be between 1 and {}",
            MAX_FORECAST_DAYS
        )));
    }
    start
        .checked_add_days(Days::new(u64::from(days - 1)))
        .ok_or_else(|| AppError::BadRequest(format!("start_date {} is out of range", start)))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Recommend the best upcoming days for an activity at a location.
///
/// Fetches the daily forecast for the window, scores each day and returns
/// the top N. If the weather provider is unreachable, cached data is served
/// with `stale: true` and the `X-Forecast-Stale: true` header.
#[utoipa::path(
    post,
    path = "/api/v1/recommendations",
    tag = "Recommendations",
    request_body = RecommendationRequest,
    responses(
        (status = 200, description = "Ranked days for the activity", body = RecommendationResponse,
         headers(
             ("X-Forecast-Stale" = String, description = "Set to 'true' when serving cached data because the weather provider is unreachable")
         )),
        (status = 400, description = "Invalid location, window, top_n or preferences", body = ErrorResponse),
        (status = 404, description = "Activity not found", body = ErrorResponse),
        (status = 422, description = "No day could be scored", body = ErrorResponse),
        (status = 502, description = "Weather provider unreachable or incomplete, no cache", body = ErrorResponse),
    )
)]
pub async fn recommend_days(
    State(state): State<AppState>,
    Json(req): Json<RecommendationRequest>,
) -> Result<(HeaderMap, Json<RecommendationResponse>), AppError> {
    let activity = state.catalog.find(req.activity_id)?;
    req.location.validate()?;
    let top_n = validate_top_n(req.top_n.unwrap_or(state.default_top_n))?;
    validate_preferences(req.preferences.as_ref())?;
    let today = Utc::now().date_naive();
    let start = req.start_date.unwrap_or(today);
    let end = window_end(start, req.days.unwrap_or(state.forecast_days))?;
    check_forecast_horizon(start, end, today)?;

    let (forecast, is_stale) = resolve_forecast(
        state.source.as_ref(),
        &state.cache,
        req.location,
        start,
        end,
        &state.policy,
    )
    .await?;

    let recommendations = recommend(
        &state.scorer,
        activity,
        &forecast,
        req.profile.as_ref(),
        req.preferences.as_ref(),
        top_n,
    )?;

    tracing::info!(
        "Recommended {} of {} days for '{}' at ({}, {}){}",
        recommendations.len(),
        forecast.len(),
        activity.name,
        req.location.latitude,
        req.location.longitude,
        if is_stale { " from stale cache" } else { "" }
    );

    let mut headers = HeaderMap::new();
    if is_stale {
        headers.insert(
            "X-Forecast-Stale",
            axum::http::HeaderValue::from_static("true"),
        );
    }

    Ok((
        headers,
        Json(RecommendationResponse {
            activity_id: activity.id,
            activity_name: activity.name.clone(),
            stale: is_stale,
            recommendations,
        }),
    ))
}

/// Rank caller-supplied candidate days for an activity.
///
/// No weather provider call is made. Days that cannot be scored are skipped;
/// if none remain the request fails with 422.
#[utoipa::path(
    post,
    path = "/api/v1/recommendations/candidates",
    tag = "Recommendations",
    request_body = CandidateRequest,
    responses(
        (status = 200, description = "Ranked candidate days", body = RecommendationResponse),
        (status = 400, description = "Invalid top_n or preferences", body = ErrorResponse),
        (status = 404, description = "Activity not found", body = ErrorResponse),
        (status = 422, description = "No candidate day could be scored", body = ErrorResponse),
    )
)]
pub async fn rank_candidates(
    State(state): State<AppState>,
    Json(req): Json<CandidateRequest>,
) -> Result<Json<RecommendationResponse>, AppError> {
    let activity = state.catalog.find(req.activity_id)?;
    let top_n = validate_top_n(req.top_n.unwrap_or(state.default_top_n))?;
    validate_preferences(req.preferences.as_ref())?;

    let recommendations = recommend(
        &state.scorer,
        activity,
        &req.candidate_days,
        req.profile.as_ref(),
        req.preferences.as_ref(),
        top_n,
    )?;

    Ok(Json(RecommendationResponse {
        activity_id: activity.id,
        activity_name: activity.name.clone(),
        stale: false,
        recommendations,
    }))
}
