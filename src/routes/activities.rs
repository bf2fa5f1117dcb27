//! Activity catalog endpoint.
//!
//! - GET /api/v1/activities?age_range=25-34&gender=female

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::models::{Activity, AgeRange, Gender};
use crate::services::catalog::ActivityCatalog;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ActivitiesQuery {
    /// Only activities suitable for this age bracket (e.g. "25-34", "55+")
    pub age_range: Option<AgeRange>,
    /// Only activities open to this gender
    pub gender: Option<Gender>,
}

/// List activities, optionally filtered by demographics.
#[utoipa::path(
    get,
    path = "/api/v1/activities",
    tag = "Activities",
    params(ActivitiesQuery),
    responses(
        (status = 200, description = "Activities matching the filter", body = Vec<Activity>),
        (status = 400, description = "Unknown age range or gender"),
    )
)]
pub async fn list_activities(
    State(catalog): State<Arc<ActivityCatalog>>,
    Query(params): Query<ActivitiesQuery>,
) -> Json<Vec<Activity>> {
    let activities: Vec<Activity> = catalog
        .filter_by_demographics(params.age_range, params.gender)
        .into_iter()
        .cloned()
        .collect();

    tracing::debug!(
        "Listing {} activities (age_range={:?}, gender={:?})",
        activities.len(),
        params.age_range,
        params.gender
    );

    Json(activities)
}
