//! Forecast resolution service.
//!
//! Wraps a `WeatherSource` with the in-memory cache and a bounded
//! timeout/retry policy:
//!   1. Fresh cache entry ⇒ return it.
//!   2. Fetch from the source under a timeout, retrying `SourceUnreachable`.
//!   3. Success ⇒ cache and return (`stale = false`).
//!   4. Failure ⇒ serve the expired entry if one exists (`stale = true`),
//!      otherwise propagate the error.

use chrono::NaiveDate;
use std::time::Duration;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::{Location, WeatherDay};
use crate::services::cache::{CacheKey, ForecastCache};
use crate::services::open_meteo::WeatherSource;

/// Pause between retries of an unreachable source.
const RETRY_DELAY_MS: u64 = 500;

/// Timeout and retry settings for one forecast fetch.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl ResolutionPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.weather_timeout_secs),
            max_retries: config.weather_max_retries,
            retry_delay: Duration::from_millis(RETRY_DELAY_MS),
        }
    }
}

/// Call the source once under the policy's timeout.
async fn fetch_once(
    source: &dyn WeatherSource,
    location: Location,
    start: NaiveDate,
    end: NaiveDate,
    timeout: Duration,
) -> Result<Vec<WeatherDay>, AppError> {
    match tokio::time::timeout(timeout, source.fetch_forecast(location, start, end)).await {
        Ok(result) => result,
        Err(_) => Err(AppError::SourceUnreachable(format!(
            "weather source did not answer within {:?}",
            timeout
        ))),
    }
}

/// Fetch with bounded retries. Only `SourceUnreachable` is retried.
pub async fn fetch_with_retry(
    source: &dyn WeatherSource,
    location: Location,
    start: NaiveDate,
    end: NaiveDate,
    policy: &ResolutionPolicy,
) -> Result<Vec<WeatherDay>, AppError> {
    let mut attempt = 0;
    loop {
        match fetch_once(source, location, start, end, policy.timeout).await {
            Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                attempt += 1;
                tracing::warn!(
                    "Forecast fetch failed (attempt {}/{}), retrying: {}",
                    attempt,
                    policy.max_retries + 1,
                    e
                );
                tokio::time::sleep(policy.retry_delay).await;
            }
            other => return other,
        }
    }
}

/// Resolve the forecast for `location` over `start..=end`.
///
/// Returns the days and whether they were served stale from the cache.
pub async fn resolve_forecast(
    source: &dyn WeatherSource,
    cache: &ForecastCache,
    location: Location,
    start: NaiveDate,
    end: NaiveDate,
    policy: &ResolutionPolicy,
) -> Result<(Vec<WeatherDay>, bool), AppError> {
    let key = CacheKey::new(location, start, end);

    if let Some(days) = cache.get_fresh(&key).await {
        tracing::debug!(
            "Forecast cache hit for ({}, {}) {}..{}",
            location.latitude,
            location.longitude,
            start,
            end
        );
        return Ok((days, false));
    }

    match fetch_with_retry(source, location, start, end, policy).await {
        Ok(days) => {
            cache.insert(key, days.clone()).await;
            tracing::debug!(
                "Cached {} forecast days ({} cache entries)",
                days.len(),
                cache.entry_count().await
            );
            Ok((days, false))
        }
        Err(e) => match cache.get_stale(&key).await {
            Some(days) => {
                tracing::warn!("Weather source unavailable, returning stale data: {}", e);
                Ok((days, true))
            }
            None => Err(e),
        },
    }
}
