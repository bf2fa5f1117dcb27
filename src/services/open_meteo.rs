//! Open-Meteo daily forecast client.
//!
//! Fetches per-day forecasts from the Open-Meteo API (no API key required)
//! and normalizes them into `WeatherDay` records.
//! See: https://open-meteo.com/en/docs

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::AppError;
use crate::helpers::finite_or_none;
use crate::models::{Location, WeatherDay};

const DAILY_VARIABLES: &str = "temperature_2m_max,temperature_2m_min,\
    precipitation_probability_max,wind_speed_10m_max,cloud_cover_mean,weather_code";

/// A provider of per-day forecasts.
///
/// Implementations return exactly one record per date in
/// `start..=end`, ascending. A provider that leaves a gap fails with
/// `DataUnavailable`; network or provider failures surface as
/// `SourceUnreachable`. An empty `Ok` is never returned for a valid range.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch_forecast(
        &self,
        location: Location,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WeatherDay>, AppError>;
}

/// Client for the Open-Meteo forecast API.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: reqwest::Client,
    base_url: String,
}

// --- Open-Meteo JSON response types ---

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    daily: Option<OpenMeteoDaily>,
}

/// Column-oriented daily block: `time[i]` describes every other column's `[i]`.
#[derive(Debug, Deserialize)]
struct OpenMeteoDaily {
    time: Vec<String>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability_max: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m_max: Vec<Option<f64>>,
    #[serde(default)]
    cloud_cover_mean: Vec<Option<f64>>,
    #[serde(default)]
    weather_code: Vec<Option<u8>>,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoErrorBody {
    reason: Option<String>,
}

fn column<T: Copy>(values: &[Option<T>], i: usize) -> Option<T> {
    values.get(i).copied().flatten()
}

impl OpenMeteoClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn build_forecast_url(&self, location: Location, start: NaiveDate, end: NaiveDate) -> String {
        format!(
            "{}/forecast?latitude={:.4}&longitude={:.4}&daily={}&timezone=auto\
             &temperature_unit=celsius&wind_speed_unit=kmh&start_date={}&end_date={}",
            self.base_url,
            location.latitude,
            location.longitude,
            DAILY_VARIABLES,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
        )
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoClient {
    async fn fetch_forecast(
        &self,
        location: Location,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WeatherDay>, AppError> {
        location.validate()?;
        if start > end {
            return Err(AppError::BadRequest(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }

        let url = self.build_forecast_url(location, start, end);
        tracing::debug!("Fetching Open-Meteo forecast: {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            AppError::SourceUnreachable(format!("Open-Meteo request failed: {}", e))
        })?;

        let status = response.status();

        // Open-Meteo answers 400 when the range lies outside its forecast horizon.
        if status == reqwest::StatusCode::BAD_REQUEST {
            let reason = response
                .json::<OpenMeteoErrorBody>()
                .await
                .ok()
                .and_then(|b| b.reason)
                .unwrap_or_else(|| "no reason given".to_string());
            return Err(AppError::DataUnavailable(format!(
                "Open-Meteo rejected {}..{}: {}",
                start, end, reason
            )));
        }

        if !status.is_success() {
            return Err(AppError::SourceUnreachable(format!(
                "Open-Meteo returned HTTP {}",
                status
            )));
        }

        let raw_json: serde_json::Value = response.json().await.map_err(|e| {
            AppError::SourceUnreachable(format!("Open-Meteo JSON parse error: {}", e))
        })?;

        extract_weather_days(&raw_json, start, end)
    }
}

/// Extract one `WeatherDay` per date in `start..=end` from an Open-Meteo
/// response body.
///
/// Pure function (no I/O). Dates outside the range are ignored; a date inside
/// the range that the provider did not return fails with `DataUnavailable`.
pub fn extract_weather_days(
    raw_json: &serde_json::Value,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<WeatherDay>, AppError> {
    let response = OpenMeteoResponse::deserialize(raw_json).map_err(|e| {
        AppError::SourceUnreachable(format!("Open-Meteo response structure error: {}", e))
    })?;

    let daily = response.daily.ok_or_else(|| {
        AppError::DataUnavailable("Open-Meteo response has no daily block".to_string())
    })?;

    let mut dates = Vec::with_capacity(daily.time.len());
    for t in &daily.time {
        let date = NaiveDate::parse_from_str(t, "%Y-%m-%d").map_err(|e| {
            AppError::SourceUnreachable(format!("Open-Meteo returned invalid date '{}': {}", t, e))
        })?;
        dates.push(date);
    }

    start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|date| -> Result<WeatherDay, AppError> {
            let i = dates.iter().position(|d| *d == date).ok_or_else(|| {
                AppError::DataUnavailable(format!("Open-Meteo returned no data for {}", date))
            })?;

            Ok(WeatherDay {
                date,
                temperature_min_c: finite_or_none(
                    column(&daily.temperature_2m_min, i),
                    "temperature_2m_min",
                ),
                temperature_max_c: finite_or_none(
                    column(&daily.temperature_2m_max, i),
                    "temperature_2m_max",
                ),
                precipitation_probability_pct: finite_or_none(
                    column(&daily.precipitation_probability_max, i),
                    "precipitation_probability_max",
                ),
                wind_speed_kmh: finite_or_none(
                    column(&daily.wind_speed_10m_max, i),
                    "wind_speed_10m_max",
                ),
                cloud_cover_pct: finite_or_none(
                    column(&daily.cloud_cover_mean, i),
                    "cloud_cover_mean",
                ),
                condition_code: column(&daily.weather_code, i),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn zurich() -> Location {
        Location {
            latitude: 47.3769,
            longitude: 8.5417,
        }
    }

    fn sample_response() -> serde_json::Value {
        serde_json::json!({
            "latitude": 47.38,
            "longitude": 8.54,
            "timezone": "Europe/Zurich",
            "daily_units": {
                "time": "iso8601",
                "temperature_2m_max": "°C",
                "temperature_2m_min": "°C",
                "precipitation_probability_max": "%",
                "wind_speed_10m_max": "km/h",
                "cloud_cover_mean": "%",
                "weather_code": "wmo code"
            },
            "daily": {
                "time": ["2026-06-05", "2026-06-06", "2026-06-07"],
                "temperature_2m_max": [22.4, 19.0, 26.1],
                "temperature_2m_min": [12.0, 11.5, null],
                "precipitation_probability_max": [10, 65, 0],
                "wind_speed_10m_max": [12.3, 30.0, 8.0],
                "cloud_cover_mean": [35, 90, 5],
                "weather_code": [1, 61, 0]
            }
        })
    }

    fn client(server: &MockServer) -> OpenMeteoClient {
        OpenMeteoClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_extract_weather_days() {
        let days =
            extract_weather_days(&sample_response(), date("2026-06-05"), date("2026-06-07"))
                .unwrap();
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].date, date("2026-06-05"));
        assert_eq!(days[0].temperature_max_c, Some(22.4));
        assert_eq!(days[1].precipitation_probability_pct, Some(65.0));
        assert_eq!(days[1].condition_code, Some(61));
        assert_eq!(days[2].temperature_min_c, None);
        assert_eq!(days[2].cloud_cover_pct, Some(5.0));
    }

    #[test]
    fn test_extract_sub_range_is_ascending() {
        let days =
            extract_weather_days(&sample_response(), date("2026-06-06"), date("2026-06-07"))
                .unwrap();
        let dates: Vec<NaiveDate> = days.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![date("2026-06-06"), date("2026-06-07")]);
    }

    #[test]
    fn test_extract_gap_is_data_unavailable() {
        let err = extract_weather_days(&sample_response(), date("2026-06-05"), date("2026-06-08"))
            .unwrap_err();
        assert!(matches!(err, AppError::DataUnavailable(msg) if msg.contains("2026-06-08")));
    }

    #[test]
    fn test_extract_missing_column_is_missing_attribute() {
        let json = serde_json::json!({
            "daily": {
                "time": ["2026-06-05"],
                "temperature_2m_max": [21.0]
            }
        });
        let days = extract_weather_days(&json, date("2026-06-05"), date("2026-06-05")).unwrap();
        assert_eq!(days[0].temperature_max_c, Some(21.0));
        assert_eq!(days[0].wind_speed_kmh, None);
        assert_eq!(days[0].condition_code, None);
    }

    #[test]
    fn test_extract_without_daily_block() {
        let json = serde_json::json!({ "latitude": 47.38 });
        let err = extract_weather_days(&json, date("2026-06-05"), date("2026-06-05")).unwrap_err();
        assert!(matches!(err, AppError::DataUnavailable(_)));
    }

    #[test]
    fn test_extract_malformed_date() {
        let json = serde_json::json!({ "daily": { "time": ["06/05/2026"] } });
        let err = extract_weather_days(&json, date("2026-06-05"), date("2026-06-05")).unwrap_err();
        assert!(matches!(err, AppError::SourceUnreachable(_)));
    }

    #[test]
    fn test_build_forecast_url() {
        let client = OpenMeteoClient::new("https://api.open-meteo.com/v1/", Duration::from_secs(1))
            .unwrap();
        let url = client.build_forecast_url(zurich(), date("2026-06-05"), date("2026-06-11"));
        assert!(url.starts_with("https://api.open-meteo.com/v1/forecast?latitude=47.3769"));
        assert!(url.contains("&longitude=8.5417"));
        assert!(url.contains("&start_date=2026-06-05&end_date=2026-06-11"));
        assert!(url.contains("wind_speed_unit=kmh"));
        assert!(url.contains("weather_code"));
    }

    #[tokio::test]
    async fn test_fetch_forecast_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("start_date", "2026-06-05"))
            .and(query_param("end_date", "2026-06-07"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_response()))
            .mount(&server)
            .await;

        let days = client(&server)
            .fetch_forecast(zurich(), date("2026-06-05"), date("2026-06-07"))
            .await
            .unwrap();
        assert_eq!(days.len(), 3);
        assert_eq!(days[1].wind_speed_kmh, Some(30.0));
    }

    #[tokio::test]
    async fn test_fetch_forecast_server_error_is_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client(&server)
            .fetch_forecast(zurich(), date("2026-06-05"), date("2026-06-07"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SourceUnreachable(_)));
    }

    #[tokio::test]
    async fn test_fetch_forecast_out_of_range_is_data_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": true,
                "reason": "Parameter 'end_date' is out of allowed range"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .fetch_forecast(zurich(), date("2026-06-05"), date("2026-08-01"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, AppError::DataUnavailable(msg) if msg.contains("out of allowed range"))
        );
    }

    #[tokio::test]
    async fn test_fetch_forecast_invalid_json_is_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client(&server)
            .fetch_forecast(zurich(), date("2026-06-05"), date("2026-06-07"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SourceUnreachable(_)));
    }

    #[tokio::test]
    async fn test_fetch_forecast_timeout_is_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(sample_response())
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = OpenMeteoClient::new(&server.uri(), Duration::from_millis(50)).unwrap();
        let err = client
            .fetch_forecast(zurich(), date("2026-06-05"), date("2026-06-07"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SourceUnreachable(_)));
    }

    #[tokio::test]
    async fn test_fetch_forecast_validates_inputs_before_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_response()))
            .expect(0)
            .mount(&server)
            .await;

        let client = client(&server);
        let bad_location = Location {
            latitude: 120.0,
            longitude: 0.0,
        };
        assert!(matches!(
            client
                .fetch_forecast(bad_location, date("2026-06-05"), date("2026-06-07"))
                .await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            client
                .fetch_forecast(zurich(), date("2026-06-07"), date("2026-06-05"))
                .await,
            Err(AppError::BadRequest(_))
        ));
    }
}
