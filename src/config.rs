use std::str::FromStr;

/// Open-Meteo serves at most 16 forecast days.
pub const MAX_FORECAST_DAYS: u32 = 16;
pub const MAX_TOP_N: usize = 16;

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub open_meteo_base_url: String,
    /// Upper bound on a single forecast fetch.
    pub weather_timeout_secs: u64,
    /// Extra attempts after an unreachable source.
    pub weather_max_retries: u32,
    pub forecast_cache_ttl_secs: u64,
    /// Upper bound on cached forecasts (location + date range pairs).
    pub forecast_cache_max_entries: u64,
    /// Days fetched when a request does not say.
    pub forecast_days: u32,
    pub default_top_n: usize,
    /// Optional JSON file overriding the built-in scoring weights.
    pub scoring_config_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            open_meteo_base_url: "https://api.open-meteo.com/v1".to_string(),
            weather_timeout_secs: 10,
            weather_max_retries: 1,
            forecast_cache_ttl_secs: 1800,
            forecast_cache_max_entries: 10_000,
            forecast_days: 7,
            default_top_n: 5,
            scoring_config_path: None,
        }
    }
}

/// Parse `key` with `lookup`, keeping `default` (with a warning) if the value
/// is unparseable or rejected by `valid`.
fn parse_or<T, F, V>(lookup: &F, key: &str, default: T, valid: V) -> T
where
    T: FromStr + std::fmt::Display,
    F: Fn(&str) -> Option<String>,
    V: Fn(&T) -> bool,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(v) if valid(&v) => v,
        _ => {
            tracing::warn!("Invalid {}='{}', using default {}", key, raw, default);
            default
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            port: parse_or(&lookup, "PORT", defaults.port, |_| true),
            open_meteo_base_url: lookup("OPEN_METEO_BASE_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.open_meteo_base_url),
            weather_timeout_secs: parse_or(
                &lookup,
                "WEATHER_TIMEOUT_SECS",
                defaults.weather_timeout_secs,
                |v| *v > 0,
            ),
            weather_max_retries: parse_or(
                &lookup,
                "WEATHER_MAX_RETRIES",
                defaults.weather_max_retries,
                |_| true,
            ),
            forecast_cache_ttl_secs: parse_or(
                &lookup,
                "FORECAST_CACHE_TTL_SECS",
                defaults.forecast_cache_ttl_secs,
                |_| true,
            ),
            forecast_cache_max_entries: parse_or(
                &lookup,
                "FORECAST_CACHE_MAX_ENTRIES",
                defaults.forecast_cache_max_entries,
                |v| *v > 0,
            ),
            forecast_days: parse_or(&lookup, "FORECAST_DAYS", defaults.forecast_days, |v| {
                (1..=MAX_FORECAST_DAYS).contains(v)
            }),
            default_top_n: parse_or(&lookup, "DEFAULT_TOP_N", defaults.default_top_n, |v| {
                (1..=MAX_TOP_N).contains(v)
            }),
            scoring_config_path: lookup("SCORING_CONFIG_PATH").filter(|v| !v.trim().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = config_from(&[]);

        assert_eq!(config.port, 8080);
        assert_eq!(config.open_meteo_base_url, "https://api.open-meteo.com/v1");
        assert_eq!(config.weather_timeout_secs, 10);
        assert_eq!(config.weather_max_retries, 1);
        assert_eq!(config.forecast_cache_ttl_secs, 1800);
        assert_eq!(config.forecast_cache_max_entries, 10_000);
        assert_eq!(config.forecast_days, 7);
        assert_eq!(config.default_top_n, 5);
        assert!(config.scoring_config_path.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "3000"),
            ("OPEN_METEO_BASE_URL", "http://localhost:9999/v1"),
            ("WEATHER_MAX_RETRIES", "3"),
            ("FORECAST_CACHE_MAX_ENTRIES", "500"),
            ("FORECAST_DAYS", "14"),
            ("DEFAULT_TOP_N", "3"),
            ("SCORING_CONFIG_PATH", "/etc/next-good-day/scoring.json"),
        ]);

        assert_eq!(config.port, 3000);
        assert_eq!(config.open_meteo_base_url, "http://localhost:9999/v1");
        assert_eq!(config.weather_max_retries, 3);
        assert_eq!(config.forecast_cache_max_entries, 500);
        assert_eq!(config.forecast_days, 14);
        assert_eq!(config.default_top_n, 3);
        assert_eq!(
            config.scoring_config_path.as_deref(),
            Some("/etc/next-good-day/scoring.json")
        );
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        let config = config_from(&[
            ("PORT", "eighty"),
            ("WEATHER_TIMEOUT_SECS", "0"),
            ("FORECAST_CACHE_MAX_ENTRIES", "0"),
            ("FORECAST_DAYS", "30"),
            ("DEFAULT_TOP_N", "-1"),
            ("SCORING_CONFIG_PATH", "  "),
        ]);

        assert_eq!(config.port, 8080);
        assert_eq!(config.weather_timeout_secs, 10);
        assert_eq!(config.forecast_cache_max_entries, 10_000);
        assert_eq!(config.forecast_days, 7);
        assert_eq!(config.default_top_n, 5);
        assert!(config.scoring_config_path.is_none());
    }
}
