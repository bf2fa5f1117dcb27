//! In-memory forecast cache.
//!
//! Entries are keyed by location (rounded to 4 decimal places, ~11 m) and the
//! requested date range. An entry is fresh for `ttl` after it was stored;
//! expired entries are kept around so they can be served as stale data while
//! the provider is unreachable. Moka evicts them once they are far past expiry
//! or when the cache is over capacity.

use chrono::NaiveDate;
use moka::future::Cache;
use std::time::{Duration, Instant};

use crate::models::{Location, WeatherDay};

/// Expired entries stay available as stale data for this many TTLs.
const STALE_RETENTION_FACTOR: u32 = 24;

/// Lower bound on stale retention, so a zero TTL still leaves a fallback.
const MIN_STALE_RETENTION: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    lat_e4: i32,
    lon_e4: i32,
    start: NaiveDate,
    end: NaiveDate,
}

impl CacheKey {
    pub fn new(location: Location, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            lat_e4: (location.latitude * 10_000.0).round() as i32,
            lon_e4: (location.longitude * 10_000.0).round() as i32,
            start,
            end,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    days: Vec<WeatherDay>,
    stored_at: Instant,
}

/// Shared, cloneable handle to the cache.
#[derive(Clone)]
pub struct ForecastCache {
    entries: Cache<CacheKey, CacheEntry>,
    ttl: Duration,
}

impl std::fmt::Debug for ForecastCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastCache")
            .field("entries", &self.entries.entry_count())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl ForecastCache {
    /// `ttl` is the freshness window; at most `max_entries` forecasts are kept.
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        let retention = (ttl * STALE_RETENTION_FACTOR).max(MIN_STALE_RETENTION);
        Self {
            entries: Cache::builder()
                .max_capacity(max_entries)
                .time_to_live(retention)
                .build(),
            ttl,
        }
    }

    /// Entry for `key` if it was stored less than `ttl` ago.
    pub async fn get_fresh(&self, key: &CacheKey) -> Option<Vec<WeatherDay>> {
        self.entries
            .get(key)
            .await
            .filter(|e| e.stored_at.elapsed() < self.ttl)
            .map(|e| e.days)
    }

    /// Entry for `key` regardless of freshness, as long as it is still retained.
    pub async fn get_stale(&self, key: &CacheKey) -> Option<Vec<WeatherDay>> {
        self.entries.get(key).await.map(|e| e.days)
    }

    pub async fn insert(&self, key: CacheKey, days: Vec<WeatherDay>) {
        self.entries
            .insert(
                key,
                CacheEntry {
                    days,
                    stored_at: Instant::now(),
                },
            )
            .await;
    }

    /// Number of retained entries after pending evictions have run.
    pub async fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn key(lat: f64, lon: f64) -> CacheKey {
        CacheKey::new(
            Location {
                latitude: lat,
                longitude: lon,
            },
            date("2026-06-05"),
            date("2026-06-11"),
        )
    }

    #[test]
    fn test_key_rounds_location() {
        assert_eq!(key(47.37691, 8.54171), key(47.37689, 8.54169));
        assert_ne!(key(47.3769, 8.5417), key(47.3770, 8.5417));
    }

    #[test]
    fn test_key_includes_range() {
        let loc = Location {
            latitude: 47.3769,
            longitude: 8.5417,
        };
        assert_ne!(
            CacheKey::new(loc, date("2026-06-05"), date("2026-06-11")),
            CacheKey::new(loc, date("2026-06-05"), date("2026-06-12"))
        );
    }

    #[tokio::test]
    async fn test_fresh_entry() {
        let cache = ForecastCache::new(Duration::from_secs(60), 100);
        let days = vec![WeatherDay::new(date("2026-06-05"))];
        cache.insert(key(47.0, 8.0), days.clone()).await;

        assert_eq!(cache.get_fresh(&key(47.0, 8.0)).await, Some(days.clone()));
        assert_eq!(cache.get_stale(&key(47.0, 8.0)).await, Some(days));
        assert_eq!(cache.get_fresh(&key(46.0, 8.0)).await, None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_only_stale() {
        let cache = ForecastCache::new(Duration::ZERO, 100);
        let days = vec![WeatherDay::new(date("2026-06-05"))];
        cache.insert(key(47.0, 8.0), days.clone()).await;

        assert_eq!(cache.get_fresh(&key(47.0, 8.0)).await, None);
        assert_eq!(cache.get_stale(&key(47.0, 8.0)).await, Some(days));
    }

    #[tokio::test]
    async fn test_insert_replaces_entry() {
        let cache = ForecastCache::new(Duration::from_secs(60), 100);
        cache
            .insert(key(47.0, 8.0), vec![WeatherDay::new(date("2026-06-05"))])
            .await;
        cache
            .insert(key(47.0, 8.0), vec![WeatherDay::new(date("2026-06-06"))])
            .await;

        assert_eq!(cache.entry_count().await, 1);
        let days = cache.get_fresh(&key(47.0, 8.0)).await.unwrap();
        assert_eq!(days[0].date, date("2026-06-06"));
    }

    #[tokio::test]
    async fn test_entry_count_is_bounded_by_capacity() {
        let cache = ForecastCache::new(Duration::from_secs(1800), 50);
        for i in 0..2_000 {
            let lat = 40.0 + f64::from(i) * 0.001;
            cache.insert(key(lat, 8.0), vec![]).await;
        }

        let count = cache.entry_count().await;
        assert!(count <= 50, "cache holds {} entries, capacity is 50", count);
    }
}
