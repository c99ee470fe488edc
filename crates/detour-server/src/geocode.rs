//! Place-name lookup through Nominatim with a bounded result cache.

use crate::cache::{prune, Timestamped};
use crate::config::Config;
use dashmap::DashMap;
use detour_core::Location;
use serde::Deserialize;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub cache_ttl: Duration,
    pub cache_max_entries: usize,
}

impl GeocoderConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.nominatim_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            timeout: Duration::from_secs(config.geocode_timeout_s.max(1)),
            cache_ttl: Duration::from_secs(config.geocode_cache_ttl_s),
            cache_max_entries: config.geocode_cache_max_entries.max(1),
        }
    }
}

#[derive(Debug, Clone)]
struct CachedLookup {
    location: Option<Location>,
    stored_at: Instant,
}

impl Timestamped for CachedLookup {
    fn stored_at(&self) -> Instant {
        self.stored_at
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

pub struct Geocoder {
    http: reqwest::Client,
    config: GeocoderConfig,
    cache: DashMap<String, CachedLookup>,
}

impl Geocoder {
    pub fn new(config: GeocoderConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http,
            config,
            cache: DashMap::new(),
        })
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Resolve free text to a location.
    ///
    /// `None` covers both "no match" and lookup failures; only definite
    /// answers are cached.
    pub async fn resolve(&self, query: &str) -> Option<Location> {
        let key = normalize_query(query);
        if key.is_empty() {
            return None;
        }
        if let Some(hit) = self.cached(&key, Instant::now()) {
            tracing::debug!("Geocode cache hit for '{}'", key);
            return hit;
        }

        match self.lookup(query.trim()).await {
            Ok(location) => {
                self.store(key, location.clone(), Instant::now());
                location
            }
            Err(err) => {
                tracing::warn!("Geocoding '{}' failed: {}", query.trim(), err);
                None
            }
        }
    }

    fn cached(&self, key: &str, now: Instant) -> Option<Option<Location>> {
        let entry = self.cache.get(key)?;
        if now.saturating_duration_since(entry.stored_at) > self.config.cache_ttl {
            return None;
        }
        Some(entry.location.clone())
    }

    fn store(&self, key: String, location: Option<Location>, now: Instant) {
        self.cache.insert(
            key,
            CachedLookup {
                location,
                stored_at: now,
            },
        );
        if self.cache.len() > self.config.cache_max_entries {
            prune(
                &self.cache,
                self.config.cache_max_entries,
                self.config.cache_ttl,
                now,
            );
        }
    }

    async fn lookup(&self, query: &str) -> Result<Option<Location>, String> {
        let url = format!("{}/search", self.config.base_url);
        let response = self
            .http
            .get(url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|err| err.to_string())?;

        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }

        let body = response.text().await.map_err(|err| err.to_string())?;
        parse_search_body(&body, query)
    }
}

/// Cache key: trimmed and lower-cased.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

fn parse_search_body(body: &str, query: &str) -> Result<Option<Location>, String> {
    let places: Vec<NominatimPlace> = serde_json::from_str(body).map_err(|err| err.to_string())?;
    let Some(place) = places.into_iter().next() else {
        return Ok(None);
    };

    let lat: f64 = place.lat.parse().map_err(|_| format!("bad lat '{}'", place.lat))?;
    let lon: f64 = place.lon.parse().map_err(|_| format!("bad lon '{}'", place.lon))?;
    let name = if place.display_name.is_empty() {
        query.to_string()
    } else {
        place.display_name
    };
    Location::new(lat, lon, name)
        .map(Some)
        .map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geocoder(ttl: Duration, max_entries: usize) -> Geocoder {
        Geocoder::new(GeocoderConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            user_agent: "detour-test".to_string(),
            timeout: Duration::from_secs(2),
            cache_ttl: ttl,
            cache_max_entries: max_entries,
        })
        .unwrap()
    }

    fn mumbai() -> Location {
        Location::new(19.0760, 72.8777, "Mumbai").unwrap()
    }

    #[test]
    fn queries_are_normalized() {
        assert_eq!(normalize_query("  Gateway of India "), "gateway of india");
        assert_eq!(normalize_query("   "), "");
    }

    #[test]
    fn parses_first_search_result() {
        let body = r#"[{"lat": "19.0760", "lon": "72.8777", "display_name": "Mumbai, Maharashtra, India"}]"#;
        let location = parse_search_body(body, "mumbai").unwrap().unwrap();
        assert_eq!(location.lat, 19.0760);
        assert_eq!(location.lon, 72.8777);
        assert_eq!(location.name, "Mumbai, Maharashtra, India");

        assert_eq!(parse_search_body("[]", "nowhere").unwrap(), None);
        assert!(parse_search_body(r#"[{"lat": "north", "lon": "1"}]"#, "x").is_err());
    }

    #[tokio::test]
    async fn cached_answers_skip_the_network() {
        let geocoder = geocoder(Duration::from_secs(60), 10);
        geocoder.store("mumbai".to_string(), Some(mumbai()), Instant::now());
        geocoder.store("atlantis".to_string(), None, Instant::now());

        assert_eq!(geocoder.resolve("  MUMBAI ").await, Some(mumbai()));
        assert_eq!(geocoder.resolve("Atlantis").await, None);
        assert_eq!(geocoder.cache_len(), 2);
    }

    #[tokio::test]
    async fn failed_lookups_are_not_cached() {
        let geocoder = geocoder(Duration::from_secs(60), 10);
        assert_eq!(geocoder.resolve("Pune").await, None);
        assert_eq!(geocoder.cache_len(), 0);
    }

    #[test]
    fn expired_entries_are_ignored() {
        let geocoder = geocoder(Duration::from_secs(60), 10);
        let stored = Instant::now();
        geocoder.store("mumbai".to_string(), Some(mumbai()), stored);

        assert!(geocoder.cached("mumbai", stored + Duration::from_secs(30)).is_some());
        assert!(geocoder.cached("mumbai", stored + Duration::from_secs(61)).is_none());
    }

    #[test]
    fn cache_stays_bounded() {
        let geocoder = geocoder(Duration::from_secs(60), 3);
        let base = Instant::now();
        for i in 0..6u64 {
            geocoder.store(format!("place {i}"), None, base + Duration::from_secs(i));
        }
        assert_eq!(geocoder.cache_len(), 3);
        assert!(geocoder.cached("place 5", base + Duration::from_secs(6)).is_some());
        assert!(geocoder.cached("place 0", base + Duration::from_secs(6)).is_none());
    }
}
