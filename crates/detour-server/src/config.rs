//! Server configuration from environment.

use detour_core::AvoidanceRules;
use detour_osrm::{OsrmConfig, DEFAULT_MIRRORS};
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub osrm_mirrors: Vec<String>,
    pub osrm_timeout_s: u64,
    pub max_concurrent_requests: usize,
    pub mirror_backoff_ms: u64,
    pub mirror_backoff_max_ms: u64,
    /// Candidate routes evaluated concurrently during avoidance search
    pub avoidance_workers: usize,
    /// Planning deadline in seconds, 0 disables it
    pub avoidance_deadline_s: u64,
    pub conflict_buffer_m: f64,
    pub natural_alt_threshold: f64,
    pub user_agent: String,
    pub nominatim_url: String,
    pub geocode_cache_ttl_s: u64,
    pub geocode_cache_max_entries: usize,
    pub geocode_timeout_s: u64,
}

impl Default for Config {
    fn default() -> Self {
        let rules = AvoidanceRules::default();
        Self {
            server_port: 3000,
            osrm_mirrors: DEFAULT_MIRRORS.iter().map(|m| m.to_string()).collect(),
            osrm_timeout_s: 15,
            max_concurrent_requests: 4,
            mirror_backoff_ms: 500,
            mirror_backoff_max_ms: 30_000,
            avoidance_workers: 4,
            avoidance_deadline_s: 0,
            conflict_buffer_m: rules.conflict_buffer_m,
            natural_alt_threshold: rules.natural_alternative_threshold,
            user_agent: format!("detour/{}", env!("CARGO_PKG_VERSION")),
            nominatim_url: "https://nominatim.openstreetmap.org".to_string(),
            geocode_cache_ttl_s: 3600,
            geocode_cache_max_entries: 1000,
            geocode_timeout_s: 10,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("DETOUR_PORT", defaults.server_port),
            osrm_mirrors: env::var("DETOUR_OSRM_MIRRORS")
                .ok()
                .map(|raw| parse_list(&raw))
                .filter(|mirrors| !mirrors.is_empty())
                .unwrap_or(defaults.osrm_mirrors),
            osrm_timeout_s: env_or("DETOUR_OSRM_TIMEOUT_S", defaults.osrm_timeout_s),
            max_concurrent_requests: env_or(
                "DETOUR_MAX_CONCURRENT_REQUESTS",
                defaults.max_concurrent_requests,
            ),
            mirror_backoff_ms: env_or("DETOUR_MIRROR_BACKOFF_MS", defaults.mirror_backoff_ms),
            mirror_backoff_max_ms: env_or(
                "DETOUR_MIRROR_BACKOFF_MAX_MS",
                defaults.mirror_backoff_max_ms,
            ),
            avoidance_workers: env_or("DETOUR_AVOIDANCE_WORKERS", defaults.avoidance_workers),
            avoidance_deadline_s: env_or(
                "DETOUR_AVOIDANCE_DEADLINE_S",
                defaults.avoidance_deadline_s,
            ),
            conflict_buffer_m: env_or("DETOUR_CONFLICT_BUFFER_M", defaults.conflict_buffer_m),
            natural_alt_threshold: env_or(
                "DETOUR_NATURAL_ALT_THRESHOLD",
                defaults.natural_alt_threshold,
            ),
            user_agent: env::var("DETOUR_USER_AGENT").unwrap_or(defaults.user_agent),
            nominatim_url: env::var("DETOUR_NOMINATIM_URL").unwrap_or(defaults.nominatim_url),
            geocode_cache_ttl_s: env_or("DETOUR_GEOCODE_CACHE_TTL_S", defaults.geocode_cache_ttl_s),
            geocode_cache_max_entries: env_or(
                "DETOUR_GEOCODE_CACHE_MAX_ENTRIES",
                defaults.geocode_cache_max_entries,
            ),
            geocode_timeout_s: env_or("DETOUR_GEOCODE_TIMEOUT_S", defaults.geocode_timeout_s),
        }
    }

    pub fn osrm_config(&self) -> OsrmConfig {
        OsrmConfig {
            mirrors: self.osrm_mirrors.clone(),
            request_timeout: Duration::from_secs(self.osrm_timeout_s.max(1)),
            max_concurrent_requests: self.max_concurrent_requests.max(1),
            backoff_base: Duration::from_millis(self.mirror_backoff_ms),
            backoff_max: Duration::from_millis(self.mirror_backoff_max_ms),
            user_agent: self.user_agent.clone(),
        }
    }

    pub fn avoidance_rules(&self) -> AvoidanceRules {
        AvoidanceRules {
            conflict_buffer_m: self.conflict_buffer_m.max(0.0),
            natural_alternative_threshold: self.natural_alt_threshold,
            ..AvoidanceRules::default()
        }
    }

    pub fn avoidance_deadline(&self) -> Option<Duration> {
        (self.avoidance_deadline_s > 0).then(|| Duration::from_secs(self.avoidance_deadline_s))
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
