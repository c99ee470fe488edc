//! In-memory state store using DashMap.

use crate::config::Config;
use crate::geocode::{Geocoder, GeocoderConfig};
use crate::route_planner::{AvoidancePlanner, TracingObserver};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use detour_core::Blockage;
use detour_osrm::RouteProvider;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// A stored blockage with its identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockageRecord {
    pub id: String,
    #[serde(flatten)]
    pub blockage: Blockage,
    pub created_at: DateTime<Utc>,
    /// Insertion order, keeps snapshots stable
    #[serde(skip)]
    sequence: u64,
}

/// Application state: the blockage list plus the shared routing collaborators.
pub struct AppState {
    blockages: DashMap<String, BlockageRecord>,
    sequence: AtomicU64,
    config: Config,
    planner: AvoidancePlanner<RouteProvider>,
    geocoder: Geocoder,
    /// Cancelled on shutdown; in-flight plans return their best so far
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let rules = config.avoidance_rules();
        let provider = RouteProvider::new(config.osrm_config())?
            .with_synthetic_speed(rules.synthetic_speed_kmh);
        let planner = AvoidancePlanner::new(provider, rules)
            .with_workers(config.avoidance_workers)
            .with_observer(Arc::new(TracingObserver));
        let geocoder = Geocoder::new(GeocoderConfig::from_config(&config))?;

        Ok(Self {
            blockages: DashMap::new(),
            sequence: AtomicU64::new(0),
            config,
            planner,
            geocoder,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn planner(&self) -> &AvoidancePlanner<RouteProvider> {
        &self.planner
    }

    pub fn geocoder(&self) -> &Geocoder {
        &self.geocoder
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    pub fn add_blockage(&self, blockage: Blockage) -> BlockageRecord {
        let record = BlockageRecord {
            id: Uuid::new_v4().to_string(),
            blockage,
            created_at: Utc::now(),
            sequence: self.sequence.fetch_add(1, Ordering::SeqCst),
        };
        self.blockages.insert(record.id.clone(), record.clone());
        record
    }

    pub fn get_blockage(&self, id: &str) -> Option<BlockageRecord> {
        self.blockages.get(id).map(|r| r.value().clone())
    }

    /// All blockages in insertion order.
    pub fn list_blockages(&self) -> Vec<BlockageRecord> {
        let mut records: Vec<BlockageRecord> =
            self.blockages.iter().map(|r| r.value().clone()).collect();
        records.sort_by_key(|r| r.sequence);
        records
    }

    pub fn remove_blockage(&self, id: &str) -> bool {
        self.blockages.remove(id).is_some()
    }

    /// Remove every blockage and return how many there were.
    pub fn clear_blockages(&self) -> usize {
        let removed = self.blockages.len();
        self.blockages.clear();
        removed
    }

    /// Immutable copy of the current blockages for one planning call.
    pub fn blockage_snapshot(&self) -> Arc<[Blockage]> {
        self.list_blockages()
            .into_iter()
            .map(|r| r.blockage)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_state() -> AppState {
        AppState::new(Config {
            osrm_mirrors: Vec::new(),
            ..Config::default()
        })
        .unwrap()
    }

    fn blockage(lat: f64) -> Blockage {
        Blockage::new(lat, 72.85, 500.0, format!("at {lat}")).unwrap()
    }

    #[test]
    fn blockages_keep_insertion_order() {
        let state = offline_state();
        let ids: Vec<String> = [19.1, 19.2, 19.3]
            .into_iter()
            .map(|lat| state.add_blockage(blockage(lat)).id)
            .collect();

        let listed: Vec<String> = state.list_blockages().into_iter().map(|r| r.id).collect();
        assert_eq!(listed, ids);

        let snapshot = state.blockage_snapshot();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[0].lat, 19.1);
        assert_eq!(snapshot[2].lat, 19.3);
    }

    #[test]
    fn snapshot_is_unaffected_by_later_changes() {
        let state = offline_state();
        let first = state.add_blockage(blockage(19.1));
        let snapshot = state.blockage_snapshot();

        state.remove_blockage(&first.id);
        state.add_blockage(blockage(19.4));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].lat, 19.1);
    }

    #[test]
    fn remove_and_clear() {
        let state = offline_state();
        let record = state.add_blockage(blockage(19.1));
        state.add_blockage(blockage(19.2));

        assert_eq!(state.get_blockage(&record.id), Some(record.clone()));
        assert!(state.remove_blockage(&record.id));
        assert!(!state.remove_blockage(&record.id));
        assert_eq!(state.clear_blockages(), 1);
        assert!(state.list_blockages().is_empty());
    }

    #[test]
    fn record_serializes_flat() {
        let state = offline_state();
        let record = state.add_blockage(blockage(19.1));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["lat"], 19.1);
        assert_eq!(json["radius_m"], 500.0);
        assert!(json.get("sequence").is_none());
        assert!(json["id"].is_string());
    }
}
