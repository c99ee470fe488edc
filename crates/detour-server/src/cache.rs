//! Bounded, age-limited pruning for DashMap-backed caches.

use dashmap::DashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

pub trait Timestamped {
    fn stored_at(&self) -> Instant;
}

/// Drop entries older than `ttl`, then evict oldest-first down to
/// `max_entries`.
pub fn prune<K, V>(cache: &DashMap<K, V>, max_entries: usize, ttl: Duration, now: Instant)
where
    K: Clone + Eq + Hash,
    V: Timestamped,
{
    let mut by_age: Vec<(K, Instant)> = Vec::with_capacity(cache.len());
    cache.retain(|key, value| {
        let stored_at = value.stored_at();
        let fresh = now.saturating_duration_since(stored_at) <= ttl;
        if fresh {
            by_age.push((key.clone(), stored_at));
        }
        fresh
    });

    let excess = cache.len().saturating_sub(max_entries);
    if excess == 0 {
        return;
    }
    by_age.sort_by_key(|(_, stored_at)| *stored_at);
    for (key, _) in by_age.into_iter().take(excess) {
        cache.remove(&key);
    }
}
