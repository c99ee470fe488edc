//! Per-mirror failure backoff.
//!
//! A mirror that just failed is tried after the healthy ones until its
//! delay elapses. Delays
//! double on every consecutive failure up to `max`, with up to 20% jitter so
//! several processes sharing a mirror do not retry in lockstep.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

const JITTER_RATIO: f64 = 0.2;

#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    current: Duration,
    next_attempt_at: Instant,
    consecutive_failures: u32,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        let base = base.max(Duration::from_millis(1));
        Self {
            base,
            max: max.max(base),
            current: base,
            next_attempt_at: Instant::now(),
            consecutive_failures: 0,
        }
    }

    pub fn ready(&self) -> bool {
        Instant::now() >= self.next_attempt_at
    }

    /// Time left before the mirror may be tried again.
    pub fn remaining(&self) -> Duration {
        self.next_attempt_at.saturating_duration_since(Instant::now())
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn record_success(&mut self) {
        self.current = self.base;
        self.consecutive_failures = 0;
        self.next_attempt_at = Instant::now();
    }

    /// Register a failure and return the delay before the next attempt.
    pub fn record_failure(&mut self) -> Duration {
        // The first failure waits `base`; later ones double.
        if self.consecutive_failures > 0 {
            self.current = self.current.saturating_mul(2).min(self.max);
        }
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        let delay = with_jitter(self.current);
        self.next_attempt_at = Instant::now() + delay;
        delay
    }
}

fn with_jitter(delay: Duration) -> Duration {
    let max_jitter_ms = (delay.as_millis() as f64 * JITTER_RATIO) as u64;
    if max_jitter_ms == 0 {
        return delay;
    }
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::from(d.subsec_nanos()))
        .unwrap_or(0);
    delay + Duration::from_millis(seed % (max_jitter_ms + 1))
}
