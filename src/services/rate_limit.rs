//! Fixed-window attempt limiter keyed by an arbitrary string (usually the
//! client address).

use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Windows are pruned once the map holds this many keys
const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: u64 },
}

#[derive(Debug)]
struct Window {
    started: Instant,
    hits: u32,
}

pub struct RateLimiter {
    max_attempts: u32,
    window: Duration,
    windows: DashMap<String, Window>,
}

impl RateLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            windows: DashMap::new(),
        }
    }

    /// Record an attempt for `key` now
    pub fn hit(&self, key: &str) -> RateLimitDecision {
        self.hit_at(key, Instant::now())
    }

    /// Record an attempt for `key` at `now`. Denied attempts are not counted
    /// and do not extend the window.
    pub fn hit_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        if self.windows.len() >= PRUNE_THRESHOLD {
            self.prune(now);
        }

        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            started: now,
            hits: 0,
        });

        let elapsed = now.saturating_duration_since(entry.started);
        if elapsed >= self.window {
            entry.started = now;
            entry.hits = 0;
        }

        if entry.hits >= self.max_attempts {
            let remaining = self.window - now.saturating_duration_since(entry.started);
            return RateLimitDecision::Limited {
                retry_after: ceil_secs(remaining).max(1),
            };
        }

        entry.hits += 1;
        RateLimitDecision::Allowed {
            remaining: self.max_attempts - entry.hits,
        }
    }

    fn prune(&self, now: Instant) {
        let window = self.window;
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.started) < window);
    }
}

fn ceil_secs(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}
