//! Per-caller request throttle
//!
//! Fixed window per caller: the window opens on the caller's first accepted
//! request and resets once it has fully elapsed. Each caller's counter is
//! updated under its DashMap shard lock, so concurrent requests from the same
//! caller never lose updates; different callers never contend on an entry.

use dashmap::DashMap;
use std::time::{Duration, Instant};

use crate::models::config::RateLimitConfig;

/// Outcome of [`RequestThrottle::try_consume`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    Allowed {
        /// Requests left in the current window
        remaining: u32,
        /// Seconds until the window resets
        reset_secs: u64,
    },
    Denied {
        retry_after_secs: u64,
    },
}

impl ThrottleDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Narrow throttle seam; a distributed store can sit behind it
pub trait RequestThrottle: Send + Sync {
    /// Count one request for `caller_id` if the budget allows it
    fn try_consume(&self, caller_id: &str) -> ThrottleDecision;
}

/// In-memory rate limiter
pub struct RateLimiter {
    /// Request counts per caller: (count, window start)
    requests: DashMap<String, (u32, Instant)>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            requests: DashMap::new(),
            config,
        }
    }

    fn check_at(&self, key: &str, now: Instant) -> ThrottleDecision {
        let mut entry = self.requests.entry(key.to_string()).or_insert((0, now));

        // Reset window if expired
        if now.duration_since(entry.1) >= self.config.window_duration {
            entry.0 = 0;
            entry.1 = now;
        }

        let reset_secs = ceil_secs(
            self.config
                .window_duration
                .saturating_sub(now.duration_since(entry.1)),
        );

        if entry.0 >= self.config.requests_per_window {
            return ThrottleDecision::Denied {
                retry_after_secs: reset_secs,
            };
        }

        entry.0 += 1;
        ThrottleDecision::Allowed {
            remaining: self.config.requests_per_window - entry.0,
            reset_secs,
        }
    }

    /// Drop entries whose window has elapsed (call periodically)
    pub fn cleanup(&self) -> usize {
        self.cleanup_at(Instant::now())
    }

    fn cleanup_at(&self, now: Instant) -> usize {
        let before = self.requests.len();
        self.requests
            .retain(|_, (_, started)| now.duration_since(*started) < self.config.window_duration);
        before.saturating_sub(self.requests.len())
    }

    /// Number of callers currently tracked
    pub fn tracked_callers(&self) -> usize {
        self.requests.len()
    }
}

impl RequestThrottle for RateLimiter {
    fn try_consume(&self, caller_id: &str) -> ThrottleDecision {
        self.check_at(caller_id, Instant::now())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

fn ceil_secs(d: Duration) -> u64 {
    let secs = d.as_secs();
    if d.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn limiter(max: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            requests_per_window: max,
            window_duration: Duration::from_secs(window_secs),
        })
    }

    #[test]
    fn test_limit_then_deny() {
        let rl = limiter(3, 60);
        let now = Instant::now();
        assert_eq!(
            rl.check_at("a", now),
            ThrottleDecision::Allowed { remaining: 2, reset_secs: 60 }
        );
        assert!(rl.check_at("a", now).is_allowed());
        assert!(rl.check_at("a", now).is_allowed());
        assert_eq!(
            rl.check_at("a", now),
            ThrottleDecision::Denied { retry_after_secs: 60 }
        );
    }

    #[test]
    fn test_callers_are_independent() {
        let rl = limiter(1, 60);
        let now = Instant::now();
        assert!(rl.check_at("a", now).is_allowed());
        assert!(!rl.check_at("a", now).is_allowed());
        assert!(rl.check_at("b", now).is_allowed());
        assert_eq!(rl.tracked_callers(), 2);
    }

    #[test]
    fn test_window_resets() {
        let rl = limiter(1, 10);
        let start = Instant::now();
        assert!(rl.check_at("a", start).is_allowed());
        assert_eq!(
            rl.check_at("a", start + Duration::from_secs(4)),
            ThrottleDecision::Denied { retry_after_secs: 6 }
        );
        assert!(rl.check_at("a", start + Duration::from_secs(10)).is_allowed());
    }

    #[test]
    fn test_zero_limit_denies_everything() {
        let rl = limiter(0, 10);
        assert!(!rl.try_consume("a").is_allowed());
    }

    #[test]
    fn test_cleanup_evicts_expired() {
        let rl = limiter(5, 10);
        let start = Instant::now();
        rl.check_at("old", start);
        rl.check_at("new", start + Duration::from_secs(8));
        assert_eq!(rl.cleanup_at(start + Duration::from_secs(12)), 1);
        assert_eq!(rl.tracked_callers(), 1);
    }

    #[test]
    fn test_concurrent_same_caller_no_lost_updates() {
        let rl = Arc::new(limiter(500, 60));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let rl = rl.clone();
                std::thread::spawn(move || {
                    (0..100).filter(|_| rl.try_consume("same").is_allowed()).count()
                })
            })
            .collect();
        let allowed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(allowed, 500);
        assert!(!rl.try_consume("same").is_allowed());
    }
}
