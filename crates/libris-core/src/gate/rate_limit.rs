//! Per-identity sliding-window rate limiting

use crate::error::GateError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum requests allowed per identity within the window.
    pub max_requests: usize,
    /// Window length in seconds.
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 20,
            window_secs: 60,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Sliding-window rate limiter keyed by identity.
///
/// Each identity holds a list of request timestamps; entries older than the
/// window are pruned at read time, so the invariant "all stored timestamps
/// are within the window of now" holds at every check. Prune, check, and
/// consume happen under one lock acquisition per call, which makes
/// check-and-increment atomic per identity; a slot is consumed only when
/// the request is ultimately allowed.
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Check the identity against its window, consuming one slot on success.
    pub fn check(&self, identity: &str) -> Result<(), GateError> {
        let now = Instant::now();
        let window = self.config.window();

        // The window map holds only timestamps, so a poisoned lock leaves
        // nothing half-written; recover the guard rather than fail the
        // request.
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let timestamps = windows.entry(identity.to_string()).or_default();
        timestamps.retain(|t| now.duration_since(*t) < window);

        if timestamps.len() >= self.config.max_requests {
            let retry_after_secs = timestamps
                .first()
                .map(|oldest| window.saturating_sub(now.duration_since(*oldest)).as_secs())
                .unwrap_or(self.config.window_secs);
            tracing::warn!(
                identity,
                max_requests = self.config.max_requests,
                window_secs = self.config.window_secs,
                "Rate limit exceeded"
            );
            return Err(GateError::RateLimited { retry_after_secs });
        }

        timestamps.push(now);
        Ok(())
    }

    /// Number of identities currently tracked.
    pub fn tracked_identities(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_cap_then_denies() {
        let limiter = RateLimiter::new(RateLimitConfig {
            max_requests: 3,
            window_secs: 60,
        });

        assert!(limiter.check("user-1").is_ok());
        assert!(limiter.check("user-1").is_ok());
        assert!(limiter.check("user-1").is_ok());
        assert!(matches!(
            limiter.check("user-1"),
            Err(GateError::RateLimited { .. })
        ));
    }

    #[test]
    fn identities_have_independent_windows() {
        let limiter = RateLimiter::new(RateLimitConfig {
            max_requests: 1,
            window_secs: 60,
        });

        assert!(limiter.check("user-1").is_ok());
        assert!(limiter.check("user-2").is_ok());
        assert!(limiter.check("user-1").is_err());
        assert_eq!(limiter.tracked_identities(), 2);
    }

    #[test]
    fn denied_requests_do_not_consume_slots() {
        let limiter = RateLimiter::new(RateLimitConfig {
            max_requests: 2,
            window_secs: 60,
        });

        assert!(limiter.check("user-1").is_ok());
        assert!(limiter.check("user-1").is_ok());
        // Repeated denials must not extend the window occupancy.
        for _ in 0..5 {
            assert!(limiter.check("user-1").is_err());
        }
        let windows = limiter.windows.lock().unwrap();
        assert_eq!(windows.get("user-1").map(Vec::len), Some(2));
    }

    #[test]
    fn window_expiry_frees_slots() {
        let limiter = RateLimiter::new(RateLimitConfig {
            max_requests: 1,
            window_secs: 0,
        });

        assert!(limiter.check("user-1").is_ok());
        // A zero-length window expires immediately.
        assert!(limiter.check("user-1").is_ok());
    }

    #[test]
    fn denial_carries_retry_guidance() {
        let limiter = RateLimiter::new(RateLimitConfig {
            max_requests: 1,
            window_secs: 60,
        });

        limiter.check("user-1").unwrap();
        match limiter.check("user-1") {
            Err(GateError::RateLimited { retry_after_secs }) => {
                assert!(retry_after_secs <= 60);
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[test]
    fn concurrent_checks_admit_exactly_the_cap() {
        use std::sync::Arc;

        let limiter = Arc::new(RateLimiter::new(RateLimitConfig {
            max_requests: 10,
            window_secs: 60,
        }));

        let handles: Vec<_> = (0..40)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || limiter.check("shared").is_ok())
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap_or(false))
            .filter(|&admitted| admitted)
            .count();
        assert_eq!(admitted, 10);
    }
}
