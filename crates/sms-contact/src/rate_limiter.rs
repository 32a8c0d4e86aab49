use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{interval, Instant};
use tracing::{debug, warn};

/// Configuration for per-phone rate limiting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Minimum seconds between accepted submissions from one phone (default: 120)
    pub window_seconds: u64,
    /// How often stale entries are swept, in seconds (default: 300)
    pub cleanup_interval_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_seconds: 120,
            cleanup_interval_seconds: 300,
        }
    }
}

/// Enforces a minimum interval between accepted submissions per phone.
///
/// Cloning is cheap and every clone shares the same table.
#[derive(Debug, Clone)]
pub struct PhoneRateLimiter {
    last_accepted: Arc<Mutex<HashMap<String, Instant>>>,
    window: Duration,
    cleanup_interval: Duration,
}

/// Result of rate limit check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    Allowed,
    Limited { retry_after: Duration },
}

impl PhoneRateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            last_accepted: Arc::new(Mutex::new(HashMap::new())),
            window: Duration::from_secs(config.window_seconds),
            cleanup_interval: Duration::from_secs(config.cleanup_interval_seconds.max(1)),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Check `phone` and, if allowed, record now as its last accepted time.
    ///
    /// The lookup and the update happen under one lock, so two concurrent
    /// submissions for the same phone cannot both be allowed. A limited
    /// check leaves the stored time untouched.
    pub async fn check_and_record(&self, phone: &str) -> RateLimitResult {
        let mut table = self.last_accepted.lock().await;
        let now = Instant::now();

        if let Some(last) = table.get(phone) {
            let elapsed = now.duration_since(*last);
            if elapsed < self.window {
                let retry_after = self.window - elapsed;
                warn!(
                    retry_after_secs = retry_after.as_secs(),
                    "Rate limit exceeded for phone {}", phone
                );
                return RateLimitResult::Limited { retry_after };
            }
        }

        table.insert(phone.to_string(), now);
        debug!("Rate limit check passed for phone {}", phone);
        RateLimitResult::Allowed
    }

    /// When `phone` was last accepted, if it is still tracked.
    pub async fn last_accepted(&self, phone: &str) -> Option<Instant> {
        self.last_accepted.lock().await.get(phone).copied()
    }

    pub async fn tracked(&self) -> usize {
        self.last_accepted.lock().await.len()
    }

    /// Drop entries whose window has already elapsed.
    ///
    /// An expired entry would allow the next submission anyway, so removing
    /// it never changes an outcome.
    pub async fn cleanup_expired(&self) {
        let mut table = self.last_accepted.lock().await;
        let now = Instant::now();
        let window = self.window;
        table.retain(|phone, last| {
            let keep = now.duration_since(*last) < window;
            if !keep {
                debug!("Cleaned up rate limit entry for phone {}", phone);
            }
            keep
        });
    }

    /// Sweep expired entries forever; spawn this next to the server.
    pub async fn run_cleanup(self) {
        let mut ticker = interval(self.cleanup_interval);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            self.cleanup_expired().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    fn limiter() -> PhoneRateLimiter {
        PhoneRateLimiter::new(&RateLimitConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn second_submission_inside_window_is_limited() {
        let limiter = limiter();

        assert_eq!(
            limiter.check_and_record("4165550100").await,
            RateLimitResult::Allowed
        );

        advance(Duration::from_secs(30)).await;
        match limiter.check_and_record("4165550100").await {
            RateLimitResult::Limited { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(90));
            }
            RateLimitResult::Allowed => panic!("Second submission should be limited"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn submission_at_window_boundary_is_allowed() {
        let limiter = limiter();
        assert_eq!(
            limiter.check_and_record("4165550100").await,
            RateLimitResult::Allowed
        );

        advance(Duration::from_secs(119)).await;
        assert!(matches!(
            limiter.check_and_record("4165550100").await,
            RateLimitResult::Limited { .. }
        ));

        advance(Duration::from_secs(1)).await;
        assert_eq!(
            limiter.check_and_record("4165550100").await,
            RateLimitResult::Allowed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn limited_check_does_not_move_timestamp() {
        let limiter = limiter();
        limiter.check_and_record("4165550100").await;
        let first = limiter.last_accepted("4165550100").await.unwrap();

        advance(Duration::from_secs(60)).await;
        limiter.check_and_record("4165550100").await;
        assert_eq!(limiter.last_accepted("4165550100").await, Some(first));

        // Still measured from the first acceptance, not the rejected attempt.
        advance(Duration::from_secs(60)).await;
        assert_eq!(
            limiter.check_and_record("4165550100").await,
            RateLimitResult::Allowed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn phones_are_tracked_independently() {
        let limiter = limiter();
        assert_eq!(
            limiter.check_and_record("4165550100").await,
            RateLimitResult::Allowed
        );
        assert_eq!(
            limiter.check_and_record("(416) 555-0100").await,
            RateLimitResult::Allowed
        );
        assert_eq!(limiter.tracked().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cleanup_drops_only_expired_entries() {
        let limiter = limiter();
        limiter.check_and_record("4165550100").await;
        advance(Duration::from_secs(100)).await;
        limiter.check_and_record("6475550100").await;

        advance(Duration::from_secs(30)).await;
        limiter.cleanup_expired().await;

        assert_eq!(limiter.tracked().await, 1);
        assert!(limiter.last_accepted("4165550100").await.is_none());
        assert!(limiter.last_accepted("6475550100").await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_checks_allow_exactly_one() {
        let limiter = limiter();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.check_and_record("4165550100").await })
            })
            .collect();

        let mut allowed = 0;
        for handle in handles {
            if handle.await.unwrap() == RateLimitResult::Allowed {
                allowed += 1;
            }
        }
        assert_eq!(allowed, 1);
    }
}
