//! Per-client fixed-window rate limiting.
//!
//! Each key (normally the resolved client IP) gets a counter that resets when
//! its window expires. The window starts at the key's first admitted request,
//! so windows are per key rather than aligned to wall-clock boundaries.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::config::RateLimitConfig;
use crate::observability::metrics;

/// Longest accepted window. Longer windows are clamped so `now + window`
/// cannot overflow `Instant`.
pub const MAX_WINDOW: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Per-key counter state.
#[derive(Debug, Clone, Copy)]
struct VisitorState {
    count: u32,
    reset_at: Instant,
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Time until the key's current window resets.
    pub reset_in: Duration,
}

impl Admission {
    /// Advisory `Retry-After` value: the reset delay rounded up, at least 1s.
    pub fn retry_after_secs(&self) -> u64 {
        let secs = self.reset_in.as_secs() + u64::from(self.reset_in.subsec_nanos() > 0);
        secs.max(1)
    }
}

/// Fixed-window admission control keyed by client identity.
///
/// Cloning is cheap; clones share the same visitor map.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Inner>,
}

struct Inner {
    limit: u32,
    window: Duration,
    visitors: DashMap<String, VisitorState>,
}

impl RateLimiter {
    /// Create a limiter admitting `limit` requests per key per `window`.
    ///
    /// A zero limit admits the first request of each window only, and a
    /// window above [`MAX_WINDOW`] is clamped. Config validation rejects both
    /// before they get here.
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                limit: limit.max(1),
                window: window.min(MAX_WINDOW),
                visitors: DashMap::new(),
            }),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.requests, Duration::from_secs(config.window_secs))
    }

    /// Check and count a request for `key` at the current instant.
    pub fn admit(&self, key: &str) -> Admission {
        self.admit_at(key, Instant::now())
    }

    /// Check and count a request for `key` as if it arrived at `now`.
    ///
    /// The lookup, (re)initialization and increment happen while the entry's
    /// shard lock is held, so concurrent calls for one key serialize.
    pub fn admit_at(&self, key: &str, now: Instant) -> Admission {
        let window = self.inner.window;
        let mut entry = self
            .inner
            .visitors
            .entry(key.to_string())
            .or_insert(VisitorState {
                count: 0,
                reset_at: now,
            });
        let state = entry.value_mut();

        if state.count == 0 || now >= state.reset_at {
            *state = VisitorState {
                count: 1,
                reset_at: now + window,
            };
            return Admission {
                allowed: true,
                reset_in: window,
            };
        }

        let reset_in = state.reset_at.saturating_duration_since(now);
        if state.count < self.inner.limit {
            state.count += 1;
            Admission {
                allowed: true,
                reset_in,
            }
        } else {
            Admission {
                allowed: false,
                reset_in,
            }
        }
    }

    /// Drop every visitor whose window has expired at the current instant.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// Drop every visitor whose window has expired at `now`.
    ///
    /// Returns the number of entries removed. An evicted key behaves exactly
    /// like an expired one on its next request.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let before = self.inner.visitors.len();
        self.inner.visitors.retain(|_, state| now < state.reset_at);
        let after = self.inner.visitors.len();
        metrics::record_tracked_visitors(after);
        before.saturating_sub(after)
    }

    /// Number of keys currently tracked.
    pub fn tracked(&self) -> usize {
        self.inner.visitors.len()
    }

    pub fn limit(&self) -> u32 {
        self.inner.limit
    }

    pub fn window(&self) -> Duration {
        self.inner.window
    }
}

/// Periodically evict expired visitors until shutdown.
pub async fn run_sweeper(
    limiter: RateLimiter,
    every: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let removed = limiter.sweep();
                if removed > 0 {
                    tracing::debug!(removed, remaining = limiter.tracked(), "Swept expired visitors");
                }
            }
            _ = shutdown.recv() => {
                tracing::debug!("Visitor sweeper stopping");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_up_to_limit() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let now = Instant::now();

        for _ in 0..3 {
            assert!(limiter.admit_at("10.0.0.1", now).allowed);
        }
        let rejected = limiter.admit_at("10.0.0.1", now + Duration::from_secs(1));
        assert!(!rejected.allowed);
        assert_eq!(rejected.reset_in, Duration::from_secs(59));
        assert_eq!(rejected.retry_after_secs(), 59);
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();

        assert!(limiter.admit_at("a", now).allowed);
        assert!(!limiter.admit_at("a", now).allowed);
        assert!(limiter.admit_at("b", now).allowed);
    }

    #[test]
    fn test_window_resets() {
        let window = Duration::from_secs(60);
        let limiter = RateLimiter::new(2, window);
        let start = Instant::now();

        assert!(limiter.admit_at("a", start).allowed);
        assert!(limiter.admit_at("a", start).allowed);
        assert!(!limiter.admit_at("a", start + Duration::from_secs(59)).allowed);

        // Exactly at the reset instant the key starts a new window.
        let fresh = limiter.admit_at("a", start + window);
        assert!(fresh.allowed);
        assert_eq!(fresh.reset_in, window);
        assert!(limiter.admit_at("a", start + window).allowed);
        assert!(!limiter.admit_at("a", start + window).allowed);
    }

    #[test]
    fn test_rejection_does_not_extend_window() {
        let limiter = RateLimiter::new(1, Duration::from_secs(10));
        let start = Instant::now();

        assert!(limiter.admit_at("a", start).allowed);
        for s in 1..10 {
            assert!(!limiter.admit_at("a", start + Duration::from_secs(s)).allowed);
        }
        assert!(limiter.admit_at("a", start + Duration::from_secs(10)).allowed);
    }

    #[test]
    fn test_retry_after_rounds_up_and_floors_at_one() {
        let a = Admission {
            allowed: false,
            reset_in: Duration::from_millis(1500),
        };
        assert_eq!(a.retry_after_secs(), 2);

        let b = Admission {
            allowed: false,
            reset_in: Duration::ZERO,
        };
        assert_eq!(b.retry_after_secs(), 1);
    }

    #[test]
    fn test_concurrent_admissions_never_exceed_limit() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));
        let admitted = std::sync::atomic::AtomicUsize::new(0);

        std::thread::scope(|s| {
            for _ in 0..64 {
                s.spawn(|| {
                    if limiter.admit("shared").allowed {
                        admitted.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    }
                });
            }
        });

        assert_eq!(admitted.load(std::sync::atomic::Ordering::SeqCst), 5);
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let limiter = RateLimiter::new(1, Duration::from_secs(10));
        let start = Instant::now();

        limiter.admit_at("old", start);
        limiter.admit_at("new", start + Duration::from_secs(5));
        assert_eq!(limiter.tracked(), 2);

        let removed = limiter.sweep_at(start + Duration::from_secs(10));
        assert_eq!(removed, 1);
        assert_eq!(limiter.tracked(), 1);

        // The surviving key keeps its count.
        assert!(!limiter.admit_at("new", start + Duration::from_secs(11)).allowed);
        // The evicted key is admitted like any expired key.
        assert!(limiter.admit_at("old", start + Duration::from_secs(11)).allowed);
    }

    #[test]
    fn test_oversized_window_is_clamped() {
        let limiter = RateLimiter::new(1, Duration::from_secs(u64::MAX));
        assert_eq!(limiter.window(), MAX_WINDOW);

        let first = limiter.admit("1.2.3.4");
        assert!(first.allowed);
        assert_eq!(first.reset_in, MAX_WINDOW);
        assert!(!limiter.admit("1.2.3.4").allowed);
    }

    #[tokio::test]
    async fn test_sweeper_stops_on_shutdown() {
        let limiter = RateLimiter::new(1, Duration::from_millis(10));
        let (tx, rx) = broadcast::channel(1);
        let handle = tokio::spawn(run_sweeper(limiter.clone(), Duration::from_millis(20), rx));

        limiter.admit("a");
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(limiter.tracked(), 0);

        tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
    }
}
