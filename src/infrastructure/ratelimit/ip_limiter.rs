//! Registry of per-IP token buckets
//!
//! Lookups take the shared read lock; insertion-on-miss and cleanup take the
//! write lock. Each bucket carries its own mutex so concurrent admission
//! checks for the same IP never lose updates.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use tracing::debug;

use super::token_bucket::{RateLimitPolicy, TokenBucket};

/// Registry size above which a cleanup pass evicts entries
const DEFAULT_MAX_ENTRIES: usize = 1000;
/// Number of entries removed per cleanup pass
const DEFAULT_EVICT_BATCH: usize = 500;

/// Per-IP rate limiter under a single fixed policy
///
/// Thread-safe; shared across request handlers behind an `Arc`. Two
/// independent instances exist in the application (general and auth) and
/// share no state.
pub struct IpRateLimiter {
    policy: RateLimitPolicy,
    buckets: RwLock<HashMap<String, Arc<Mutex<TokenBucket>>>>,
    max_entries: usize,
    evict_batch: usize,
}

impl IpRateLimiter {
    /// Create a limiter with the default memory bounds
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self::with_capacity_limits(policy, DEFAULT_MAX_ENTRIES, DEFAULT_EVICT_BATCH)
    }

    /// Create a limiter with explicit registry bounds
    pub fn with_capacity_limits(
        policy: RateLimitPolicy,
        max_entries: usize,
        evict_batch: usize,
    ) -> Self {
        Self {
            policy,
            buckets: RwLock::new(HashMap::new()),
            max_entries,
            evict_batch,
        }
    }

    /// The policy this limiter enforces
    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Return the bucket for `ip`, creating one at full burst capacity on
    /// first sight of the address. Always succeeds.
    pub fn get_or_create_bucket(&self, ip: &str) -> Arc<Mutex<TokenBucket>> {
        {
            let buckets = self.buckets.read().expect("rate limiter lock poisoned");
            if let Some(bucket) = buckets.get(ip) {
                return bucket.clone();
            }
        }

        let mut buckets = self.buckets.write().expect("rate limiter lock poisoned");
        buckets
            .entry(ip.to_string())
            .or_insert_with(|| {
                debug!(ip, "creating rate limit bucket");
                Arc::new(Mutex::new(TokenBucket::new(&self.policy)))
            })
            .clone()
    }

    /// Admission check for a request from `ip`.
    ///
    /// Refills the bucket for the elapsed time, consumes one token if
    /// available and triggers an eviction pass when the registry has grown
    /// past its bound.
    pub fn allow(&self, ip: &str) -> bool {
        let bucket = self.get_or_create_bucket(ip);
        let allowed = {
            let mut guard = bucket.lock().expect("rate limiter bucket lock poisoned");
            guard.allow()
        };

        if self.len() > self.max_entries {
            self.cleanup();
        }

        allowed
    }

    /// Evict a bounded number of entries when the registry exceeds its size
    /// bound. Which entries are removed is arbitrary, not least-recently-used;
    /// an evicted client simply starts over with a fresh full bucket.
    pub fn cleanup(&self) {
        let mut buckets = self.buckets.write().expect("rate limiter lock poisoned");
        if buckets.len() <= self.max_entries {
            return;
        }

        let victims: Vec<String> = buckets
            .keys()
            .take(self.evict_batch)
            .cloned()
            .collect();
        for ip in &victims {
            buckets.remove(ip);
        }

        debug!(
            evicted = victims.len(),
            remaining = buckets.len(),
            "rate limiter cleanup pass"
        );
    }

    /// Number of tracked IPs
    pub fn len(&self) -> usize {
        self.buckets.read().expect("rate limiter lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn bucket_is_created_lazily_at_full_burst() {
        let limiter = IpRateLimiter::new(RateLimitPolicy::per_second(10.0, 3));
        assert!(limiter.is_empty());

        assert!(limiter.allow("1.2.3.4"));
        assert_eq!(limiter.len(), 1);

        // Same IP maps to the same bucket
        let a = limiter.get_or_create_bucket("1.2.3.4");
        let b = limiter.get_or_create_bucket("1.2.3.4");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn burst_is_enforced_per_ip() {
        let limiter = IpRateLimiter::new(RateLimitPolicy::per_second(0.001, 3));

        for _ in 0..3 {
            assert!(limiter.allow("1.2.3.4"));
        }
        assert!(!limiter.allow("1.2.3.4"));

        // A different IP has its own untouched bucket
        assert!(limiter.allow("5.6.7.8"));
    }

    #[test]
    fn concurrent_allows_never_admit_more_than_burst() {
        // Negligible refill rate so only the initial burst can be admitted
        let limiter = Arc::new(IpRateLimiter::new(RateLimitPolicy::per_second(0.0001, 50)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                thread::spawn(move || {
                    let mut admitted = 0u32;
                    for _ in 0..25 {
                        if limiter.allow("10.0.0.1") {
                            admitted += 1;
                        }
                    }
                    admitted
                })
            })
            .collect();

        let total: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 50);
    }

    #[test]
    fn cleanup_bounds_registry_size() {
        let limiter = IpRateLimiter::with_capacity_limits(
            RateLimitPolicy::per_second(10.0, 5),
            100,
            50,
        );

        for i in 0..150 {
            limiter.allow(&format!("10.0.{}.{}", i / 256, i % 256));
        }

        // Eviction fired once the bound was crossed; which IPs survive is
        // unspecified, only that the size came back down.
        assert!(limiter.len() <= 101);

        limiter.cleanup();
        assert!(limiter.len() <= 100);
    }

    #[test]
    fn cleanup_below_threshold_is_a_no_op() {
        let limiter = IpRateLimiter::with_capacity_limits(
            RateLimitPolicy::per_second(10.0, 5),
            100,
            50,
        );
        for i in 0..10 {
            limiter.allow(&format!("192.168.0.{}", i));
        }
        limiter.cleanup();
        assert_eq!(limiter.len(), 10);
    }

    #[test]
    fn cleanup_is_safe_concurrently_with_allows() {
        let limiter = Arc::new(IpRateLimiter::with_capacity_limits(
            RateLimitPolicy::per_second(100.0, 10),
            50,
            25,
        ));

        let writers: Vec<_> = (0..4)
            .map(|t| {
                let limiter = limiter.clone();
                thread::spawn(move || {
                    for i in 0..200 {
                        limiter.allow(&format!("172.16.{}.{}", t, i));
                    }
                })
            })
            .collect();

        let cleaner = {
            let limiter = limiter.clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    limiter.cleanup();
                }
            })
        };

        for handle in writers {
            handle.join().unwrap();
        }
        cleaner.join().unwrap();

        // No deadlock, and a final pass leaves the registry bounded
        limiter.cleanup();
        assert!(limiter.len() <= 50);
    }

    #[test]
    fn evicted_ip_gets_a_fresh_bucket_on_next_request() {
        let limiter = IpRateLimiter::with_capacity_limits(
            RateLimitPolicy::per_second(0.001, 1),
            0,
            1,
        );

        assert!(limiter.allow("1.1.1.1"));
        // Bucket drained; with max_entries 0 every pass evicts it
        limiter.cleanup();
        // Next request recreates the bucket at full burst
        assert!(limiter.allow("1.1.1.1"));
    }

    #[test]
    fn independent_instances_share_no_state() {
        let general = IpRateLimiter::new(RateLimitPolicy::per_second(0.001, 2));
        let auth = IpRateLimiter::new(RateLimitPolicy::per_minute(5.0, 5));

        assert!(general.allow("9.9.9.9"));
        assert!(general.allow("9.9.9.9"));
        assert!(!general.allow("9.9.9.9"));

        // Exhausting the general bucket does not affect the auth limiter
        for _ in 0..5 {
            assert!(auth.allow("9.9.9.9"));
        }
        assert!(!auth.allow("9.9.9.9"));
    }
}
