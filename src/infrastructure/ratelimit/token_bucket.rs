//! Token bucket implementation for rate limiting
//!
//! Classic token bucket with continuous refill computed from elapsed time
//! at each admission check.

use std::time::Instant;

/// Immutable rate limit policy shared by all buckets of one limiter instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitPolicy {
    /// Tokens added per second
    pub refill_rate: f64,
    /// Maximum tokens a bucket can hold
    pub burst: u32,
}

impl RateLimitPolicy {
    /// Policy expressed as requests per second
    pub fn per_second(requests_per_second: f64, burst: u32) -> Self {
        Self {
            refill_rate: requests_per_second,
            burst,
        }
    }

    /// Policy expressed as requests per minute
    pub fn per_minute(requests_per_minute: f64, burst: u32) -> Self {
        Self {
            refill_rate: requests_per_minute / 60.0,
            burst,
        }
    }
}

/// Per-IP token bucket state
///
/// Token count is a float so fractional refill accumulates between checks.
/// Invariant: `0 <= tokens <= burst` at all times.
#[derive(Debug)]
pub struct TokenBucket {
    /// Tokens added per second
    refill_rate: f64,
    /// Maximum tokens the bucket can hold
    burst: f64,
    /// Current number of tokens
    tokens: f64,
    /// Last refill time
    last_refill: Instant,
}

impl TokenBucket {
    /// Create a bucket initialized to full burst capacity
    pub fn new(policy: &RateLimitPolicy) -> Self {
        Self::new_at(policy, Instant::now())
    }

    pub(crate) fn new_at(policy: &RateLimitPolicy, now: Instant) -> Self {
        let burst = policy.burst as f64;
        Self {
            refill_rate: policy.refill_rate,
            burst,
            tokens: burst,
            last_refill: now,
        }
    }

    /// Refill proportionally to elapsed time, then consume one token if
    /// available. Returns `true` to admit, `false` to reject.
    #[inline]
    pub fn allow(&mut self) -> bool {
        self.allow_at(Instant::now())
    }

    /// Admission check against an explicit clock reading. Lets tests drive
    /// time deterministically.
    pub(crate) fn allow_at(&mut self, now: Instant) -> bool {
        self.refill_at(now);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Refill tokens based on elapsed time, capped at burst capacity
    #[inline]
    fn refill_at(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = self.burst.min(self.tokens + elapsed * self.refill_rate);
        self.last_refill = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn advance(start: Instant, millis: u64) -> Instant {
        start + Duration::from_millis(millis)
    }

    #[test]
    fn fresh_bucket_admits_exactly_burst_requests() {
        let policy = RateLimitPolicy::per_second(10.0, 20);
        let start = Instant::now();
        let mut bucket = TokenBucket::new_at(&policy, start);

        for _ in 0..20 {
            assert!(bucket.allow_at(start));
        }
        // 21st request with no elapsed time is rejected
        assert!(!bucket.allow_at(start));
    }

    #[test]
    fn one_token_refills_after_one_over_rate_seconds() {
        // 10 req/s: one token every 100ms
        let policy = RateLimitPolicy::per_second(10.0, 20);
        let start = Instant::now();
        let mut bucket = TokenBucket::new_at(&policy, start);

        for _ in 0..20 {
            assert!(bucket.allow_at(start));
        }
        assert!(!bucket.allow_at(start));

        let later = advance(start, 100);
        assert!(bucket.allow_at(later));
        assert!(!bucket.allow_at(later));
    }

    #[test]
    fn tokens_cap_at_burst_after_long_idle() {
        let policy = RateLimitPolicy::per_second(100.0, 5);
        let start = Instant::now();
        let mut bucket = TokenBucket::new_at(&policy, start);

        // An hour idle must not accumulate beyond burst
        let much_later = start + Duration::from_secs(3600);
        for _ in 0..5 {
            assert!(bucket.allow_at(much_later));
        }
        assert!(!bucket.allow_at(much_later));
    }

    #[test]
    fn rejected_request_leaves_bucket_unchanged() {
        let policy = RateLimitPolicy::per_second(1.0, 1);
        let start = Instant::now();
        let mut bucket = TokenBucket::new_at(&policy, start);

        assert!(bucket.allow_at(start));
        assert!(!bucket.allow_at(start));
        // Half a token refilled after 500ms, still below one
        let later = advance(start, 500);
        assert!(!bucket.allow_at(later));
        // The failed check must not have consumed the fraction
        let full = advance(start, 1000);
        assert!(bucket.allow_at(full));
    }

    #[test]
    fn per_minute_policy_admits_burst_then_rejects_within_minute() {
        // Auth policy scenario: 5 req/min, burst 5
        let policy = RateLimitPolicy::per_minute(5.0, 5);
        let start = Instant::now();
        let mut bucket = TokenBucket::new_at(&policy, start);

        for _ in 0..5 {
            assert!(bucket.allow_at(start));
        }
        // 6th attempt within the same minute is rejected
        let within_minute = advance(start, 10_000);
        assert!(!bucket.allow_at(within_minute));
        // After 12 seconds per token, one attempt succeeds again
        let after_refill = advance(start, 12_000);
        assert!(bucket.allow_at(after_refill));
    }

    #[test]
    fn fractional_refill_accumulates_across_checks() {
        let policy = RateLimitPolicy::per_second(10.0, 2);
        let start = Instant::now();
        let mut bucket = TokenBucket::new_at(&policy, start);

        assert!(bucket.allow_at(start));
        assert!(bucket.allow_at(start));

        // Three 40ms checks accumulate 1.2 tokens; only the third admits
        assert!(!bucket.allow_at(advance(start, 40)));
        assert!(!bucket.allow_at(advance(start, 80)));
        assert!(bucket.allow_at(advance(start, 120)));
    }
}
