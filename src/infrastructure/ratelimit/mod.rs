//! Per-IP rate limiting
//!
//! Token-bucket admission control keyed by client IP. Buckets refill lazily
//! at check time, so no background timer is needed. The registry is an
//! explicitly owned component constructed once at startup and handed to the
//! HTTP layer; the general API and the auth endpoints each get their own
//! independent instance.

pub mod ip_limiter;
pub mod token_bucket;

pub use ip_limiter::IpRateLimiter;
pub use token_bucket::{RateLimitPolicy, TokenBucket};
