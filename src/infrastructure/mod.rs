//! Infrastructure layer - external concerns behind domain traits

pub mod auth;
pub mod persistence;
pub mod ratelimit;
