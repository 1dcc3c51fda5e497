//! Application layer - use cases and application errors

pub mod auth;
pub mod errors;

pub use errors::ApplicationError;
