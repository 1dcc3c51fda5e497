//! Presentation layer - HTTP controllers, middleware and DTOs

pub mod controllers;
pub mod extractors;
pub mod middleware;
pub mod models;
pub mod routes;

pub use routes::{create_router, AppState};
