//! REST API template with JWT authentication and per-IP rate limiting
//!
//! Layered hexagonal structure: `domain` holds entities and value objects,
//! `application` the use cases, `infrastructure` the adapters (SQLite,
//! bcrypt, JWT, rate limiting) and `presentation` the HTTP surface.

pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use app::{create_app, App, CreateAppError};
pub use config::Config;

/// Initialize the tracing subscriber from logging configuration.
///
/// Honors `RUST_LOG` when set, falling back to the configured level.
pub fn init_tracing(logging: &config::LoggingConfig) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
