//! Domain layer - entities, value objects and repository traits

pub mod auth;
