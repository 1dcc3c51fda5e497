//! Authentication infrastructure: JWT signing and password hashing

pub mod jwt_service;
pub mod password_hasher;

pub use jwt_service::JwtService;
pub use password_hasher::PasswordHasher;
