//! Credentials: password hashing and access-token issuance

pub mod jwt;
pub mod password;

pub use jwt::{AccessClaims, IssuedToken, JwtGenerator};
pub use password::PasswordHasher;
