//! Authentication
//!
//! - [`JwtService`] - issue and verify signed session tokens
//! - [`password`] - argon2 hashing, run on the blocking pool
//! - [`CurrentOperator`] - verified operator for the current request

pub mod extractor;
pub mod jwt;
pub mod password;

pub use extractor::{CurrentOperator, authenticate};
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
