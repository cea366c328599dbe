//! Bearer-token authentication against the external identity provider.

pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::JwtVerifier;
pub use models::{JwtClaims, UserContext};
