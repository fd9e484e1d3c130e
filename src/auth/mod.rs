//! Password hashing, token issuance and the request gate for protected routes.

pub mod claims;
pub mod extractors;
pub mod jwt;
pub mod password;

pub use extractors::{require_auth, AuthUser};
pub use jwt::JwtKeys;
