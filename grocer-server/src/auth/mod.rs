//! Authentication and authorization
//!
//! - [`JwtService`] - access / refresh tokens
//! - [`CurrentUser`] - caller context injected by [`require_auth`]
//! - [`require_admin`] - admin-only route guard
//! - [`password`] - argon2 hashing

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{CurrentUserExt, require_admin, require_auth};
