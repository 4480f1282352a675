//! Authentication for the statistics API
//!
//! Bearer tokens are not verified locally; each request is checked against
//! the OAuth2 authorization server's introspection endpoint.

mod introspection;
mod middleware;

pub use introspection::*;
pub use middleware::*;
