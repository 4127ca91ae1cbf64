//! Request extractors guarding the API.
//!
//! - [`auth::RequireAdmin`] -- a valid bearer token with the `admin` role.
//! - [`rate_limit::RateLimit`] -- one unit of the caller's quota on public writes.

pub mod auth;
pub mod rate_limit;
