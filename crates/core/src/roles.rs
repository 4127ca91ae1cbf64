//! Role names embedded in access tokens.

/// The single administrative role. Every mutating endpoint requires it.
pub const ROLE_ADMIN: &str = "admin";
