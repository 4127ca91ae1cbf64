//! Error type for repository operations that combine SQL with domain rules.
//!
//! Plain CRUD methods return `sqlx::Error` directly. Transactional methods
//! that consult the core planners (position swaps, bulk reorder) can also
//! fail with a [`CoreError`], e.g. `NotFound` for an unknown id.

use summit_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}
