//! Summit domain core.
//!
//! Pure domain logic shared by the database and API crates: the error
//! taxonomy, the tri-state [`patch::Patch`] type, the field diff engine,
//! position swapping for ordered collections, image ingestion, and the
//! storage bucket abstraction.

pub mod diff;
pub mod error;
pub mod image;
pub mod ordering;
pub mod patch;
pub mod roles;
pub mod storage;
pub mod types;
pub mod validation;
