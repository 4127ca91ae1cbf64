//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod changeset;
pub mod committee_repo;
pub mod hotel_repo;
pub mod image_refs;
pub mod ordering;
pub mod quote_repo;
pub mod schedule_repo;
pub mod school_repo;
pub mod secretariate_repo;

pub use committee_repo::CommitteeRepo;
pub use hotel_repo::HotelRepo;
pub use image_refs::ImageRefRepo;
pub use ordering::OrderedTable;
pub use quote_repo::QuoteRepo;
pub use schedule_repo::ScheduleRepo;
pub use school_repo::SchoolRepo;
pub use secretariate_repo::SecretariateRepo;
