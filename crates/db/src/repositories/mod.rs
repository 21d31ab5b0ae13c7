//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async queries. Methods
//! take any Postgres executor so the same query runs against `&PgPool` or
//! inside a transaction (`&mut *tx`).

pub mod box_repo;
pub mod image_repo;
pub mod point_repo;

pub use box_repo::BoxRepo;
pub use image_repo::ImageRepo;
pub use point_repo::PointRepo;
