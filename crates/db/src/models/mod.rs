//! Database row structs and their conversions to domain entities.
//!
//! Rows mirror the table columns one to one; the domain types in
//! `charpoints-core` stay free of `sqlx`.

pub mod bbox;
pub mod image;
pub mod point;
