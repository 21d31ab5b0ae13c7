//! Domain core for the charpoints image-annotation tool.
//!
//! Holds the entity types (images, points, boxes) with their validation
//! rules, the persistence contracts the services are written against, the
//! mutation [`Lock`](lock::Lock) and the three domain services.

pub mod bbox;
pub mod error;
pub mod image;
pub mod lock;
pub mod memory;
pub mod point;
pub mod services;
pub mod store;
pub mod types;
pub mod validation;
