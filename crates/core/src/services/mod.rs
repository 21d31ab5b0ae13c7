//! Domain services for images, points and boxes.
//!
//! Every mutation runs inside the shared [`Lock`]; reads go straight to the
//! store. Failures from validation or from the store come back as
//! [`CoreError`](crate::error::CoreError) values and are never recovered
//! locally.

mod bbox;
mod image;
mod point;

use std::sync::Arc;

pub use bbox::BoxService;
pub use image::ImageService;
pub use point::PointService;

use crate::lock::Lock;
use crate::store::Store;

/// The three services wired to one store and one lock.
#[derive(Clone)]
pub struct Services {
    pub image: ImageService,
    pub point: PointService,
    pub bbox: BoxService,
}

impl Services {
    pub fn new(store: Arc<dyn Store>, lock: Lock) -> Self {
        Self {
            image: ImageService::new(Arc::clone(&store), lock.clone()),
            point: PointService::new(Arc::clone(&store), lock.clone()),
            bbox: BoxService::new(store, lock),
        }
    }
}
