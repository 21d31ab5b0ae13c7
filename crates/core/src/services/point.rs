use std::sync::Arc;

use crate::error::CoreError;
use crate::lock::Lock;
use crate::point::Point;
use crate::store::Store;
use crate::types::EntityId;

/// Reads and replaces the point set of an image.
#[derive(Clone)]
pub struct PointService {
    store: Arc<dyn Store>,
    lock: Lock,
}

impl PointService {
    pub fn new(store: Arc<dyn Store>, lock: Lock) -> Self {
        Self { store, lock }
    }

    /// All points, or only those of `image_id`.
    pub async fn filter(&self, image_id: Option<EntityId>) -> Result<Vec<Point>, CoreError> {
        Ok(self.store.points().filter(image_id).await?)
    }

    /// Replace every point of `image_id` with `points`.
    ///
    /// This is a full-set replacement, not a merge. Every point is validated
    /// before anything is touched, and each is stamped with `image_id`.
    pub async fn replace(&self, image_id: EntityId, points: Vec<Point>) -> Result<(), CoreError> {
        for point in &points {
            point.validate()?;
        }
        let points: Vec<Point> = points
            .into_iter()
            .map(|p| Point { image_id, ..p })
            .collect();

        self.lock
            .auto(move || async move {
                if !self.store.images().has(image_id).await? {
                    tracing::warn!(image_id = %image_id, "Point replace for unknown image");
                    return Err(CoreError::image_not_found(image_id));
                }
                let count = points.len();
                self.store.replace_points(image_id, points).await?;
                tracing::info!(image_id = %image_id, count, "Points replaced");
                Ok(())
            })
            .await
    }
}
