use std::sync::Arc;

use crate::bbox::BoundingBox;
use crate::error::CoreError;
use crate::lock::Lock;
use crate::store::Store;
use crate::types::EntityId;

/// Reads and replaces the box set of an image. Labels travel with each box.
#[derive(Clone)]
pub struct BoxService {
    store: Arc<dyn Store>,
    lock: Lock,
}

impl BoxService {
    pub fn new(store: Arc<dyn Store>, lock: Lock) -> Self {
        Self { store, lock }
    }

    pub async fn filter(&self, image_id: Option<EntityId>) -> Result<Vec<BoundingBox>, CoreError> {
        Ok(self.store.boxes().filter(image_id).await?)
    }

    /// Replace every box of `image_id` with `boxes`.
    ///
    /// Boxes must already be normalized: corners in `[0, 1]`, `x0 < x1` and
    /// `y0 < y1`. Nothing is clamped or reordered here.
    pub async fn replace(
        &self,
        image_id: EntityId,
        boxes: Vec<BoundingBox>,
    ) -> Result<(), CoreError> {
        for b in &boxes {
            b.validate()?;
        }
        let boxes: Vec<BoundingBox> = boxes
            .into_iter()
            .map(|b| BoundingBox { image_id, ..b })
            .collect();

        self.lock
            .auto(move || async move {
                if !self.store.images().has(image_id).await? {
                    tracing::warn!(image_id = %image_id, "Box replace for unknown image");
                    return Err(CoreError::image_not_found(image_id));
                }
                let count = boxes.len();
                self.store.replace_boxes(image_id, boxes).await?;
                tracing::info!(image_id = %image_id, count, "Boxes replaced");
                Ok(())
            })
            .await
    }
}
