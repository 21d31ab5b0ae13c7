use std::sync::Arc;

use crate::error::CoreError;
use crate::image::{Image, ImageFilter, NewImage, UpdateImage};
use crate::lock::Lock;
use crate::store::Store;
use crate::types::EntityId;
use crate::validation::validate_weight;

/// Creates, reads, updates and cascade-deletes images.
#[derive(Clone)]
pub struct ImageService {
    store: Arc<dyn Store>,
    lock: Lock,
}

impl ImageService {
    pub fn new(store: Arc<dyn Store>, lock: Lock) -> Self {
        Self { store, lock }
    }

    /// Insert a new `Todo` image and return its id.
    ///
    /// Fails with [`CoreError::AlreadyExists`] when the payload names an id
    /// that is already taken.
    pub async fn create(&self, input: NewImage) -> Result<EntityId, CoreError> {
        self.lock
            .auto(move || async move {
                let row = Image::new(input);
                if self.store.images().has(row.id).await? {
                    tracing::warn!(image_id = %row.id, "Image already exists");
                    return Err(CoreError::AlreadyExists {
                        entity: "image",
                        id: row.id,
                    });
                }
                self.store.images().insert(&row).await?;
                tracing::info!(image_id = %row.id, "Image created");
                Ok(row.id)
            })
            .await
    }

    /// Fetch one image including its data payload.
    pub async fn find(&self, id: EntityId) -> Result<Image, CoreError> {
        tracing::debug!(image_id = %id, "Finding image");
        self.store
            .images()
            .find(id, true)
            .await?
            .ok_or_else(|| CoreError::image_not_found(id))
    }

    /// List images matching `filter`. Data payloads are not included.
    pub async fn filter(&self, filter: &ImageFilter) -> Result<Vec<Image>, CoreError> {
        Ok(self.store.images().filter(filter).await?)
    }

    /// Overwrite the state and any supplied optional fields.
    pub async fn update(&self, input: UpdateImage) -> Result<EntityId, CoreError> {
        if let Some(weight) = input.weight {
            validate_weight(weight)?;
        }
        self.lock
            .auto(move || async move {
                let mut row = self.find(input.id).await?;
                row.apply(&input);
                self.store.images().update(&row).await?;
                tracing::info!(image_id = %row.id, state = row.state.as_str(), "Image updated");
                Ok(row.id)
            })
            .await
    }

    /// Delete an image together with all of its points and boxes.
    ///
    /// Atomicity is whatever the store's `delete_image_cascade` provides; the
    /// default composition removes the image, then points, then boxes, and
    /// does not roll back earlier steps if a later one fails.
    pub async fn delete(&self, id: EntityId) -> Result<EntityId, CoreError> {
        self.lock
            .auto(move || async move {
                if !self.store.images().has(id).await? {
                    tracing::warn!(image_id = %id, "Delete of unknown image");
                    return Err(CoreError::image_not_found(id));
                }
                self.store.delete_image_cascade(id).await?;
                tracing::info!(image_id = %id, "Image deleted with its annotations");
                Ok(id)
            })
            .await
    }
}
