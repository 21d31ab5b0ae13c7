//! Image list backing image selection.

use std::sync::Arc;

use charpoints_core::image::{Image, ImageFilter};
use charpoints_core::services::Services;
use charpoints_core::types::EntityId;
use indexmap::IndexMap;

use crate::error::EditError;
use crate::events::{EditorEvent, EventBus};

/// Images matching the last fetch, with their data loaded.
pub struct ImageCatalog {
    services: Services,
    events: Arc<EventBus>,
    images: IndexMap<EntityId, Image>,
}

impl ImageCatalog {
    pub fn new(services: Services, events: Arc<EventBus>) -> Self {
        Self {
            services,
            events,
            images: IndexMap::new(),
        }
    }

    /// Replace the catalog with the images matching `filter`.
    ///
    /// Rows whose detail lookup fails are reported on the bus and skipped;
    /// only a failing listing fails the fetch.
    pub async fn fetch(&mut self, filter: &ImageFilter) -> Result<usize, EditError> {
        let rows = match self.services.image.filter(filter).await {
            Ok(rows) => rows,
            Err(e) => {
                let err = EditError::from(e);
                self.events
                    .publish(EditorEvent::failed("fetch", None, &err));
                return Err(err);
            }
        };

        let mut images = IndexMap::with_capacity(rows.len());
        for row in rows {
            match self.services.image.find(row.id).await {
                Ok(image) => {
                    images.insert(image.id, image);
                }
                Err(e) => {
                    tracing::warn!(image_id = %row.id, error = %e, "Skipping image in catalog");
                    self.events.publish(EditorEvent::failed(
                        "fetch",
                        Some(row.id),
                        &EditError::from(e),
                    ));
                }
            }
        }

        tracing::debug!(count = images.len(), "Catalog fetched");
        self.images = images;
        Ok(self.images.len())
    }

    pub fn get(&self, id: EntityId) -> Option<&Image> {
        self.images.get(&id)
    }

    /// Delete image `id` with its annotations and drop it from the list.
    pub async fn remove(&mut self, id: EntityId) -> Result<EntityId, EditError> {
        match self.services.image.delete(id).await {
            Ok(id) => {
                self.images.shift_remove(&id);
                self.events.publish(EditorEvent::Deleted { image_id: id });
                Ok(id)
            }
            Err(e) => {
                let err = EditError::from(e);
                tracing::warn!(image_id = %id, error = %err, "Catalog delete failed");
                self.events
                    .publish(EditorEvent::failed("remove", Some(id), &err));
                Err(err)
            }
        }
    }

    /// Forget `id` locally without touching storage, e.g. after an editor
    /// session deleted it.
    pub fn forget(&mut self, id: EntityId) -> Option<Image> {
        self.images.shift_remove(&id)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn newest_first(&self) -> Vec<&Image> {
        let mut rows: Vec<&Image> = self.images.values().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }

    /// Least annotated first, so the next image to work on leads.
    pub fn by_point_count(&self) -> Vec<&Image> {
        let mut rows: Vec<&Image> = self.images.values().collect();
        rows.sort_by_key(|image| image.point_count);
        rows
    }
}
