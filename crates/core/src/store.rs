//! Persistence contracts consumed by the domain services.
//!
//! The services never talk to a database directly; they are written against
//! [`Store`], which hands out one collection per entity. Implementations
//! live elsewhere (`charpoints-db` for Postgres, [`crate::memory`] for tests
//! and embedded use).
//!
//! The composite operations on [`Store`] (`delete_image_cascade`,
//! `replace_points`, `replace_boxes`) have default bodies that call the
//! per-collection primitives one after another. Those defaults are **not
//! atomic**: a failure part-way leaves the earlier steps applied. Backends
//! that can run them in one transaction should override them.

use async_trait::async_trait;

use crate::bbox::BoundingBox;
use crate::image::{Image, ImageFilter};
use crate::point::Point;
use crate::types::EntityId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Opaque failure reported by a persistence backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("constraint violated: {0}")]
    Constraint(String),
}

impl StoreError {
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Look up one image. With `with_data == false` the base64 payload is
    /// left out of the returned record.
    async fn find(&self, id: EntityId, with_data: bool) -> StoreResult<Option<Image>>;

    /// List matching images, without their data payloads.
    async fn filter(&self, filter: &ImageFilter) -> StoreResult<Vec<Image>>;

    async fn has(&self, id: EntityId) -> StoreResult<bool>;

    async fn insert(&self, image: &Image) -> StoreResult<()>;

    async fn update(&self, image: &Image) -> StoreResult<()>;

    /// Insert or overwrite.
    async fn replace(&self, image: &Image) -> StoreResult<()>;

    async fn delete(&self, id: EntityId) -> StoreResult<()>;

    async fn set_point_count(&self, id: EntityId, count: i32) -> StoreResult<()>;

    async fn set_box_count(&self, id: EntityId, count: i32) -> StoreResult<()>;

    /// Remove every image together with all points and boxes.
    async fn clear(&self) -> StoreResult<()>;
}

#[async_trait]
pub trait PointStore: Send + Sync {
    /// All points, or only those of one image.
    async fn filter(&self, image_id: Option<EntityId>) -> StoreResult<Vec<Point>>;

    /// Bulk insert.
    async fn load(&self, points: &[Point]) -> StoreResult<()>;

    /// Delete every point of one image.
    async fn delete(&self, image_id: EntityId) -> StoreResult<()>;

    async fn clear(&self) -> StoreResult<()>;
}

#[async_trait]
pub trait BoxStore: Send + Sync {
    async fn filter(&self, image_id: Option<EntityId>) -> StoreResult<Vec<BoundingBox>>;

    async fn load(&self, boxes: &[BoundingBox]) -> StoreResult<()>;

    async fn delete(&self, image_id: EntityId) -> StoreResult<()>;

    async fn clear(&self) -> StoreResult<()>;
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[async_trait]
pub trait Store: Send + Sync {
    fn images(&self) -> &dyn ImageStore;

    fn points(&self) -> &dyn PointStore;

    fn boxes(&self) -> &dyn BoxStore;

    /// Remove an image, then its points, then its boxes.
    async fn delete_image_cascade(&self, id: EntityId) -> StoreResult<()> {
        self.images().delete(id).await?;
        self.points().delete(id).await?;
        self.boxes().delete(id).await
    }

    /// Swap the full point set of an image and refresh its point count.
    ///
    /// Points must already carry `image_id`.
    async fn replace_points(&self, image_id: EntityId, points: Vec<Point>) -> StoreResult<()> {
        self.points().delete(image_id).await?;
        self.points().load(&points).await?;
        self.images()
            .set_point_count(image_id, points.len() as i32)
            .await
    }

    /// Swap the full box set of an image and refresh its box count.
    async fn replace_boxes(
        &self,
        image_id: EntityId,
        boxes: Vec<BoundingBox>,
    ) -> StoreResult<()> {
        self.boxes().delete(image_id).await?;
        self.boxes().load(&boxes).await?;
        self.images()
            .set_box_count(image_id, boxes.len() as i32)
            .await
    }
}
