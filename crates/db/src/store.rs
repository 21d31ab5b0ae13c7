//! PostgreSQL implementation of the core [`Store`] traits.
//!
//! Per-collection primitives run one statement each against the pool. The
//! composite operations are overridden to run inside a single transaction,
//! so a cascade delete or a replace-all either fully applies or leaves the
//! previous rows in place.

use async_trait::async_trait;
use charpoints_core::bbox::BoundingBox;
use charpoints_core::image::{Image, ImageFilter};
use charpoints_core::point::Point;
use charpoints_core::store::{BoxStore, ImageStore, PointStore, Store, StoreError, StoreResult};
use charpoints_core::types::EntityId;
use sqlx::error::ErrorKind;

use crate::repositories::{BoxRepo, ImageRepo, PointRepo};
use crate::DbPool;

/// Map a sqlx failure onto the store's opaque error.
///
/// Integrity violations become [`StoreError::Constraint`]; anything else is
/// passed through as a backend error.
pub fn store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if matches!(
            db.kind(),
            ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::CheckViolation
                | ErrorKind::NotNullViolation
        ) {
            return StoreError::Constraint(db.message().to_string());
        }
    }
    StoreError::backend(err)
}

fn missing_image(id: EntityId) -> StoreError {
    StoreError::Constraint(format!("image {id} does not exist"))
}

fn count(len: usize) -> StoreResult<i32> {
    i32::try_from(len).map_err(|_| StoreError::Constraint(format!("too many rows: {len}")))
}

// ---------------------------------------------------------------------------
// PgStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
    images: PgImages,
    points: PgPoints,
    boxes: PgBoxes,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self {
            images: PgImages(pool.clone()),
            points: PgPoints(pool.clone()),
            boxes: PgBoxes(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    fn images(&self) -> &dyn ImageStore {
        &self.images
    }

    fn points(&self) -> &dyn PointStore {
        &self.points
    }

    fn boxes(&self) -> &dyn BoxStore {
        &self.boxes
    }

    async fn delete_image_cascade(&self, id: EntityId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        ImageRepo::delete(&mut *tx, id).await.map_err(store_error)?;
        let points = PointRepo::delete_for_image(&mut *tx, id)
            .await
            .map_err(store_error)?;
        let boxes = BoxRepo::delete_for_image(&mut *tx, id)
            .await
            .map_err(store_error)?;

        tx.commit().await.map_err(store_error)?;
        tracing::debug!(image_id = %id, points, boxes, "Image cascade committed");
        Ok(())
    }

    async fn replace_points(&self, image_id: EntityId, points: Vec<Point>) -> StoreResult<()> {
        let total = count(points.len())?;
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        let removed = PointRepo::delete_for_image(&mut *tx, image_id)
            .await
            .map_err(store_error)?;
        PointRepo::insert_many(&mut *tx, &points)
            .await
            .map_err(store_error)?;
        if !ImageRepo::set_point_count(&mut *tx, image_id, total)
            .await
            .map_err(store_error)?
        {
            return Err(missing_image(image_id));
        }

        tx.commit().await.map_err(store_error)?;
        tracing::debug!(image_id = %image_id, removed, inserted = total, "Point set replaced");
        Ok(())
    }

    async fn replace_boxes(
        &self,
        image_id: EntityId,
        boxes: Vec<BoundingBox>,
    ) -> StoreResult<()> {
        let total = count(boxes.len())?;
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        let removed = BoxRepo::delete_for_image(&mut *tx, image_id)
            .await
            .map_err(store_error)?;
        BoxRepo::insert_many(&mut *tx, &boxes)
            .await
            .map_err(store_error)?;
        if !ImageRepo::set_box_count(&mut *tx, image_id, total)
            .await
            .map_err(store_error)?
        {
            return Err(missing_image(image_id));
        }

        tx.commit().await.map_err(store_error)?;
        tracing::debug!(image_id = %image_id, removed, inserted = total, "Box set replaced");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PgImages(DbPool);

#[async_trait]
impl ImageStore for PgImages {
    async fn find(&self, id: EntityId, with_data: bool) -> StoreResult<Option<Image>> {
        ImageRepo::find_by_id(&self.0, id, with_data)
            .await
            .map_err(store_error)?
            .map(Image::try_from)
            .transpose()
    }

    async fn filter(&self, filter: &ImageFilter) -> StoreResult<Vec<Image>> {
        ImageRepo::list(&self.0, filter)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(Image::try_from)
            .collect()
    }

    async fn has(&self, id: EntityId) -> StoreResult<bool> {
        ImageRepo::exists(&self.0, id).await.map_err(store_error)
    }

    async fn insert(&self, image: &Image) -> StoreResult<()> {
        ImageRepo::insert(&self.0, image).await.map_err(store_error)
    }

    async fn update(&self, image: &Image) -> StoreResult<()> {
        if !ImageRepo::update(&self.0, image).await.map_err(store_error)? {
            return Err(missing_image(image.id));
        }
        Ok(())
    }

    async fn replace(&self, image: &Image) -> StoreResult<()> {
        ImageRepo::upsert(&self.0, image).await.map_err(store_error)
    }

    async fn delete(&self, id: EntityId) -> StoreResult<()> {
        ImageRepo::delete(&self.0, id).await.map_err(store_error)?;
        Ok(())
    }

    async fn set_point_count(&self, id: EntityId, count: i32) -> StoreResult<()> {
        if !ImageRepo::set_point_count(&self.0, id, count)
            .await
            .map_err(store_error)?
        {
            return Err(missing_image(id));
        }
        Ok(())
    }

    async fn set_box_count(&self, id: EntityId, count: i32) -> StoreResult<()> {
        if !ImageRepo::set_box_count(&self.0, id, count)
            .await
            .map_err(store_error)?
        {
            return Err(missing_image(id));
        }
        Ok(())
    }

    async fn clear(&self) -> StoreResult<()> {
        let mut tx = self.0.begin().await.map_err(store_error)?;
        let points = PointRepo::delete_all(&mut *tx).await.map_err(store_error)?;
        let boxes = BoxRepo::delete_all(&mut *tx).await.map_err(store_error)?;
        let images = ImageRepo::delete_all(&mut *tx).await.map_err(store_error)?;
        tx.commit().await.map_err(store_error)?;
        tracing::debug!(images, points, boxes, "Image tables cleared");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PgPoints(DbPool);

#[async_trait]
impl PointStore for PgPoints {
    async fn filter(&self, image_id: Option<EntityId>) -> StoreResult<Vec<Point>> {
        let rows = PointRepo::list(&self.0, image_id)
            .await
            .map_err(store_error)?;
        Ok(rows.into_iter().map(Point::from).collect())
    }

    async fn load(&self, points: &[Point]) -> StoreResult<()> {
        PointRepo::insert_many(&self.0, points)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn delete(&self, image_id: EntityId) -> StoreResult<()> {
        PointRepo::delete_for_image(&self.0, image_id)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn clear(&self) -> StoreResult<()> {
        PointRepo::delete_all(&self.0).await.map_err(store_error)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PgBoxes(DbPool);

#[async_trait]
impl BoxStore for PgBoxes {
    async fn filter(&self, image_id: Option<EntityId>) -> StoreResult<Vec<BoundingBox>> {
        let rows = BoxRepo::list(&self.0, image_id)
            .await
            .map_err(store_error)?;
        Ok(rows.into_iter().map(BoundingBox::from).collect())
    }

    async fn load(&self, boxes: &[BoundingBox]) -> StoreResult<()> {
        BoxRepo::insert_many(&self.0, boxes)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn delete(&self, image_id: EntityId) -> StoreResult<()> {
        BoxRepo::delete_for_image(&self.0, image_id)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn clear(&self) -> StoreResult<()> {
        BoxRepo::delete_all(&self.0).await.map_err(store_error)?;
        Ok(())
    }
}
