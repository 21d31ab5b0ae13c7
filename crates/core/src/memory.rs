//! In-process [`Store`] backed by hash maps.
//!
//! All three collections share one `RwLock`, so the composite store
//! operations are overridden here to run under a single write guard and are
//! atomic with respect to each other.
//!
//! Row sets are checked before anything is written, mirroring the Postgres
//! keys: an id may appear once, must not belong to another image, and must
//! reference an existing image. A rejected set leaves every table as it was.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::bbox::BoundingBox;
use crate::image::{Image, ImageFilter};
use crate::point::Point;
use crate::store::{BoxStore, ImageStore, PointStore, Store, StoreError, StoreResult};
use crate::types::EntityId;

#[derive(Debug, Default)]
struct Tables {
    images: HashMap<EntityId, Image>,
    points: HashMap<EntityId, Point>,
    boxes: HashMap<EntityId, BoundingBox>,
}

type Shared = Arc<RwLock<Tables>>;

/// Hash-map store. Cheap to clone; clones see the same data.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    images: MemoryImages,
    points: MemoryPoints,
    boxes: MemoryBoxes,
    tables: Shared,
}

impl MemoryStore {
    pub fn new() -> Self {
        let tables: Shared = Arc::default();
        Self {
            images: MemoryImages(Arc::clone(&tables)),
            points: MemoryPoints(Arc::clone(&tables)),
            boxes: MemoryBoxes(Arc::clone(&tables)),
            tables,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
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
        let mut tables = self.tables.write().await;
        tables.images.remove(&id);
        tables.points.retain(|_, p| p.image_id != id);
        tables.boxes.retain(|_, b| b.image_id != id);
        Ok(())
    }

    async fn replace_points(&self, image_id: EntityId, points: Vec<Point>) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        check_rows(&tables.images, &tables.points, &points, Some(image_id))?;
        let count = points.len() as i32;
        let image = tables
            .images
            .get_mut(&image_id)
            .ok_or_else(|| missing_image(image_id))?;
        image.point_count = count;
        tables.points.retain(|_, p| p.image_id != image_id);
        tables
            .points
            .extend(points.into_iter().map(|p| (p.id, p)));
        Ok(())
    }

    async fn replace_boxes(
        &self,
        image_id: EntityId,
        boxes: Vec<BoundingBox>,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        check_rows(&tables.images, &tables.boxes, &boxes, Some(image_id))?;
        let count = boxes.len() as i32;
        let image = tables
            .images
            .get_mut(&image_id)
            .ok_or_else(|| missing_image(image_id))?;
        image.box_count = count;
        tables.boxes.retain(|_, b| b.image_id != image_id);
        tables.boxes.extend(boxes.into_iter().map(|b| (b.id, b)));
        Ok(())
    }
}

fn missing_image(id: EntityId) -> StoreError {
    StoreError::Constraint(format!("image {id} does not exist"))
}

/// A row owned by one image.
trait ImageRow {
    fn id(&self) -> EntityId;
    fn image_id(&self) -> EntityId;
}

impl ImageRow for Point {
    fn id(&self) -> EntityId {
        self.id
    }

    fn image_id(&self) -> EntityId {
        self.image_id
    }
}

impl ImageRow for BoundingBox {
    fn id(&self) -> EntityId {
        self.id
    }

    fn image_id(&self) -> EntityId {
        self.image_id
    }
}

/// Reject `rows` if inserting them into `table` would break a key.
///
/// With `replacing` set, rows currently owned by that image are about to be
/// deleted, so reusing their ids is allowed.
fn check_rows<T: ImageRow>(
    images: &HashMap<EntityId, Image>,
    table: &HashMap<EntityId, T>,
    rows: &[T],
    replacing: Option<EntityId>,
) -> StoreResult<()> {
    let mut seen = HashSet::with_capacity(rows.len());
    for row in rows {
        let id = row.id();
        if !seen.insert(id) {
            return Err(StoreError::Constraint(format!("duplicate id {id} in set")));
        }
        if !images.contains_key(&row.image_id()) {
            return Err(missing_image(row.image_id()));
        }
        if let Some(existing) = table.get(&id) {
            if Some(existing.image_id()) != replacing {
                return Err(StoreError::Constraint(format!(
                    "id {id} already belongs to image {}",
                    existing.image_id()
                )));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MemoryImages(Shared);

#[async_trait]
impl ImageStore for MemoryImages {
    async fn find(&self, id: EntityId, with_data: bool) -> StoreResult<Option<Image>> {
        let tables = self.0.read().await;
        Ok(tables.images.get(&id).map(|image| {
            let mut image = image.clone();
            if !with_data {
                image.data = None;
            }
            image
        }))
    }

    async fn filter(&self, filter: &ImageFilter) -> StoreResult<Vec<Image>> {
        let tables = self.0.read().await;
        let mut rows: Vec<Image> = tables
            .images
            .values()
            .filter(|image| filter.matches(image))
            .map(|image| Image {
                data: None,
                ..image.clone()
            })
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }

    async fn has(&self, id: EntityId) -> StoreResult<bool> {
        Ok(self.0.read().await.images.contains_key(&id))
    }

    async fn insert(&self, image: &Image) -> StoreResult<()> {
        let mut tables = self.0.write().await;
        if tables.images.contains_key(&image.id) {
            return Err(StoreError::Constraint(format!(
                "duplicate image id {}",
                image.id
            )));
        }
        tables.images.insert(image.id, image.clone());
        Ok(())
    }

    async fn update(&self, image: &Image) -> StoreResult<()> {
        let mut tables = self.0.write().await;
        let row = tables
            .images
            .get_mut(&image.id)
            .ok_or_else(|| missing_image(image.id))?;
        *row = image.clone();
        Ok(())
    }

    async fn replace(&self, image: &Image) -> StoreResult<()> {
        self.0.write().await.images.insert(image.id, image.clone());
        Ok(())
    }

    async fn delete(&self, id: EntityId) -> StoreResult<()> {
        self.0.write().await.images.remove(&id);
        Ok(())
    }

    async fn set_point_count(&self, id: EntityId, count: i32) -> StoreResult<()> {
        let mut tables = self.0.write().await;
        let row = tables.images.get_mut(&id).ok_or_else(|| missing_image(id))?;
        row.point_count = count;
        Ok(())
    }

    async fn set_box_count(&self, id: EntityId, count: i32) -> StoreResult<()> {
        let mut tables = self.0.write().await;
        let row = tables.images.get_mut(&id).ok_or_else(|| missing_image(id))?;
        row.box_count = count;
        Ok(())
    }

    async fn clear(&self) -> StoreResult<()> {
        let mut tables = self.0.write().await;
        tables.points.clear();
        tables.boxes.clear();
        tables.images.clear();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Points
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MemoryPoints(Shared);

#[async_trait]
impl PointStore for MemoryPoints {
    async fn filter(&self, image_id: Option<EntityId>) -> StoreResult<Vec<Point>> {
        let tables = self.0.read().await;
        Ok(tables
            .points
            .values()
            .filter(|p| image_id.is_none_or(|id| p.image_id == id))
            .cloned()
            .collect())
    }

    async fn load(&self, points: &[Point]) -> StoreResult<()> {
        let mut tables = self.0.write().await;
        check_rows(&tables.images, &tables.points, points, None)?;
        tables
            .points
            .extend(points.iter().map(|p| (p.id, p.clone())));
        Ok(())
    }

    async fn delete(&self, image_id: EntityId) -> StoreResult<()> {
        self.0
            .write()
            .await
            .points
            .retain(|_, p| p.image_id != image_id);
        Ok(())
    }

    async fn clear(&self) -> StoreResult<()> {
        self.0.write().await.points.clear();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Boxes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MemoryBoxes(Shared);

#[async_trait]
impl BoxStore for MemoryBoxes {
    async fn filter(&self, image_id: Option<EntityId>) -> StoreResult<Vec<BoundingBox>> {
        let tables = self.0.read().await;
        Ok(tables
            .boxes
            .values()
            .filter(|b| image_id.is_none_or(|id| b.image_id == id))
            .cloned()
            .collect())
    }

    async fn load(&self, boxes: &[BoundingBox]) -> StoreResult<()> {
        let mut tables = self.0.write().await;
        check_rows(&tables.images, &tables.boxes, boxes, None)?;
        tables.boxes.extend(boxes.iter().map(|b| (b.id, b.clone())));
        Ok(())
    }

    async fn delete(&self, image_id: EntityId) -> StoreResult<()> {
        self.0
            .write()
            .await
            .boxes
            .retain(|_, b| b.image_id != image_id);
        Ok(())
    }

    async fn clear(&self) -> StoreResult<()> {
        self.0.write().await.boxes.clear();
        Ok(())
    }
}
