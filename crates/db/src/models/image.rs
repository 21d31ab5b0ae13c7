use charpoints_core::image::{Image, ImageState};
use charpoints_core::store::StoreError;
use charpoints_core::types::{EntityId, Timestamp};
use sqlx::FromRow;

/// A row from the `images` table. `data` is `NULL` when selected without
/// the payload.
#[derive(Debug, Clone, FromRow)]
pub struct ImageRow {
    pub id: EntityId,
    pub name: String,
    pub data: Option<String>,
    pub state: String,
    pub weight: f64,
    pub box_count: i32,
    pub point_count: i32,
    pub loss: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<ImageRow> for Image {
    type Error = StoreError;

    fn try_from(row: ImageRow) -> Result<Self, Self::Error> {
        let state = ImageState::from_str(&row.state)
            .map_err(|e| StoreError::Constraint(e.to_string()))?;
        Ok(Image {
            id: row.id,
            name: row.name,
            data: row.data,
            state,
            weight: row.weight,
            box_count: row.box_count,
            point_count: row.point_count,
            loss: row.loss,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
