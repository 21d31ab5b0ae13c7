use charpoints_core::bbox::BoundingBox;
use charpoints_core::types::EntityId;
use sqlx::FromRow;

/// A row from the `boxes` table.
#[derive(Debug, Clone, FromRow)]
pub struct BoxRow {
    pub id: EntityId,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub image_id: EntityId,
    pub label: Option<String>,
}

impl From<BoxRow> for BoundingBox {
    fn from(row: BoxRow) -> Self {
        BoundingBox {
            id: row.id,
            x0: row.x0,
            y0: row.y0,
            x1: row.x1,
            y1: row.y1,
            image_id: row.image_id,
            label: row.label,
        }
    }
}
