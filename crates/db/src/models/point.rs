use charpoints_core::point::Point;
use charpoints_core::types::EntityId;
use sqlx::FromRow;

/// A row from the `points` table.
#[derive(Debug, Clone, FromRow)]
pub struct PointRow {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    pub image_id: EntityId,
    pub label: Option<String>,
}

impl From<PointRow> for Point {
    fn from(row: PointRow) -> Self {
        Point {
            id: row.id,
            x: row.x,
            y: row.y,
            image_id: row.image_id,
            label: row.label,
        }
    }
}
