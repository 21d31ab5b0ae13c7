//! Repository for the `points` table.

use charpoints_core::point::Point;
use charpoints_core::types::EntityId;
use sqlx::PgExecutor;

use crate::models::point::PointRow;

const COLUMNS: &str = "id, x, y, image_id, label";

pub struct PointRepo;

impl PointRepo {
    /// All points, or only those of one image.
    pub async fn list<'e, E: PgExecutor<'e>>(
        executor: E,
        image_id: Option<EntityId>,
    ) -> Result<Vec<PointRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM points \
             WHERE ($1::UUID IS NULL OR image_id = $1) \
             ORDER BY image_id, id"
        );
        sqlx::query_as::<_, PointRow>(&query)
            .bind(image_id)
            .fetch_all(executor)
            .await
    }

    /// Bulk insert in one statement.
    pub async fn insert_many<'e, E: PgExecutor<'e>>(
        executor: E,
        points: &[Point],
    ) -> Result<u64, sqlx::Error> {
        if points.is_empty() {
            return Ok(0);
        }
        let ids: Vec<EntityId> = points.iter().map(|p| p.id).collect();
        let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
        let image_ids: Vec<EntityId> = points.iter().map(|p| p.image_id).collect();
        let labels: Vec<Option<String>> = points.iter().map(|p| p.label.clone()).collect();

        let result = sqlx::query(
            "INSERT INTO points (id, x, y, image_id, label) \
             SELECT * FROM UNNEST($1::UUID[], $2::FLOAT8[], $3::FLOAT8[], $4::UUID[], $5::TEXT[])",
        )
        .bind(ids)
        .bind(xs)
        .bind(ys)
        .bind(image_ids)
        .bind(labels)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_for_image<'e, E: PgExecutor<'e>>(
        executor: E,
        image_id: EntityId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM points WHERE image_id = $1")
            .bind(image_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_all<'e, E: PgExecutor<'e>>(executor: E) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM points").execute(executor).await?;
        Ok(result.rows_affected())
    }
}
