//! Repository for the `boxes` table.

use charpoints_core::bbox::BoundingBox;
use charpoints_core::types::EntityId;
use sqlx::PgExecutor;

use crate::models::bbox::BoxRow;

const COLUMNS: &str = "id, x0, y0, x1, y1, image_id, label";

pub struct BoxRepo;

impl BoxRepo {
    pub async fn list<'e, E: PgExecutor<'e>>(
        executor: E,
        image_id: Option<EntityId>,
    ) -> Result<Vec<BoxRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM boxes \
             WHERE ($1::UUID IS NULL OR image_id = $1) \
             ORDER BY image_id, id"
        );
        sqlx::query_as::<_, BoxRow>(&query)
            .bind(image_id)
            .fetch_all(executor)
            .await
    }

    pub async fn insert_many<'e, E: PgExecutor<'e>>(
        executor: E,
        boxes: &[BoundingBox],
    ) -> Result<u64, sqlx::Error> {
        if boxes.is_empty() {
            return Ok(0);
        }
        let ids: Vec<EntityId> = boxes.iter().map(|b| b.id).collect();
        let x0s: Vec<f64> = boxes.iter().map(|b| b.x0).collect();
        let y0s: Vec<f64> = boxes.iter().map(|b| b.y0).collect();
        let x1s: Vec<f64> = boxes.iter().map(|b| b.x1).collect();
        let y1s: Vec<f64> = boxes.iter().map(|b| b.y1).collect();
        let image_ids: Vec<EntityId> = boxes.iter().map(|b| b.image_id).collect();
        let labels: Vec<Option<String>> = boxes.iter().map(|b| b.label.clone()).collect();

        let result = sqlx::query(
            "INSERT INTO boxes (id, x0, y0, x1, y1, image_id, label) \
             SELECT * FROM UNNEST( \
                $1::UUID[], $2::FLOAT8[], $3::FLOAT8[], $4::FLOAT8[], $5::FLOAT8[], \
                $6::UUID[], $7::TEXT[])",
        )
        .bind(ids)
        .bind(x0s)
        .bind(y0s)
        .bind(x1s)
        .bind(y1s)
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
        let result = sqlx::query("DELETE FROM boxes WHERE image_id = $1")
            .bind(image_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_all<'e, E: PgExecutor<'e>>(executor: E) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM boxes").execute(executor).await?;
        Ok(result.rows_affected())
    }
}
