//! Repository for the `images` table.

use charpoints_core::image::{Image, ImageFilter};
use charpoints_core::types::EntityId;
use sqlx::PgExecutor;

use crate::models::image::ImageRow;

/// Column list for `images` queries, payload included.
const COLUMNS: &str = "\
    id, name, data, state, weight, box_count, point_count, loss, \
    created_at, updated_at";

/// Column list for `images` queries with the payload left out.
const COLUMNS_NO_DATA: &str = "\
    id, name, NULL::TEXT AS data, state, weight, box_count, point_count, loss, \
    created_at, updated_at";

pub struct ImageRepo;

impl ImageRepo {
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: EntityId,
        with_data: bool,
    ) -> Result<Option<ImageRow>, sqlx::Error> {
        let columns = if with_data { COLUMNS } else { COLUMNS_NO_DATA };
        let query = format!("SELECT {columns} FROM images WHERE id = $1");
        sqlx::query_as::<_, ImageRow>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List images matching `filter`, oldest first, without payloads.
    pub async fn list<'e, E: PgExecutor<'e>>(
        executor: E,
        filter: &ImageFilter,
    ) -> Result<Vec<ImageRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS_NO_DATA} FROM images \
             WHERE ($1::UUID[] IS NULL OR id = ANY($1)) \
               AND ($2::TEXT IS NULL OR state = $2) \
               AND ($3::BOOLEAN IS NULL OR (box_count > 0) = $3) \
               AND ($4::BOOLEAN IS NULL OR (point_count > 0) = $4) \
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, ImageRow>(&query)
            .bind(filter.ids.clone())
            .bind(filter.state.map(|s| s.as_str()))
            .bind(filter.has_box)
            .bind(filter.has_point)
            .fetch_all(executor)
            .await
    }

    pub async fn exists<'e, E: PgExecutor<'e>>(
        executor: E,
        id: EntityId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM images WHERE id = $1)")
            .bind(id)
            .fetch_one(executor)
            .await
    }

    pub async fn insert<'e, E: PgExecutor<'e>>(
        executor: E,
        image: &Image,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO images \
             (id, name, data, state, weight, box_count, point_count, loss, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(image.id)
        .bind(&image.name)
        .bind(&image.data)
        .bind(image.state.as_str())
        .bind(image.weight)
        .bind(image.box_count)
        .bind(image.point_count)
        .bind(image.loss)
        .bind(image.created_at)
        .bind(image.updated_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Overwrite the mutable columns. Returns `true` if the row existed.
    ///
    /// `data` is only written when present so a record fetched without its
    /// payload never blanks the stored one.
    pub async fn update<'e, E: PgExecutor<'e>>(
        executor: E,
        image: &Image,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE images SET \
                name = $2, \
                data = COALESCE($3, data), \
                state = $4, \
                weight = $5, \
                box_count = $6, \
                point_count = $7, \
                loss = $8, \
                updated_at = $9 \
             WHERE id = $1",
        )
        .bind(image.id)
        .bind(&image.name)
        .bind(&image.data)
        .bind(image.state.as_str())
        .bind(image.weight)
        .bind(image.box_count)
        .bind(image.point_count)
        .bind(image.loss)
        .bind(image.updated_at)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert, or overwrite every column of an existing row.
    pub async fn upsert<'e, E: PgExecutor<'e>>(
        executor: E,
        image: &Image,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO images \
             (id, name, data, state, weight, box_count, point_count, loss, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (id) DO UPDATE SET \
                name = EXCLUDED.name, \
                data = EXCLUDED.data, \
                state = EXCLUDED.state, \
                weight = EXCLUDED.weight, \
                box_count = EXCLUDED.box_count, \
                point_count = EXCLUDED.point_count, \
                loss = EXCLUDED.loss, \
                updated_at = EXCLUDED.updated_at",
        )
        .bind(image.id)
        .bind(&image.name)
        .bind(&image.data)
        .bind(image.state.as_str())
        .bind(image.weight)
        .bind(image.box_count)
        .bind(image.point_count)
        .bind(image.loss)
        .bind(image.created_at)
        .bind(image.updated_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn delete<'e, E: PgExecutor<'e>>(
        executor: E,
        id: EntityId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns `true` if the row existed.
    pub async fn set_point_count<'e, E: PgExecutor<'e>>(
        executor: E,
        id: EntityId,
        count: i32,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE images SET point_count = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(count)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns `true` if the row existed.
    pub async fn set_box_count<'e, E: PgExecutor<'e>>(
        executor: E,
        id: EntityId,
        count: i32,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE images SET box_count = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(count)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_all<'e, E: PgExecutor<'e>>(executor: E) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM images").execute(executor).await?;
        Ok(result.rows_affected())
    }
}
