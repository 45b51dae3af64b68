//! Repository for the shared `colors` palette.

use logit_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::color::Color;

/// Read access to the color palette.
pub struct ColorRepo;

impl ColorRepo {
    /// List the whole palette ordered by id.
    pub async fn list(pool: &PgPool) -> Result<Vec<Color>, sqlx::Error> {
        sqlx::query_as::<_, Color>("SELECT id, color FROM colors ORDER BY id ASC")
            .fetch_all(pool)
            .await
    }

    /// First palette color (by id) not referenced by any of the user's categories.
    pub async fn find_unassigned_for_user(
        conn: &mut PgConnection,
        user_id: DbId,
    ) -> Result<Option<Color>, sqlx::Error> {
        sqlx::query_as::<_, Color>(
            "SELECT col.id, col.color FROM colors col
             WHERE NOT EXISTS (
                 SELECT 1 FROM categories c
                 WHERE c.color_id = col.id AND c.user_id = $1
             )
             ORDER BY col.id ASC
             LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(conn)
        .await
    }

    /// All palette ids, for random selection once every color is in use.
    pub async fn list_ids(conn: &mut PgConnection) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as("SELECT id FROM colors ORDER BY id ASC")
            .fetch_all(conn)
            .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
