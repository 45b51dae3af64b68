//! Repository for the `categories` table and the category resolution engine.

use logit_core::category::{choose_color, ColorChoice, DEFAULT_CATEGORY_COLOR, DEFAULT_CATEGORY_NAME};
use logit_core::types::{new_public_id, DbId};
use sqlx::{PgConnection, PgPool};

use crate::models::category::{Category, CreateCategory};
use crate::repositories::ColorRepo;

/// Column list for category queries; `c` is `categories`, `col` its palette row.
const COLUMNS: &str = "c.numeric_id, c.id, c.user_id, c.name, c.color, c.color_id, \
                       col.color AS palette_color, c.created_at";

/// Provides lookup, creation and get-or-create resolution of categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// List the user's own categories ordered by name.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM categories c
             LEFT JOIN colors col ON col.id = c.color_id
             WHERE c.user_id = $1
             ORDER BY c.name ASC"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Find the user's own category with the exact `name`.
    pub async fn find_for_user(
        conn: &mut PgConnection,
        user_id: DbId,
        name: &str,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM categories c
             LEFT JOIN colors col ON col.id = c.color_id
             WHERE c.user_id = $1 AND c.name = $2"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(user_id)
            .bind(name)
            .fetch_optional(conn)
            .await
    }

    /// Find a global (`user_id IS NULL`) category by name.
    pub async fn find_global(
        conn: &mut PgConnection,
        name: &str,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM categories c
             LEFT JOIN colors col ON col.id = c.color_id
             WHERE c.user_id IS NULL AND c.name = $1"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(name)
            .fetch_optional(conn)
            .await
    }

    /// Insert a user-scoped category.
    ///
    /// Returns `None` when the user already has a category with that name
    /// (including one committed concurrently); the caller re-reads it.
    pub async fn create_for_user(
        conn: &mut PgConnection,
        input: &CreateCategory,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "WITH c AS (
                INSERT INTO categories (id, user_id, name, color, color_id)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (user_id, name) WHERE user_id IS NOT NULL DO NOTHING
                RETURNING *
             )
             SELECT {COLUMNS} FROM c
             LEFT JOIN colors col ON col.id = c.color_id"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(new_public_id())
            .bind(input.user_id)
            .bind(&input.name)
            .bind(input.color.inline_color())
            .bind(input.color.color_id())
            .fetch_optional(conn)
            .await
    }

    /// Get the user's category named `name`, creating it with `color` if absent.
    pub async fn get_or_create(
        conn: &mut PgConnection,
        user_id: DbId,
        name: &str,
        color: ColorChoice,
    ) -> Result<Option<Category>, sqlx::Error> {
        let input = CreateCategory {
            user_id,
            name: name.to_string(),
            color,
        };
        if let Some(created) = Self::create_for_user(&mut *conn, &input).await? {
            tracing::info!(
                user_id,
                category_id = %created.id,
                name = %created.name,
                "Created category"
            );
            return Ok(Some(created));
        }
        Self::find_for_user(conn, user_id, name).await
    }

    /// Resolve the category a new note belongs to.
    ///
    /// 1. A named category the user already owns is reused.
    /// 2. Otherwise it is created for the user with a palette color the user
    ///    has not used yet, else a random palette color, else the default color.
    /// 3. Without a name (or if nothing resolved) the user's "Uncategorized"
    ///    is used, then the global one, and finally a user-scoped
    ///    "Uncategorized" is created.
    ///
    /// Takes [`lock_user`](Self::lock_user), so it must run inside a
    /// transaction; concurrent resolutions for one user then see each
    /// other's palette picks.
    pub async fn resolve_for_note(
        conn: &mut PgConnection,
        user_id: DbId,
        name: Option<&str>,
    ) -> Result<Category, sqlx::Error> {
        Self::lock_user(&mut *conn, user_id).await?;

        if let Some(name) = name {
            if let Some(existing) = Self::find_for_user(&mut *conn, user_id, name).await? {
                return Ok(existing);
            }

            let color = Self::pick_color(&mut *conn, user_id).await?;
            if let Some(category) = Self::get_or_create(&mut *conn, user_id, name, color).await? {
                return Ok(category);
            }
        }

        Self::resolve_default(conn, user_id).await
    }

    /// Serialize category creation for one user until the surrounding
    /// transaction ends.
    pub async fn lock_user(conn: &mut PgConnection, user_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended('categories:' || $1::text, 0))")
            .bind(user_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Default-category chain: user's own, then global, then create.
    pub async fn resolve_default(
        conn: &mut PgConnection,
        user_id: DbId,
    ) -> Result<Category, sqlx::Error> {
        if let Some(own) = Self::find_for_user(&mut *conn, user_id, DEFAULT_CATEGORY_NAME).await? {
            return Ok(own);
        }
        if let Some(global) = Self::find_global(&mut *conn, DEFAULT_CATEGORY_NAME).await? {
            return Ok(global);
        }
        Self::get_or_create(
            conn,
            user_id,
            DEFAULT_CATEGORY_NAME,
            ColorChoice::Inline(DEFAULT_CATEGORY_COLOR.to_string()),
        )
        .await?
        .ok_or(sqlx::Error::RowNotFound)
    }

    async fn pick_color(conn: &mut PgConnection, user_id: DbId) -> Result<ColorChoice, sqlx::Error> {
        let unassigned = ColorRepo::find_unassigned_for_user(&mut *conn, user_id)
            .await?
            .map(|c| c.id);
        let palette = match unassigned {
            Some(_) => Vec::new(),
            None => ColorRepo::list_ids(conn).await?,
        };
        let mut rng = rand::rng();
        Ok(choose_color(unassigned, &palette, &mut rng))
    }
}
