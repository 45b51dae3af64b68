//! Repository for the `users` table.

use logit_core::types::{new_public_id, DbId};
use sqlx::{PgConnection, PgPool};

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, public_id, first_name, last_name, email, password_hash, \
                        is_active, is_verified, last_login_at, created_at, updated_at";

/// Provides CRUD and lifecycle operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new pending (`is_active = false`) user, returning the created row.
    ///
    /// A concurrent registration of the same email fails with a unique
    /// violation on `uq_users_email`.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (public_id, first_name, last_name, email, password_hash)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(new_public_id())
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-sensitive, exact match as persisted).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Whether any user already holds `email`.
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(pool)
                .await?;
        Ok(exists)
    }

    /// Mark the account confirmed. Returns `false` if it was already active,
    /// in which case nothing is written.
    pub async fn activate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET is_active = true, is_verified = true \
             WHERE id = $1 AND is_active = false",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set `last_login_at` to now.
    pub async fn record_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Update a user's password hash. Returns `true` if the row was updated.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a user together with everything it owns: attachments of its
    /// notes, the notes, and its categories, in that order.
    ///
    /// Runs on the caller's connection so it can share a transaction. Returns
    /// `true` if the user row existed.
    pub async fn delete_cascade(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let attachments = sqlx::query(
            "DELETE FROM attachments WHERE note_id IN (SELECT id FROM notes WHERE user_id = $1)",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;

        let notes = sqlx::query("DELETE FROM notes WHERE user_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        let categories = sqlx::query("DELETE FROM categories WHERE user_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        let user = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        tracing::debug!(
            user_id = id,
            attachments = attachments.rows_affected(),
            notes = notes.rows_affected(),
            categories = categories.rows_affected(),
            "Deleted user and owned rows"
        );

        Ok(user.rows_affected() > 0)
    }
}
