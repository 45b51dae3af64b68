//! Integration tests for the category resolution engine.
//!
//! Verifies reuse of a user's named categories, palette color assignment,
//! the default-category chain and per-user isolation.

use std::collections::HashSet;

use logit_core::category::{ColorChoice, DEFAULT_CATEGORY_NAME};
use logit_db::models::user::{CreateUser, User};
use logit_db::repositories::{CategoryRepo, ColorRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &PgPool, email: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
        },
    )
    .await
    .unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_named_category_is_reused(pool: PgPool) {
    let user = seed_user(&pool, "reuse@example.com").await;
    let mut conn = pool.acquire().await.unwrap();

    let first = CategoryRepo::resolve_for_note(&mut conn, user.id, Some("Work"))
        .await
        .unwrap();
    let second = CategoryRepo::resolve_for_note(&mut conn, user.id, Some("Work"))
        .await
        .unwrap();

    assert_eq!(first.numeric_id, second.numeric_id);
    assert_eq!(first.user_id, Some(user.id));

    let all = CategoryRepo::list_for_user(&pool, user.id).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_new_categories_take_unused_palette_colors(pool: PgPool) {
    let user = seed_user(&pool, "palette@example.com").await;
    let mut conn = pool.acquire().await.unwrap();

    let work = CategoryRepo::resolve_for_note(&mut conn, user.id, Some("Work"))
        .await
        .unwrap();
    let home = CategoryRepo::resolve_for_note(&mut conn, user.id, Some("Home"))
        .await
        .unwrap();

    assert!(work.color_id.is_some());
    assert!(home.color_id.is_some());
    assert_ne!(work.color_id, home.color_id);
    assert_eq!(work.palette_color.as_deref(), Some(work.effective_color().as_str()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_parallel_creates_take_distinct_palette_colors(pool: PgPool) {
    let user = seed_user(&pool, "parallel@example.com").await;

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let pool = pool.clone();
            let user_id = user.id;
            tokio::spawn(async move {
                let mut tx = pool.begin().await.unwrap();
                let category =
                    CategoryRepo::resolve_for_note(&mut tx, user_id, Some(&format!("Cat{i}")))
                        .await
                        .unwrap();
                tx.commit().await.unwrap();
                category
            })
        })
        .collect();

    let color_ids: HashSet<i64> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|r| r.unwrap().color_id.expect("palette color expected"))
        .collect();
    assert_eq!(color_ids.len(), 6);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_exhausted_palette_falls_back_to_random_palette_color(pool: PgPool) {
    let user = seed_user(&pool, "exhausted@example.com").await;
    let palette: HashSet<i64> = ColorRepo::list(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    let mut conn = pool.acquire().await.unwrap();

    for i in 0..palette.len() {
        CategoryRepo::resolve_for_note(&mut conn, user.id, Some(&format!("Topic {i}")))
            .await
            .unwrap();
    }
    assert!(ColorRepo::find_unassigned_for_user(&mut conn, user.id)
        .await
        .unwrap()
        .is_none());

    let extra = CategoryRepo::resolve_for_note(&mut conn, user.id, Some("One more"))
        .await
        .unwrap();
    let color_id = extra.color_id.expect("palette color expected");
    assert!(palette.contains(&color_id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_palette_usage_is_per_user(pool: PgPool) {
    let alice = seed_user(&pool, "alice@example.com").await;
    let bob = seed_user(&pool, "bob@example.com").await;
    let mut conn = pool.acquire().await.unwrap();

    let a = CategoryRepo::resolve_for_note(&mut conn, alice.id, Some("Work"))
        .await
        .unwrap();
    let b = CategoryRepo::resolve_for_note(&mut conn, bob.id, Some("Work"))
        .await
        .unwrap();

    assert_ne!(a.numeric_id, b.numeric_id, "categories are per user");
    assert_eq!(a.color_id, b.color_id, "each user starts from the first palette color");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_name_uses_global_default(pool: PgPool) {
    let user = seed_user(&pool, "default@example.com").await;
    let mut conn = pool.acquire().await.unwrap();

    let category = CategoryRepo::resolve_for_note(&mut conn, user.id, None)
        .await
        .unwrap();

    assert!(category.is_global());
    assert_eq!(category.name, DEFAULT_CATEGORY_NAME);
    assert_eq!(category.effective_color(), "#FFFFFF");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_own_default_takes_precedence_over_global(pool: PgPool) {
    let user = seed_user(&pool, "own-default@example.com").await;
    let mut conn = pool.acquire().await.unwrap();

    let own = CategoryRepo::get_or_create(
        &mut conn,
        user.id,
        DEFAULT_CATEGORY_NAME,
        ColorChoice::Inline("#000000".to_string()),
    )
    .await
    .unwrap()
    .unwrap();

    let resolved = CategoryRepo::resolve_default(&mut conn, user.id).await.unwrap();
    assert_eq!(resolved.numeric_id, own.numeric_id);
    assert_eq!(resolved.effective_color(), "#000000");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_default_is_created_when_global_is_missing(pool: PgPool) {
    let user = seed_user(&pool, "no-global@example.com").await;
    sqlx::query("DELETE FROM categories WHERE user_id IS NULL")
        .execute(&pool)
        .await
        .unwrap();
    let mut conn = pool.acquire().await.unwrap();

    let created = CategoryRepo::resolve_default(&mut conn, user.id).await.unwrap();

    assert_eq!(created.user_id, Some(user.id));
    assert_eq!(created.name, DEFAULT_CATEGORY_NAME);
    assert_eq!(created.color.as_deref(), Some("#FFFFFF"));
    assert!(created.color_id.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_or_create_returns_existing_on_conflict(pool: PgPool) {
    let user = seed_user(&pool, "conflict@example.com").await;
    let mut conn = pool.acquire().await.unwrap();

    let first = CategoryRepo::get_or_create(
        &mut conn,
        user.id,
        "Ideas",
        ColorChoice::Inline("#123456".to_string()),
    )
    .await
    .unwrap()
    .unwrap();
    let second = CategoryRepo::get_or_create(
        &mut conn,
        user.id,
        "Ideas",
        ColorChoice::Inline("#654321".to_string()),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(first.numeric_id, second.numeric_id);
    assert_eq!(second.effective_color(), "#123456");
}
