//! Cart Repository

use super::{RepoError, RepoResult};
use shared::models::{Cart, CartItem, CartLine};
use sqlx::{Sqlite, SqliteConnection, SqlitePool};

pub async fn find_by_user<'e, E>(executor: E, user_id: i64) -> RepoResult<Option<Cart>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let cart = sqlx::query_as::<_, Cart>(
        "SELECT id, user_id, created_at, updated_at FROM carts WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await?;
    Ok(cart)
}

/// Get the user's cart, creating it on first use
pub async fn ensure_cart(pool: &SqlitePool, user_id: i64) -> RepoResult<Cart> {
    let now = shared::util::now_millis();
    // INSERT OR IGNORE: user_id is unique
    sqlx::query(
        "INSERT OR IGNORE INTO carts (id, user_id, created_at, updated_at) VALUES (?, ?, ?, ?)",
    )
    .bind(shared::util::snowflake_id())
    .bind(user_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_user(pool, user_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create cart".into()))
}

/// Bump `updated_at` on the user's cart; returns rows affected
///
/// Inside a transaction this is the first write, so it takes the database
/// write lock before anything else is read.
pub async fn touch(conn: &mut SqliteConnection, user_id: i64, now: i64) -> RepoResult<u64> {
    let result = sqlx::query("UPDATE carts SET updated_at = ? WHERE user_id = ?")
        .bind(now)
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Lines with their current product data, oldest first
pub async fn find_lines<'e, E>(executor: E, cart_id: i64) -> RepoResult<Vec<CartLine>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let lines = sqlx::query_as::<_, CartLine>(
        "SELECT ci.id, ci.product_id, ci.quantity, p.name AS product_name, p.price, p.stock, p.image_url FROM cart_items ci JOIN products p ON p.id = ci.product_id WHERE ci.cart_id = ? ORDER BY ci.created_at, ci.id",
    )
    .bind(cart_id)
    .fetch_all(executor)
    .await?;
    Ok(lines)
}

pub async fn find_item(
    pool: &SqlitePool,
    cart_id: i64,
    product_id: i64,
) -> RepoResult<Option<CartItem>> {
    let item = sqlx::query_as::<_, CartItem>(
        "SELECT id, cart_id, product_id, quantity, created_at, updated_at FROM cart_items WHERE cart_id = ? AND product_id = ?",
    )
    .bind(cart_id)
    .bind(product_id)
    .fetch_optional(pool)
    .await?;
    Ok(item)
}

/// Insert the line or overwrite its quantity
pub async fn set_quantity(
    pool: &SqlitePool,
    cart_id: i64,
    product_id: i64,
    quantity: i64,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO cart_items (id, cart_id, product_id, quantity, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?) ON CONFLICT(cart_id, product_id) DO UPDATE SET quantity = excluded.quantity, updated_at = excluded.updated_at",
    )
    .bind(shared::util::snowflake_id())
    .bind(cart_id)
    .bind(product_id)
    .bind(quantity)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    sqlx::query("UPDATE carts SET updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(cart_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn remove_item(pool: &SqlitePool, cart_id: i64, product_id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = ? AND product_id = ?")
        .bind(cart_id)
        .bind(product_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Remove every line; returns how many were removed
pub async fn clear<'e, E>(executor: E, cart_id: i64) -> RepoResult<u64>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = ?")
        .bind(cart_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[tokio::test]
    async fn test_ensure_cart_is_idempotent() {
        let db = testing::TestDb::new().await;
        let user = db.seed_user("malee").await;

        let first = ensure_cart(&db.pool, user.id).await.unwrap();
        let second = ensure_cart(&db.pool, user.id).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_set_quantity_upserts() {
        let db = testing::TestDb::new().await;
        let user = db.seed_user("malee").await;
        let rice = db.seed_product("Jasmine rice", 18000, 10).await;
        let cart = ensure_cart(&db.pool, user.id).await.unwrap();

        set_quantity(&db.pool, cart.id, rice.id, 2).await.unwrap();
        set_quantity(&db.pool, cart.id, rice.id, 5).await.unwrap();

        let lines = find_lines(&db.pool, cart.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 5);
        assert_eq!(lines[0].product_name, "Jasmine rice");
        assert_eq!(lines[0].price, 18000);
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let db = testing::TestDb::new().await;
        let user = db.seed_user("malee").await;
        let rice = db.seed_product("Rice", 100, 10).await;
        let egg = db.seed_product("Egg", 50, 10).await;
        let cart = ensure_cart(&db.pool, user.id).await.unwrap();
        set_quantity(&db.pool, cart.id, rice.id, 1).await.unwrap();
        set_quantity(&db.pool, cart.id, egg.id, 1).await.unwrap();

        assert!(remove_item(&db.pool, cart.id, rice.id).await.unwrap());
        assert!(!remove_item(&db.pool, cart.id, rice.id).await.unwrap());
        assert_eq!(clear(&db.pool, cart.id).await.unwrap(), 1);
        assert!(find_lines(&db.pool, cart.id).await.unwrap().is_empty());
    }
}
