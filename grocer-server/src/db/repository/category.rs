//! Category Repository

use super::{RepoError, RepoResult};
use shared::models::Category;
use sqlx::SqlitePool;

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Category>> {
    let rows = sqlx::query_as::<_, Category>(
        "SELECT id, name, created_at FROM categories ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Category>> {
    let row = sqlx::query_as::<_, Category>(
        "SELECT id, name, created_at FROM categories WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, name: &str) -> RepoResult<Category> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query("INSERT INTO categories (id, name, created_at) VALUES (?, ?, ?)")
        .bind(id)
        .bind(name)
        .bind(now)
        .execute(pool)
        .await
        .map_err(|e| match RepoError::from(e) {
            RepoError::Duplicate(_) => {
                RepoError::Duplicate(format!("Category '{name}' already exists"))
            }
            other => other,
        })?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create category".into()))
}

/// Products in the category keep existing with `category_id = NULL`
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::product;
    use crate::testing;

    #[tokio::test]
    async fn test_duplicate_name() {
        let db = testing::TestDb::new().await;
        create(&db.pool, "Fruit").await.unwrap();
        let err = create(&db.pool, "Fruit").await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(msg) if msg.contains("Fruit")));
    }

    #[tokio::test]
    async fn test_delete_detaches_products() {
        let db = testing::TestDb::new().await;
        let fruit = create(&db.pool, "Fruit").await.unwrap();
        let mango = db.seed_product("Mango", 5000, 3).await;
        sqlx::query("UPDATE products SET category_id = ? WHERE id = ?")
            .bind(fruit.id)
            .bind(mango.id)
            .execute(&db.pool)
            .await
            .unwrap();

        assert!(delete(&db.pool, fruit.id).await.unwrap());

        let mango = product::find_by_id(&db.pool, mango.id).await.unwrap().unwrap();
        assert_eq!(mango.category_id, None);
    }
}
