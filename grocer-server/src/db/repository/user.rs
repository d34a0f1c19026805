//! User Repository

use super::{RepoError, RepoResult};
use shared::models::{User, UserRole, UserSummary};
use sqlx::{Sqlite, SqlitePool};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, role, profile_image, created_at, updated_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Any account already holding this username or email
pub async fn find_by_username_or_email(
    pool: &SqlitePool,
    username: &str,
    email: &str,
) -> RepoResult<Option<User>> {
    let sql = format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = ? OR email = ? LIMIT 1"
    );
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn create(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
    role: UserRole,
) -> RepoResult<User> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO users (id, username, email, password_hash, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

pub async fn find_summary<'e, E>(executor: E, id: i64) -> RepoResult<Option<UserSummary>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let summary = sqlx::query_as::<_, UserSummary>(
        "SELECT id, username, email FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(summary)
}

/// Summaries for a set of users (order listings), bound in chunks
pub async fn find_summaries(pool: &SqlitePool, ids: &[i64]) -> RepoResult<Vec<UserSummary>> {
    let mut summaries = Vec::new();
    for chunk in ids.chunks(super::BIND_CHUNK) {
        let mut qb = sqlx::QueryBuilder::<Sqlite>::new(
            "SELECT id, username, email FROM users WHERE id IN (",
        );
        let mut separated = qb.separated(", ");
        for id in chunk {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        summaries.extend(qb.build_query_as::<UserSummary>().fetch_all(pool).await?);
    }
    Ok(summaries)
}

/// Every account, newest first
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC");
    let users = sqlx::query_as::<_, User>(&sql).fetch_all(pool).await?;
    Ok(users)
}

/// Partial update; `None` fields keep their stored value
#[derive(Debug, Default)]
pub struct UserUpdate<'a> {
    pub username: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password_hash: Option<&'a str>,
    pub role: Option<UserRole>,
}

pub async fn update(pool: &SqlitePool, id: i64, data: UserUpdate<'_>) -> RepoResult<User> {
    let rows = sqlx::query(
        "UPDATE users SET username = COALESCE(?, username), email = COALESCE(?, email), \
         password_hash = COALESCE(?, password_hash), role = COALESCE(?, role), updated_at = ? \
         WHERE id = ?",
    )
    .bind(data.username)
    .bind(data.email)
    .bind(data.password_hash)
    .bind(data.role)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

/// Delete an account; cart, orders and notifications go with it
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// IDs of every admin account
pub async fn find_admin_ids(pool: &SqlitePool) -> RepoResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE role = 'admin'")
        .fetch_all(pool)
        .await?;
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::cart;
    use crate::testing;

    #[tokio::test]
    async fn test_create_and_find() {
        let db = testing::TestDb::new().await;
        let user = create(&db.pool, "somchai", "somchai@example.com", "hash", UserRole::User)
            .await
            .unwrap();

        let by_email = find_by_email(&db.pool, "SOMCHAI@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, user.id);
        assert_eq!(by_email.role, UserRole::User);

        let summaries = find_summaries(&db.pool, &[user.id]).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].username, "somchai");
    }

    #[tokio::test]
    async fn test_duplicate_email_is_duplicate() {
        let db = testing::TestDb::new().await;
        create(&db.pool, "a", "dup@example.com", "hash", UserRole::User)
            .await
            .unwrap();
        let err = create(&db.pool, "b", "dup@example.com", "hash", UserRole::User)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_admin_ids() {
        let db = testing::TestDb::new().await;
        let admin = create(&db.pool, "boss", "boss@example.com", "h", UserRole::Admin)
            .await
            .unwrap();
        create(&db.pool, "shopper", "shopper@example.com", "h", UserRole::User)
            .await
            .unwrap();

        assert_eq!(find_admin_ids(&db.pool).await.unwrap(), vec![admin.id]);
    }

    #[tokio::test]
    async fn test_partial_update() {
        let db = testing::TestDb::new().await;
        let user = db.seed_user("malee").await;
        db.seed_user("somchai").await;

        let updated = update(
            &db.pool,
            user.id,
            UserUpdate {
                role: Some(UserRole::Admin),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.role, UserRole::Admin);
        assert_eq!(updated.username, "malee");
        assert_eq!(updated.password_hash, user.password_hash);

        let err = update(
            &db.pool,
            user.id,
            UserUpdate {
                email: Some("somchai@example.com"),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));

        let err = update(&db.pool, 424242, UserUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_cascades_cart_and_orders() {
        let db = testing::TestDb::new().await;
        let user = db.seed_user("malee").await;
        let product = db.seed_product("Mango", 50, 5).await;
        let cart = cart::ensure_cart(&db.pool, user.id).await.unwrap();
        cart::set_quantity(&db.pool, cart.id, product.id, 1)
            .await
            .unwrap();
        sqlx::query("INSERT INTO orders (id, user_id, total_amount, created_at, updated_at) VALUES (7, ?, 50, 0, 0)")
            .bind(user.id)
            .execute(&db.pool)
            .await
            .unwrap();

        assert!(delete(&db.pool, user.id).await.unwrap());
        assert!(!delete(&db.pool, user.id).await.unwrap());

        for table in ["carts", "cart_items", "orders"] {
            let left: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
                .fetch_one(&db.pool)
                .await
                .unwrap();
            assert_eq!(left, 0, "{table} not cleared");
        }
        assert_eq!(find_all(&db.pool).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_summaries_for_many_ids() {
        let db = testing::TestDb::new().await;
        let a = db.seed_user("somchai").await;
        let b = db.seed_user("malee").await;

        let mut ids: Vec<i64> = (1..=33_000).collect();
        ids.push(a.id);
        ids.push(b.id);
        let mut found: Vec<i64> = find_summaries(&db.pool, &ids)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        found.sort_unstable();

        let mut expected = vec![a.id, b.id];
        expected.sort_unstable();
        assert_eq!(found, expected);
    }
}
