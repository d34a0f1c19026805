//! Notification Repository

use super::{RepoError, RepoResult};
use shared::models::{Notification, NotificationKind};
use sqlx::SqlitePool;

const NOTIFICATION_COLUMNS: &str = "id, user_id, message, kind, link, is_read, created_at";

pub async fn create(
    pool: &SqlitePool,
    user_id: i64,
    message: &str,
    kind: NotificationKind,
    link: Option<&str>,
) -> RepoResult<Notification> {
    let notification = Notification {
        id: shared::util::snowflake_id(),
        user_id,
        message: message.to_string(),
        kind,
        link: link.map(str::to_string),
        is_read: false,
        created_at: shared::util::now_millis(),
    };

    sqlx::query(
        "INSERT INTO notifications (id, user_id, message, kind, link, is_read, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(notification.id)
    .bind(notification.user_id)
    .bind(&notification.message)
    .bind(notification.kind)
    .bind(&notification.link)
    .bind(notification.is_read)
    .bind(notification.created_at)
    .execute(pool)
    .await?;

    Ok(notification)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Notification>> {
    let sql = format!("SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = ?");
    let row = sqlx::query_as::<_, Notification>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Newest first
pub async fn find_by_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Notification>> {
    let sql = format!(
        "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE user_id = ? ORDER BY created_at DESC, id DESC"
    );
    let rows = sqlx::query_as::<_, Notification>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn count_unread(pool: &SqlitePool, user_id: i64) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = 0",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

pub async fn mark_read(pool: &SqlitePool, id: i64) -> RepoResult<Notification> {
    sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Notification {id}")))
}

pub async fn mark_all_read(pool: &SqlitePool, user_id: i64) -> RepoResult<u64> {
    let result =
        sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = ? AND is_read = 0")
            .bind(user_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM notifications WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[tokio::test]
    async fn test_unread_lifecycle() {
        let db = testing::TestDb::new().await;
        let user = db.seed_user("malee").await;

        let first = create(&db.pool, user.id, "one", NotificationKind::System, None)
            .await
            .unwrap();
        create(
            &db.pool,
            user.id,
            "two",
            NotificationKind::OrderStatus,
            Some("/orders/1"),
        )
        .await
        .unwrap();
        assert_eq!(count_unread(&db.pool, user.id).await.unwrap(), 2);

        let read = mark_read(&db.pool, first.id).await.unwrap();
        assert!(read.is_read);
        assert_eq!(count_unread(&db.pool, user.id).await.unwrap(), 1);

        assert_eq!(mark_all_read(&db.pool, user.id).await.unwrap(), 1);
        assert_eq!(count_unread(&db.pool, user.id).await.unwrap(), 0);

        let listed = find_by_user(&db.pool, user.id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].kind, NotificationKind::System);
    }
}
