//! Contact Message Repository

use super::{RepoError, RepoResult};
use shared::models::{ContactMessage, User};
use sqlx::SqlitePool;

const CONTACT_COLUMNS: &str = "id, user_id, name, email, message, created_at";

/// Store a message under the sender's current name and email
pub async fn create(pool: &SqlitePool, sender: &User, message: &str) -> RepoResult<ContactMessage> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO contact_messages (id, user_id, name, email, message, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(sender.id)
    .bind(&sender.username)
    .bind(&sender.email)
    .bind(message)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create contact message".into()))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<ContactMessage>> {
    let sql = format!("SELECT {CONTACT_COLUMNS} FROM contact_messages WHERE id = ?");
    let message = sqlx::query_as::<_, ContactMessage>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(message)
}

/// Newest first
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<ContactMessage>> {
    let sql = format!(
        "SELECT {CONTACT_COLUMNS} FROM contact_messages ORDER BY created_at DESC, id DESC"
    );
    let messages = sqlx::query_as::<_, ContactMessage>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(messages)
}
