//! Contact Message Model

use serde::{Deserialize, Serialize};

/// Message sent to the store through the contact form
///
/// `name` and `email` are copied from the sender's account at send time;
/// `user_id` becomes NULL if the account is deleted later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ContactMessage {
    pub id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: i64,
}

/// Create payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessageCreate {
    pub message: String,
}

/// Create response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessageResponse {
    pub message: String,
    pub data: ContactMessage,
}
