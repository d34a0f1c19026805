//! Live push messages
//!
//! Frames sent over `/api/live/ws`. Serialized with an internal `type` tag.

use serde::{Deserialize, Serialize};

use crate::models::Notification;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveMessage {
    /// First frame after the socket is accepted
    Ready { user_id: i64, unread: i64 },
    /// A notification was just created for this user
    Notification { notification: Notification },
    /// Resync after the receiver fell behind
    Unread { count: i64 },
}
