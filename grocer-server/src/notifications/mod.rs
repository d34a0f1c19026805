//! Notification sink
//!
//! Persists a notification row and pushes it to the user's live
//! connections. Order side effects use the `*_best_effort` variants, which
//! log and swallow failures so a committed order is never reported as failed.

use chrono_tz::Tz;
use shared::live::LiveMessage;
use shared::models::{Notification, NotificationKind, Order};
use shared::order::OrderStatus;
use sqlx::SqlitePool;

use crate::db::repository::{notification, user};
use crate::live::ConnectionHub;
use crate::utils::AppResult;
use crate::utils::time::format_store_time;

#[derive(Clone)]
pub struct NotificationService {
    pool: SqlitePool,
    hub: ConnectionHub,
}

impl NotificationService {
    pub fn new(pool: SqlitePool, hub: ConnectionHub) -> Self {
        Self { pool, hub }
    }

    /// Persist and push a notification
    pub async fn notify(
        &self,
        user_id: i64,
        message: &str,
        kind: NotificationKind,
        link: Option<&str>,
    ) -> AppResult<Notification> {
        let created = notification::create(&self.pool, user_id, message, kind, link).await?;

        let reached = self.hub.send_to(
            user_id,
            LiveMessage::Notification {
                notification: created.clone(),
            },
        );
        tracing::debug!(
            user_id,
            notification_id = created.id,
            kind = %kind,
            reached,
            "Notification delivered"
        );

        Ok(created)
    }

    /// Fan out to every admin; returns how many were notified
    ///
    /// A failed insert for one admin is logged and does not stop the rest.
    pub async fn notify_admins(
        &self,
        message: &str,
        kind: NotificationKind,
        link: Option<&str>,
    ) -> AppResult<usize> {
        let admin_ids = user::find_admin_ids(&self.pool).await?;
        let mut notified = 0;
        for admin_id in admin_ids {
            match self.notify(admin_id, message, kind, link).await {
                Ok(_) => notified += 1,
                Err(e) => {
                    tracing::warn!(admin_id, kind = %kind, error = %e, "Failed to notify admin");
                }
            }
        }
        Ok(notified)
    }

    pub async fn notify_best_effort(
        &self,
        user_id: i64,
        message: &str,
        kind: NotificationKind,
        link: Option<&str>,
    ) {
        if let Err(e) = self.notify(user_id, message, kind, link).await {
            tracing::warn!(user_id, kind = %kind, error = %e, "Failed to send notification");
        }
    }

    pub async fn notify_admins_best_effort(
        &self,
        message: &str,
        kind: NotificationKind,
        link: Option<&str>,
    ) {
        if let Err(e) = self.notify_admins(message, kind, link).await {
            tracing::warn!(kind = %kind, error = %e, "Failed to notify admins");
        }
    }
}

// ── Message text ────────────────────────────────────────────────────

pub fn admin_order_link(order_id: i64) -> String {
    format!("/admin/orders/{order_id}")
}

pub fn order_link(order_id: i64) -> String {
    format!("/orders/{order_id}")
}

pub fn new_order_message(username: &str, order_id: i64) -> String {
    format!("New order from {username}, order #{order_id}")
}

/// Owner-facing text for an order that just moved to `order.status`
pub fn status_change_message(order: &Order, tz: Tz) -> (String, NotificationKind) {
    match order.status {
        OrderStatus::ReadyForPickup => {
            let deadline = order
                .pickup_deadline
                .map(|millis| format_store_time(millis, tz))
                .unwrap_or_else(|| "closing time".to_string());
            (
                format!(
                    "Your order #{} is ready for pickup. Please collect it before {} (store time)",
                    order.id, deadline
                ),
                NotificationKind::PickupReady,
            )
        }
        OrderStatus::PickedUp => (
            format!("Thank you! Order #{} has been picked up.", order.id),
            NotificationKind::PickupCompleted,
        ),
        status => (
            format!("Your order #{} status changed to: {}", order.id, status),
            NotificationKind::OrderStatus,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use chrono::TimeZone;
    use shared::order::OrderType;

    fn order(status: OrderStatus, pickup_deadline: Option<i64>) -> Order {
        Order {
            id: 99,
            user_id: 1,
            total_amount: 1000,
            order_type: OrderType::Pickup,
            payment_method: "cashOnPickup".into(),
            status,
            shipping_address: None,
            pickup_deadline,
            pickup_time: None,
            store_location: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_ready_message_uses_store_time() {
        let deadline = chrono::Utc
            .with_ymd_and_hms(2025, 3, 10, 12, 30, 0)
            .unwrap()
            .timestamp_millis();
        let (text, kind) = status_change_message(
            &order(OrderStatus::ReadyForPickup, Some(deadline)),
            chrono_tz::Asia::Bangkok,
        );
        assert_eq!(kind, NotificationKind::PickupReady);
        assert_eq!(
            text,
            "Your order #99 is ready for pickup. Please collect it before 10/03/2025 19:30 (store time)"
        );
    }

    #[test]
    fn test_other_messages() {
        let tz = chrono_tz::Asia::Bangkok;
        let (text, kind) = status_change_message(&order(OrderStatus::PickedUp, None), tz);
        assert_eq!(kind, NotificationKind::PickupCompleted);
        assert_eq!(text, "Thank you! Order #99 has been picked up.");

        let (text, kind) = status_change_message(&order(OrderStatus::Processing, None), tz);
        assert_eq!(kind, NotificationKind::OrderStatus);
        assert_eq!(text, "Your order #99 status changed to: processing");
    }

    #[tokio::test]
    async fn test_notify_persists_and_pushes() {
        let db = testing::TestDb::new().await;
        let shopper = db.seed_user("malee").await;
        let hub = ConnectionHub::new();
        let mut conn = hub.register(shopper.id);
        let service = NotificationService::new(db.pool.clone(), hub.clone());

        let created = service
            .notify(shopper.id, "hello", NotificationKind::System, None)
            .await
            .unwrap();

        match conn.rx.recv().await.unwrap() {
            LiveMessage::Notification { notification } => assert_eq!(notification.id, created.id),
            other => panic!("unexpected message: {other:?}"),
        }
        assert_eq!(
            notification::count_unread(&db.pool, shopper.id).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_notify_admins_fans_out() {
        let db = testing::TestDb::new().await;
        let a = db.seed_admin("boss").await;
        let b = db.seed_admin("manager").await;
        let shopper = db.seed_user("malee").await;
        let service = NotificationService::new(db.pool.clone(), ConnectionHub::new());

        let sent = service
            .notify_admins("New order", NotificationKind::NewOrder, Some("/admin/orders/1"))
            .await
            .unwrap();

        assert_eq!(sent, 2);
        for id in [a.id, b.id] {
            assert_eq!(notification::count_unread(&db.pool, id).await.unwrap(), 1);
        }
        assert_eq!(
            notification::count_unread(&db.pool, shopper.id).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_notify_admins_continues_after_failure() {
        let db = testing::TestDb::new().await;
        let broken = db.seed_admin("boss").await;
        let healthy = db.seed_admin("manager").await;
        sqlx::query(&format!(
            "CREATE TRIGGER reject_notification BEFORE INSERT ON notifications \
             WHEN NEW.user_id = {} BEGIN SELECT RAISE(ABORT, 'rejected'); END",
            broken.id
        ))
        .execute(&db.pool)
        .await
        .unwrap();
        let service = NotificationService::new(db.pool.clone(), ConnectionHub::new());

        let sent = service
            .notify_admins("New order", NotificationKind::NewOrder, None)
            .await
            .unwrap();

        assert_eq!(sent, 1);
        assert_eq!(notification::count_unread(&db.pool, broken.id).await.unwrap(), 0);
        assert_eq!(notification::count_unread(&db.pool, healthy.id).await.unwrap(), 1);
    }
}
