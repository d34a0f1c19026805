//! OrderEngine - order placement and status changes
//!
//! Placement flow:
//!
//! ```text
//! place_order(actor, req)
//!     ├─ 1. Parse order type / payment method / shipping address
//!     ├─ 2. BEGIN; stamp carts.updated_at (takes the write lock)
//!     ├─ 3. Read cart lines joined with live product rows
//!     ├─ 4. Stock sufficiency check (first shortfall aborts)
//!     ├─ 5. Total = Σ price × quantity
//!     ├─ 6. Insert order (pending) + item snapshots
//!     ├─ 7. Guarded stock decrement per line
//!     ├─ 8. Clear cart lines
//!     ├─ 9. COMMIT
//!     └─ 10. Notify admins (best effort)
//! ```
//!
//! Any early return drops the transaction, which rolls it back.
//! Status changes go through the [`OrderStatus`] transition table and are
//! persisted with a compare-and-set on the previous status.

use std::collections::HashMap;

use shared::error::{AppError, ErrorCode};
use shared::models::{
    CartLine, NotificationKind, Order, OrderDetail, OrderItem, PlaceOrderRequest,
    PlaceOrderResponse, UserSummary,
};
use shared::order::{DEFAULT_PAYMENT_METHOD, OrderStatus, OrderType};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

use super::pickup::compute_pickup_deadline;
use super::stock;
use crate::auth::CurrentUser;
use crate::core::StoreConfig;
use crate::db::repository::{RepoError, cart, order, product, user};
use crate::notifications::{self, NotificationService};
use crate::security_log;
use crate::utils::AppResult;
use crate::utils::time::millis_to_rfc3339;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_SHORT_TEXT_LEN, non_blank, validate_optional_text, validate_required_text,
};

fn db_err(err: sqlx::Error) -> AppError {
    RepoError::from(err).into()
}

fn order_not_found(order_id: i64) -> AppError {
    AppError::with_message(ErrorCode::OrderNotFound, "Order not found").with_detail("order_id", order_id)
}

#[derive(Clone)]
pub struct OrderEngine {
    pool: SqlitePool,
    notifications: NotificationService,
    store: StoreConfig,
}

impl OrderEngine {
    pub fn new(pool: SqlitePool, notifications: NotificationService, store: StoreConfig) -> Self {
        Self {
            pool,
            notifications,
            store,
        }
    }

    pub fn store(&self) -> &StoreConfig {
        &self.store
    }

    // ========== Placement ==========

    pub async fn place_order(
        &self,
        actor: &CurrentUser,
        req: PlaceOrderRequest,
    ) -> AppResult<PlaceOrderResponse> {
        let order_type = match non_blank(req.order_type) {
            Some(raw) => raw.parse::<OrderType>()?,
            None => OrderType::default(),
        };
        let payment_method =
            non_blank(req.payment_method).unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string());
        validate_required_text(&payment_method, "payment_method", MAX_SHORT_TEXT_LEN)?;

        let shipping_address = non_blank(req.shipping_address);
        validate_optional_text(&shipping_address, "shipping_address", MAX_ADDRESS_LEN)?;
        if order_type == OrderType::Delivery && shipping_address.is_none() {
            return Err(AppError::with_message(
                ErrorCode::ShippingAddressRequired,
                "Shipping address is required for delivery orders.",
            ));
        }

        let now = now_millis();
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        if cart::touch(&mut tx, actor.id, now).await? == 0 {
            return Err(AppError::with_message(ErrorCode::CartNotFound, "Cart not found."));
        }
        let user_cart = cart::find_by_user(&mut *tx, actor.id)
            .await?
            .ok_or_else(|| AppError::with_message(ErrorCode::CartNotFound, "Cart not found."))?;

        let lines = cart::find_lines(&mut *tx, user_cart.id).await?;
        if lines.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::OrderEmptyCart,
                "Your cart is empty. Cannot place an order.",
            ));
        }
        stock::check_lines(&lines)?;
        let total_amount = order_total(&lines)?;

        let (pickup_deadline, store_location) = match order_type {
            OrderType::Pickup => (
                Some(compute_pickup_deadline(now, &self.store)),
                Some(self.store.location.clone()),
            ),
            OrderType::Delivery => (None, None),
        };

        let new_order = Order {
            id: snowflake_id(),
            user_id: actor.id,
            total_amount,
            order_type,
            payment_method,
            status: OrderStatus::Pending,
            shipping_address,
            pickup_deadline,
            pickup_time: None,
            store_location,
            created_at: now,
            updated_at: now,
        };
        order::insert_order(&mut tx, &new_order).await?;

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let item = OrderItem {
                id: snowflake_id(),
                order_id: new_order.id,
                product_id: Some(line.product_id),
                product_name: line.product_name.clone(),
                quantity: line.quantity,
                price: line.price,
            };
            order::insert_item(&mut tx, &item).await?;

            if !stock::reserve(&mut tx, line.product_id, line.quantity, now).await? {
                let available = product::find_by_id(&mut *tx, line.product_id)
                    .await?
                    .map(|p| p.stock)
                    .unwrap_or(0);
                return Err(stock::insufficient_stock(
                    line.product_id,
                    &line.product_name,
                    available,
                    line.quantity,
                ));
            }
            items.push(item);
        }

        cart::clear(&mut *tx, user_cart.id).await?;
        let owner = user::find_summary(&mut *tx, actor.id).await?;

        tx.commit().await.map_err(db_err)?;

        tracing::info!(
            order_id = new_order.id,
            user_id = actor.id,
            status = %new_order.status,
            order_type = ?new_order.order_type,
            total_amount,
            lines = items.len(),
            "Order placed"
        );

        self.notifications
            .notify_admins_best_effort(
                &notifications::new_order_message(&actor.username, new_order.id),
                NotificationKind::NewOrder,
                Some(&notifications::admin_order_link(new_order.id)),
            )
            .await;

        Ok(PlaceOrderResponse {
            message: "Order placed successfully!".to_string(),
            order_id: new_order.id,
            pickup_deadline: new_order.pickup_deadline.and_then(millis_to_rfc3339),
            store_location: new_order.store_location.clone(),
            order: OrderDetail {
                order: new_order,
                items,
                user: owner,
            },
        })
    }

    // ========== Status changes ==========

    /// Admin status change; notifies the owner after the write
    pub async fn update_status(&self, order_id: i64, target: OrderStatus) -> AppResult<Order> {
        let current = self.find_order(order_id).await?;
        current.status.check_transition(target)?;

        let now = now_millis();
        let pickup_time = (target == OrderStatus::ReadyForPickup).then_some(now);
        if let Some(actual) = self
            .compare_and_set(&current, target, pickup_time, now)
            .await?
        {
            actual.check_transition(target)?;
            return Err(changed_concurrently(actual));
        }

        let updated = Order {
            status: target,
            pickup_time: pickup_time.or(current.pickup_time),
            updated_at: now,
            ..current
        };
        tracing::info!(
            order_id,
            user_id = updated.user_id,
            status = %target,
            "Order status updated"
        );

        let (message, kind) = notifications::status_change_message(&updated, self.store.timezone);
        self.notifications
            .notify_best_effort(
                updated.user_id,
                &message,
                kind,
                Some(&notifications::order_link(order_id)),
            )
            .await;

        Ok(updated)
    }

    /// Owner or admin cancel; stock is not restored
    pub async fn cancel(&self, actor: &CurrentUser, order_id: i64) -> AppResult<Order> {
        let current = self.find_order(order_id).await?;
        if !actor.can_access(current.user_id) {
            security_log!(
                "WARN",
                "order_cancel_denied",
                user_id = actor.id,
                order_id = order_id
            );
            return Err(AppError::forbidden(
                "You are not allowed to cancel this order",
            ));
        }
        if current.status.is_terminal() {
            return Err(cannot_cancel(current.status));
        }

        let now = now_millis();
        if let Some(actual) = self
            .compare_and_set(&current, OrderStatus::Cancelled, None, now)
            .await?
        {
            if actual.is_terminal() {
                return Err(cannot_cancel(actual));
            }
            return Err(changed_concurrently(actual));
        }

        let cancelled = Order {
            status: OrderStatus::Cancelled,
            updated_at: now,
            ..current
        };
        tracing::info!(
            order_id,
            user_id = cancelled.user_id,
            cancelled_by = actor.id,
            status = %cancelled.status,
            "Order cancelled"
        );
        Ok(cancelled)
    }

    /// Persist `current.status → target`; `Some(actual)` when another writer got there first
    async fn compare_and_set(
        &self,
        current: &Order,
        target: OrderStatus,
        pickup_time: Option<i64>,
        now: i64,
    ) -> AppResult<Option<OrderStatus>> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        let updated =
            order::update_status(&mut conn, current.id, current.status, target, pickup_time, now)
                .await?;
        if updated == 1 {
            return Ok(None);
        }

        let fresh = order::find_by_id(&mut *conn, current.id)
            .await?
            .ok_or_else(|| order_not_found(current.id))?;
        tracing::warn!(
            order_id = current.id,
            expected = %current.status,
            actual = %fresh.status,
            target = %target,
            "Order status changed concurrently"
        );
        Ok(Some(fresh.status))
    }

    // ========== History ==========

    /// Delete picked-up and cancelled orders; `None` clears every user's history
    pub async fn clear_history(&self, user_id: Option<i64>) -> AppResult<u64> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let deleted = order::delete_history(&mut tx, user_id).await?;
        tx.commit().await.map_err(db_err)?;

        tracing::info!(user_id = ?user_id, deleted, "Order history cleared");
        Ok(deleted)
    }

    // ========== Queries ==========

    async fn find_order(&self, order_id: i64) -> AppResult<Order> {
        order::find_by_id(&self.pool, order_id)
            .await?
            .ok_or_else(|| order_not_found(order_id))
    }

    /// One order with items and owner; owner or admin only
    pub async fn order_detail(&self, actor: &CurrentUser, order_id: i64) -> AppResult<OrderDetail> {
        let found = self.find_order(order_id).await?;
        actor.ensure_can_access(found.user_id)?;

        let items = order::find_items(&self.pool, order_id).await?;
        let owner = user::find_summary(&self.pool, found.user_id).await?;
        Ok(OrderDetail {
            order: found,
            items,
            user: owner,
        })
    }

    /// A user's orders, newest first
    pub async fn orders_for_user(
        &self,
        actor: &CurrentUser,
        user_id: i64,
    ) -> AppResult<Vec<OrderDetail>> {
        actor.ensure_can_access(user_id)?;

        let orders = order::find_by_user(&self.pool, user_id).await?;
        if orders.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::OrderNotFound,
                "No orders found for this user.",
            ));
        }
        let owner = user::find_summary(&self.pool, user_id).await?;
        self.with_items(orders, |_| owner.clone()).await
    }

    /// Every order, newest first (admin view)
    pub async fn all_orders(&self, status: Option<OrderStatus>) -> AppResult<Vec<OrderDetail>> {
        let orders = order::find_all(&self.pool, status).await?;

        let mut owner_ids: Vec<i64> = orders.iter().map(|o| o.user_id).collect();
        owner_ids.sort_unstable();
        owner_ids.dedup();
        let owners: HashMap<i64, UserSummary> = user::find_summaries(&self.pool, &owner_ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        self.with_items(orders, |o| owners.get(&o.user_id).cloned())
            .await
    }

    async fn with_items(
        &self,
        orders: Vec<Order>,
        owner_of: impl Fn(&Order) -> Option<UserSummary>,
    ) -> AppResult<Vec<OrderDetail>> {
        let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        let mut items = order::find_items_for(&self.pool, &ids).await?;
        Ok(orders
            .into_iter()
            .map(|o| OrderDetail {
                user: owner_of(&o),
                items: items.remove(&o.id).unwrap_or_default(),
                order: o,
            })
            .collect())
    }
}

fn changed_concurrently(actual: OrderStatus) -> AppError {
    AppError::with_message(
        ErrorCode::OrderInvalidTransition,
        format!("Order status changed to {actual} while updating"),
    )
    .with_detail("current_status", actual.as_str())
}

fn cannot_cancel(status: OrderStatus) -> AppError {
    AppError::with_message(
        ErrorCode::OrderAlreadyTerminal,
        format!("Cannot cancel an order with status: {status}"),
    )
    .with_detail("current_status", status.as_str())
}

/// Σ price × quantity, rejecting overflow
fn order_total(lines: &[CartLine]) -> AppResult<i64> {
    lines
        .iter()
        .try_fold(0_i64, |acc, line| {
            line.price
                .checked_mul(line.quantity)
                .and_then(|subtotal| acc.checked_add(subtotal))
        })
        .ok_or_else(|| AppError::validation("Order total is out of range"))
}
