//! Order Repository
//!
//! Rows are written only by the order engine; handlers read through here.

use std::collections::HashMap;

use super::RepoResult;
use shared::models::{Order, OrderItem};
use shared::order::OrderStatus;
use sqlx::{Sqlite, SqliteConnection, SqlitePool};

const ORDER_COLUMNS: &str = "id, user_id, total_amount, order_type, payment_method, status, shipping_address, pickup_deadline, pickup_time, store_location, created_at, updated_at";

pub async fn insert_order(conn: &mut SqliteConnection, order: &Order) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO orders (id, user_id, total_amount, order_type, payment_method, status, shipping_address, pickup_deadline, pickup_time, store_location, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(order.id)
    .bind(order.user_id)
    .bind(order.total_amount)
    .bind(order.order_type)
    .bind(&order.payment_method)
    .bind(order.status)
    .bind(&order.shipping_address)
    .bind(order.pickup_deadline)
    .bind(order.pickup_time)
    .bind(&order.store_location)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn insert_item(conn: &mut SqliteConnection, item: &OrderItem) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO order_items (id, order_id, product_id, product_name, quantity, price) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(item.id)
    .bind(item.order_id)
    .bind(item.product_id)
    .bind(&item.product_name)
    .bind(item.quantity)
    .bind(item.price)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<Order>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?");
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(order)
}

pub async fn find_items<'e, E>(executor: E, order_id: i64) -> RepoResult<Vec<OrderItem>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT id, order_id, product_id, product_name, quantity, price FROM order_items WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(executor)
    .await?;
    Ok(items)
}

/// Items for several orders, grouped by order id
///
/// Ids are bound in chunks of [`super::BIND_CHUNK`] to stay under SQLite's
/// per-statement variable limit.
pub async fn find_items_for(
    pool: &SqlitePool,
    order_ids: &[i64],
) -> RepoResult<HashMap<i64, Vec<OrderItem>>> {
    let mut grouped: HashMap<i64, Vec<OrderItem>> = HashMap::new();

    for chunk in order_ids.chunks(super::BIND_CHUNK) {
        let mut qb = sqlx::QueryBuilder::<Sqlite>::new(
            "SELECT id, order_id, product_id, product_name, quantity, price FROM order_items WHERE order_id IN (",
        );
        let mut separated = qb.separated(", ");
        for id in chunk {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY id");

        for item in qb.build_query_as::<OrderItem>().fetch_all(pool).await? {
            grouped.entry(item.order_id).or_default().push(item);
        }
    }
    Ok(grouped)
}

/// A user's orders, newest first
pub async fn find_by_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Order>> {
    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ? ORDER BY created_at DESC, id DESC"
    );
    let orders = sqlx::query_as::<_, Order>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(orders)
}

/// Every order, newest first, optionally filtered by status
pub async fn find_all(pool: &SqlitePool, status: Option<OrderStatus>) -> RepoResult<Vec<Order>> {
    let orders = match status {
        Some(status) => {
            let sql = format!(
                "SELECT {ORDER_COLUMNS} FROM orders WHERE status = ? ORDER BY created_at DESC, id DESC"
            );
            sqlx::query_as::<_, Order>(&sql)
                .bind(status)
                .fetch_all(pool)
                .await?
        }
        None => {
            let sql =
                format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC");
            sqlx::query_as::<_, Order>(&sql).fetch_all(pool).await?
        }
    };
    Ok(orders)
}

/// Compare-and-set status update; returns rows affected (0 = status moved underneath us)
pub async fn update_status(
    conn: &mut SqliteConnection,
    id: i64,
    expected: OrderStatus,
    target: OrderStatus,
    pickup_time: Option<i64>,
    now: i64,
) -> RepoResult<u64> {
    let result = sqlx::query(
        "UPDATE orders SET status = ?, pickup_time = COALESCE(?, pickup_time), updated_at = ? WHERE id = ? AND status = ?",
    )
    .bind(target)
    .bind(pickup_time)
    .bind(now)
    .bind(id)
    .bind(expected)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// Delete terminal orders (items cascade); `None` means every user
pub async fn delete_history(conn: &mut SqliteConnection, user_id: Option<i64>) -> RepoResult<u64> {
    let result = match user_id {
        Some(user_id) => {
            sqlx::query(
                "DELETE FROM orders WHERE user_id = ? AND status IN ('picked_up', 'cancelled')",
            )
            .bind(user_id)
            .execute(conn)
            .await?
        }
        None => {
            sqlx::query("DELETE FROM orders WHERE status IN ('picked_up', 'cancelled')")
                .execute(conn)
                .await?
        }
    };
    Ok(result.rows_affected())
}
