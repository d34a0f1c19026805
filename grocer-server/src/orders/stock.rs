//! Stock ledger
//!
//! Stock is checked and decremented in the same transaction that creates
//! the order; there is no separate hold. [`reserve`] is the only writer that
//! lowers `products.stock` and it never takes it below zero.

use shared::error::{AppError, ErrorCode};
use shared::models::{CartLine, Product};
use sqlx::SqliteConnection;

use crate::db::repository::RepoResult;

pub fn insufficient_stock(
    product_id: i64,
    product_name: &str,
    available: i64,
    requested: i64,
) -> AppError {
    AppError::with_message(
        ErrorCode::InsufficientStock,
        format!("Insufficient stock for product: {product_name}"),
    )
    .with_detail("product_id", product_id)
    .with_detail("product_name", product_name)
    .with_detail("available", available)
    .with_detail("requested", requested)
}

/// Fails on the first line asking for more than the product has
pub fn check_lines(lines: &[CartLine]) -> Result<(), AppError> {
    match lines.iter().find(|line| line.quantity > line.stock) {
        Some(line) => Err(insufficient_stock(
            line.product_id,
            &line.product_name,
            line.stock,
            line.quantity,
        )),
        None => Ok(()),
    }
}

/// Guarded decrement; `false` means the product no longer has `quantity` units
pub async fn reserve(
    conn: &mut SqliteConnection,
    product_id: i64,
    quantity: i64,
    now: i64,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE products SET stock = stock - ?, updated_at = ? WHERE id = ? AND stock >= ?",
    )
    .bind(quantity)
    .bind(now)
    .bind(product_id)
    .bind(quantity)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

// ── Cart-side checks ────────────────────────────────────────────────

/// Quantity after adding `requested` to an existing line (if any)
pub fn check_add(product: &Product, existing: Option<i64>, requested: i64) -> Result<i64, AppError> {
    if product.stock < requested {
        return Err(AppError::with_message(
            ErrorCode::InsufficientStock,
            format!("Not enough stock. Only {} left.", product.stock),
        )
        .with_detail("product_id", product.id)
        .with_detail("available", product.stock)
        .with_detail("requested", requested));
    }

    let Some(existing) = existing else {
        return Ok(requested);
    };
    let merged = existing.saturating_add(requested);
    if merged > product.stock {
        return Err(AppError::with_message(
            ErrorCode::InsufficientStock,
            format!(
                "Cannot add more. Total quantity would exceed stock ({}).",
                product.stock
            ),
        )
        .with_detail("product_id", product.id)
        .with_detail("available", product.stock)
        .with_detail("requested", merged));
    }
    Ok(merged)
}

/// Setting a line to an absolute quantity
pub fn check_set(product: &Product, quantity: i64) -> Result<(), AppError> {
    if quantity > product.stock {
        return Err(AppError::with_message(
            ErrorCode::InsufficientStock,
            format!("Not enough stock. Only {} left.", product.stock),
        )
        .with_detail("product_id", product.id)
        .with_detail("available", product.stock)
        .with_detail("requested", quantity));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::product;
    use crate::testing;

    fn line(product_id: i64, name: &str, quantity: i64, stock: i64) -> CartLine {
        CartLine {
            id: product_id * 10,
            product_id,
            quantity,
            product_name: name.into(),
            price: 100,
            stock,
            image_url: None,
        }
    }

    fn product_with_stock(stock: i64) -> Product {
        Product {
            id: 7,
            name: "Eggs".into(),
            description: None,
            price: 500,
            stock,
            image_url: None,
            category_id: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_check_lines_reports_first_shortfall() {
        let lines = vec![
            line(1, "Rice", 2, 5),
            line(2, "Milk", 3, 1),
            line(3, "Eggs", 9, 0),
        ];
        let err = check_lines(&lines).unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.message, "Insufficient stock for product: Milk");
        let details = err.details.unwrap();
        assert_eq!(details["product_id"], 2);
        assert_eq!(details["available"], 1);
        assert_eq!(details["requested"], 3);
    }

    #[test]
    fn test_check_lines_allows_exact_stock() {
        assert!(check_lines(&[line(1, "Rice", 5, 5)]).is_ok());
        assert!(check_lines(&[]).is_ok());
    }

    #[test]
    fn test_check_add_messages() {
        let eggs = product_with_stock(3);
        assert_eq!(check_add(&eggs, None, 2).unwrap(), 2);
        assert_eq!(check_add(&eggs, Some(1), 2).unwrap(), 3);

        let err = check_add(&eggs, None, 4).unwrap_err();
        assert_eq!(err.message, "Not enough stock. Only 3 left.");

        let err = check_add(&eggs, Some(2), 2).unwrap_err();
        assert_eq!(
            err.message,
            "Cannot add more. Total quantity would exceed stock (3)."
        );
    }

    #[test]
    fn test_check_set() {
        let eggs = product_with_stock(3);
        assert!(check_set(&eggs, 3).is_ok());
        assert_eq!(
            check_set(&eggs, 4).unwrap_err().message,
            "Not enough stock. Only 3 left."
        );
    }

    #[tokio::test]
    async fn test_reserve_never_goes_negative() {
        let db = testing::TestDb::new().await;
        let rice = db.seed_product("Rice", 100, 3).await;
        let mut conn = db.pool.acquire().await.unwrap();

        assert!(reserve(&mut conn, rice.id, 2, 1).await.unwrap());
        assert!(!reserve(&mut conn, rice.id, 2, 2).await.unwrap());
        assert!(reserve(&mut conn, rice.id, 1, 3).await.unwrap());
        assert!(!reserve(&mut conn, rice.id, 1, 4).await.unwrap());

        let after = product::find_by_id(&db.pool, rice.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 0);
    }
}
