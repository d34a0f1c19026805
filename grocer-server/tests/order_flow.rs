mod common;

use common::TestApp;
use http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_register_cart_place_and_fulfil() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let mango = app.product(&admin, "Mango", 50, 5).await;
    let rice = app.product(&admin, "Sticky rice", 30, 1).await;
    let (user_id, token) = app.shopper("malee").await;

    let resp = app.add_to_cart(&token, mango, 2).await;
    assert_eq!(resp.status, StatusCode::OK);
    let resp = app.add_to_cart(&token, rice, 1).await;
    assert_eq!(resp.body["subtotal"], 130);
    assert_eq!(resp.body["items"].as_array().unwrap().len(), 2);

    let placed = app.post("/api/orders", Some(&token), json!({})).await;
    assert_eq!(placed.status, StatusCode::CREATED, "{}", placed.body);
    assert_eq!(placed.body["message"], "Order placed successfully!");
    assert_eq!(placed.body["order"]["total_amount"], 130);
    assert_eq!(placed.body["order"]["status"], "pending");
    assert_eq!(placed.body["order"]["order_type"], "pickup");
    assert_eq!(placed.body["order"]["payment_method"], "cashOnPickup");
    assert!(placed.body["pickup_deadline"].is_string());
    assert!(placed.body["store_location"].is_string());
    let order_id = placed.body["order_id"].as_i64().unwrap();

    assert_eq!(app.stock_of(mango).await, 3);
    assert_eq!(app.stock_of(rice).await, 0);
    let cart = app.get("/api/carts/me", Some(&token)).await;
    assert!(cart.body["items"].as_array().unwrap().is_empty());

    // admin was told about the new order
    let inbox = app.get("/api/notifications", Some(&admin)).await;
    assert_eq!(inbox.body[0]["type"], "new_order");
    assert_eq!(
        inbox.body[0]["link"],
        format!("/admin/orders/{order_id}").as_str()
    );

    for status in ["processing", "ready_for_pickup"] {
        let resp = app
            .put(
                &format!("/api/orders/admin/{order_id}/status"),
                Some(&admin),
                json!({ "status": status }),
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "{}", resp.body);
        assert_eq!(resp.body["message"], "Order status updated successfully");
        assert_eq!(resp.body["order"]["status"], status);
    }

    let detail = app.get(&format!("/api/orders/{order_id}"), Some(&token)).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert!(detail.body["pickup_time"].is_i64());
    assert_eq!(detail.body["items"].as_array().unwrap().len(), 2);
    assert_eq!(detail.body["user"]["id"], user_id);

    let inbox = app.get("/api/notifications", Some(&token)).await;
    let notes = inbox.body.as_array().unwrap();
    assert_eq!(notes.len(), 2);
    let ready = notes
        .iter()
        .find(|n| n["type"] == "pickup_ready")
        .expect("pickup notification");
    assert!(
        ready["message"]
            .as_str()
            .unwrap()
            .contains("is ready for pickup")
    );

    // backward move is refused and leaves the order alone
    let resp = app
        .put(
            &format!("/api/orders/admin/{order_id}/status"),
            Some(&admin),
            json!({ "status": "pending" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);

    let resp = app
        .put(
            &format!("/api/orders/admin/{order_id}/status"),
            Some(&admin),
            json!({ "status": "picked_up" }),
        )
        .await;
    assert_eq!(resp.body["order"]["status"], "picked_up");

    let resp = app
        .put(&format!("/api/orders/{order_id}/cancel"), Some(&token), json!({}))
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(
        resp.body["message"],
        "Cannot cancel an order with status: picked_up"
    );

    let resp = app.delete("/api/orders/user/clear-history", Some(&token)).await;
    assert_eq!(resp.body["deleted"], 1);
    let resp = app.get(&format!("/api/orders/user/{user_id}"), Some(&token)).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["message"], "No orders found for this user.");
}

#[tokio::test]
async fn test_shortfall_leaves_everything_untouched() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let mango = app.product(&admin, "Mango", 50, 5).await;
    let rice = app.product(&admin, "Sticky rice", 30, 1).await;
    let (_, token) = app.shopper("malee").await;
    app.add_to_cart(&token, mango, 2).await;
    app.add_to_cart(&token, rice, 1).await;

    let resp = app
        .put(
            &format!("/api/products/{rice}"),
            Some(&admin),
            json!({ "stock": 0 }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = app.post("/api/orders", Some(&token), json!({})).await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(resp.body["message"], "Insufficient stock for product: Sticky rice");
    assert_eq!(resp.body["details"]["product_id"], rice);

    assert_eq!(app.stock_of(mango).await, 5);
    let cart = app.get("/api/carts/me", Some(&token)).await;
    assert_eq!(cart.body["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_cart_stock_messages() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let eggs = app.product(&admin, "Eggs", 120, 3).await;
    let (_, token) = app.shopper("malee").await;

    let resp = app.add_to_cart(&token, eggs, 4).await;
    assert_eq!(resp.body["message"], "Not enough stock. Only 3 left.");

    app.add_to_cart(&token, eggs, 2).await;
    let resp = app.add_to_cart(&token, eggs, 2).await;
    assert_eq!(
        resp.body["message"],
        "Cannot add more. Total quantity would exceed stock (3)."
    );

    let resp = app
        .put(
            "/api/carts/update",
            Some(&token),
            json!({ "product_id": eggs, "quantity": 0 }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body["items"].as_array().unwrap().is_empty());

    let resp = app
        .request(
            http::Method::DELETE,
            "/api/carts/remove",
            Some(&token),
            Some(json!({ "product_id": eggs })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_cart_and_delivery_rules() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let mango = app.product(&admin, "Mango", 50, 5).await;
    let (_, token) = app.shopper("malee").await;

    // GET creates the cart
    app.get("/api/carts/me", Some(&token)).await;
    let resp = app.post("/api/orders", Some(&token), json!({})).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "Your cart is empty. Cannot place an order.");

    app.add_to_cart(&token, mango, 1).await;
    let resp = app
        .post("/api/orders", Some(&token), json!({ "order_type": "delivery" }))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app
        .post(
            "/api/orders",
            Some(&token),
            json!({ "order_type": "delivery", "shipping_address": "99 Sukhumvit Rd" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    assert!(resp.body.get("pickup_deadline").is_none());
    assert_eq!(resp.body["order"]["shipping_address"], "99 Sukhumvit Rd");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_last_unit_race() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let durian = app.product(&admin, "Durian", 90000, 1).await;
    let (_, first) = app.shopper("malee").await;
    let (_, second) = app.shopper("niran").await;
    app.add_to_cart(&first, durian, 1).await;
    app.add_to_cart(&second, durian, 1).await;

    let (a, b) = tokio::join!(
        app.post("/api/orders", Some(&first), json!({})),
        app.post("/api/orders", Some(&second), json!({})),
    );

    let mut statuses = [a.status, b.status];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
    assert_eq!(app.stock_of(durian).await, 0);

    let all = app.get("/api/orders/admin", Some(&admin)).await;
    assert_eq!(all.body.as_array().unwrap().len(), 1);
}
