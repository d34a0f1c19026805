//! Shared harness: a fresh server state on a temp dir, driven through
//! the full router with `oneshot`.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use grocer_server::auth::JwtConfig;
use grocer_server::core::AdminBootstrap;
use grocer_server::{Config, ServerState, api};

pub const ADMIN_EMAIL: &str = "admin@grocer.test";
pub const ADMIN_PASSWORD: &str = "admin-password-123";
pub const PASSWORD: &str = "shopper-password";

pub struct TestApp {
    pub state: ServerState,
    pub app: Router,
    _dir: TempDir,
}

pub struct Response {
    pub status: StatusCode,
    pub body: Value,
    pub request_id: Option<String>,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::with_work_dir(dir.path().to_string_lossy());
        config.jwt = JwtConfig::with_secret("integration-test-secret-0123456789abcdef");
        config.admin = Some(AdminBootstrap {
            email: ADMIN_EMAIL.into(),
            password: ADMIN_PASSWORD.into(),
            username: "admin".into(),
        });

        let state = ServerState::initialize(&config).await.unwrap();
        let app = api::build_app(&state).with_state(state.clone());
        Self {
            state,
            app,
            _dir: dir,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let resp = self.app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let request_id = resp
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        Response {
            status,
            body,
            request_id,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Response {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> Response {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Response {
        self.request(Method::DELETE, uri, token, None).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Value {
        let resp = self
            .post(
                "/api/auth/login",
                None,
                json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "login failed: {}", resp.body);
        resp.body
    }

    pub async fn admin_token(&self) -> String {
        token_of(&self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await)
    }

    /// Register and log in; returns (user_id, access token)
    pub async fn shopper(&self, username: &str) -> (i64, String) {
        let email = format!("{username}@example.com");
        let resp = self
            .post(
                "/api/auth/register",
                None,
                json!({ "username": username, "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "register failed: {}", resp.body);

        let login = self.login(&email, PASSWORD).await;
        (login["user"]["id"].as_i64().unwrap(), token_of(&login))
    }

    /// Admin-created product; returns its id
    pub async fn product(&self, admin: &str, name: &str, price: i64, stock: i64) -> i64 {
        let resp = self
            .post(
                "/api/products",
                Some(admin),
                json!({ "name": name, "price": price, "stock": stock }),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "create product failed: {}", resp.body);
        resp.body["id"].as_i64().unwrap()
    }

    pub async fn add_to_cart(&self, token: &str, product_id: i64, quantity: i64) -> Response {
        self.post(
            "/api/carts/add",
            Some(token),
            json!({ "product_id": product_id, "quantity": quantity }),
        )
        .await
    }

    pub async fn stock_of(&self, product_id: i64) -> i64 {
        let resp = self.get(&format!("/api/products/{product_id}"), None).await;
        resp.body["stock"].as_i64().unwrap()
    }
}

pub fn token_of(login: &Value) -> String {
    login["token"].as_str().unwrap().to_string()
}
