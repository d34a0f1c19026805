//! Test fixtures: a migrated SQLite file in a temp dir plus seed helpers

use shared::models::{Product, ProductCreate, User, UserRole};
use sqlx::SqlitePool;
use tempfile::TempDir;

use crate::db::DbService;
use crate::db::repository::{product, user};

pub struct TestDb {
    pub pool: SqlitePool,
    // dropped last: deletes the database file
    _dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grocer.db");
        let db = DbService::new(path.to_str().unwrap()).await.unwrap();
        Self {
            pool: db.pool,
            _dir: dir,
        }
    }

    pub async fn seed_user(&self, username: &str) -> User {
        self.seed_with_role(username, UserRole::User).await
    }

    pub async fn seed_admin(&self, username: &str) -> User {
        self.seed_with_role(username, UserRole::Admin).await
    }

    async fn seed_with_role(&self, username: &str, role: UserRole) -> User {
        user::create(
            &self.pool,
            username,
            &format!("{username}@example.com"),
            "not-a-real-hash",
            role,
        )
        .await
        .unwrap()
    }

    pub async fn seed_product(&self, name: &str, price: i64, stock: i64) -> Product {
        product::create(
            &self.pool,
            ProductCreate {
                name: name.to_string(),
                description: None,
                price,
                stock,
                image_url: None,
                category_id: None,
            },
        )
        .await
        .unwrap()
    }
}
