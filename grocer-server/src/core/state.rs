//! Server State
//!
//! Everything a handler needs, cloned cheaply into each request.

use std::sync::Arc;

use shared::models::UserRole;
use sqlx::SqlitePool;

use crate::auth::{JwtService, password};
use crate::core::{AdminBootstrap, Config, Result};
use crate::db::DbService;
use crate::db::repository::user;
use crate::live::ConnectionHub;
use crate::notifications::NotificationService;
use crate::orders::OrderEngine;

#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    /// SQLite pool (WAL)
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    /// Live WebSocket connections by user
    pub hub: ConnectionHub,
    pub notifications: NotificationService,
    pub orders: OrderEngine,
}

impl ServerState {
    /// Initialize server state
    ///
    /// In order:
    /// 1. Work dir and database directory
    /// 2. JWT configuration check
    /// 3. Database (migrations applied)
    /// 4. Admin bootstrap, when configured
    pub async fn initialize(config: &Config) -> Result<Self> {
        config.ensure_work_dir_structure()?;
        config.jwt.validate()?;

        let db = DbService::new(&config.database_path).await?;
        let state = Self::from_pool(config.clone(), db.pool);

        if let Some(admin) = &config.admin {
            state.bootstrap_admin(admin).await?;
        }
        Ok(state)
    }

    /// Wire services around an already-migrated pool
    pub fn from_pool(config: Config, pool: SqlitePool) -> Self {
        let hub = ConnectionHub::new();
        let notifications = NotificationService::new(pool.clone(), hub.clone());
        let orders = OrderEngine::new(pool.clone(), notifications.clone(), config.store.clone());
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Self {
            config,
            pool,
            jwt_service,
            hub,
            notifications,
            orders,
        }
    }

    async fn bootstrap_admin(&self, admin: &AdminBootstrap) -> Result<()> {
        let email = admin.email.trim().to_lowercase();
        if user::find_by_email(&self.pool, &email).await?.is_some() {
            tracing::debug!(email = %email, "Admin account already present");
            return Ok(());
        }

        let hash = password::hash_password(&admin.password)?;
        let created = user::create(&self.pool, &admin.username, &email, &hash, UserRole::Admin).await?;
        tracing::info!(user_id = created.id, email = %email, "Admin account created");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initialize_bootstraps_admin_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::with_work_dir(dir.path().to_string_lossy());
        config.admin = Some(AdminBootstrap {
            email: "Owner@Example.com".into(),
            password: "correct horse battery".into(),
            username: "owner".into(),
        });

        let state = ServerState::initialize(&config).await.unwrap();
        let admin = user::find_by_email(&state.pool, "owner@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, UserRole::Admin);
        assert!(password::verify_password("correct horse battery", &admin.password_hash));

        // second start finds the existing account
        state
            .bootstrap_admin(config.admin.as_ref().unwrap())
            .await
            .unwrap();
        assert_eq!(user::find_admin_ids(&state.pool).await.unwrap().len(), 1);
    }
}
