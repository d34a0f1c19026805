use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveTime;
use chrono_tz::Tz;

use crate::auth::JwtConfig;
use crate::utils::time::{DEFAULT_TIMEZONE, parse_cutoff, parse_timezone};

/// Fixed pickup counter address
pub const DEFAULT_STORE_LOCATION: &str =
    "32/2 ถ.สมภารคง ต.รั้วใหญ่ อ.เมืองสุพรรณบุรี จ.สุพรรณบุรี 72000";

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./data | database and log root |
/// | DATABASE_PATH | `<WORK_DIR>/grocer.db` | SQLite file |
/// | HTTP_PORT | 5000 | HTTP listen port |
/// | ENVIRONMENT | development | development / staging / production |
/// | LOG_LEVEL | info | default filter (RUST_LOG wins) |
/// | LOG_JSON | false | JSON console output |
/// | LOG_DIR | unset | rolling file output |
/// | REQUEST_TIMEOUT_MS | 30000 | per-request timeout |
/// | STORE_* / PICKUP_* | see [`StoreConfig`] | |
/// | ADMIN_* | unset | see [`AdminBootstrap`] |
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub database_path: String,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
    pub request_timeout_ms: u64,
    pub jwt: JwtConfig,
    pub store: StoreConfig,
    pub admin: Option<AdminBootstrap>,
}

/// Store-side settings used by the order engine
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// STORE_TIMEZONE (default Asia/Bangkok)
    pub timezone: Tz,
    /// PICKUP_WINDOW_HOURS (default 8)
    pub pickup_window_hours: i64,
    /// PICKUP_CUTOFF, HH:MM local (default 19:30)
    pub pickup_cutoff: NaiveTime,
    /// STORE_LOCATION
    pub location: String,
}

impl StoreConfig {
    pub const DEFAULT_WINDOW_HOURS: i64 = 8;

    pub fn default_cutoff() -> NaiveTime {
        NaiveTime::from_hms_opt(19, 30, 0).unwrap_or(NaiveTime::MIN)
    }

    pub fn from_env() -> Self {
        let timezone = std::env::var("STORE_TIMEZONE")
            .map(|tz| parse_timezone(&tz))
            .unwrap_or(DEFAULT_TIMEZONE);
        let pickup_cutoff = std::env::var("PICKUP_CUTOFF")
            .map(|c| parse_cutoff(&c, Self::default_cutoff()))
            .unwrap_or_else(|_| Self::default_cutoff());

        let mut pickup_window_hours = env_parse("PICKUP_WINDOW_HOURS", Self::DEFAULT_WINDOW_HOURS);
        if pickup_window_hours <= 0 {
            tracing::warn!(
                value = pickup_window_hours,
                "PICKUP_WINDOW_HOURS must be positive, using default"
            );
            pickup_window_hours = Self::DEFAULT_WINDOW_HOURS;
        }

        Self {
            timezone,
            pickup_window_hours,
            pickup_cutoff,
            location: std::env::var("STORE_LOCATION")
                .unwrap_or_else(|_| DEFAULT_STORE_LOCATION.to_string()),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE,
            pickup_window_hours: Self::DEFAULT_WINDOW_HOURS,
            pickup_cutoff: Self::default_cutoff(),
            location: DEFAULT_STORE_LOCATION.to_string(),
        }
    }
}

/// Admin account created at startup when missing
///
/// Only present when both ADMIN_EMAIL and ADMIN_PASSWORD are set.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
    /// ADMIN_USERNAME (default "admin")
    pub username: String,
}

impl AdminBootstrap {
    fn from_env() -> Option<Self> {
        let email = std::env::var("ADMIN_EMAIL").ok()?;
        let password = std::env::var("ADMIN_PASSWORD").ok()?;
        Some(Self {
            email,
            password,
            username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into()),
        })
    }
}

/// Read and parse an env var, warning and falling back on malformed input
fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, default = %default, "Malformed config value, using default");
            default
        }),
        Err(_) => default,
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Call `dotenv::dotenv()` beforehand to pick up a `.env` file.
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        let database_path = std::env::var("DATABASE_PATH")
            .unwrap_or_else(|_| default_database_path(&work_dir));

        Self {
            database_path,
            http_port: env_parse("HTTP_PORT", 5000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_parse("LOG_JSON", false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty()),
            request_timeout_ms: env_parse("REQUEST_TIMEOUT_MS", 30_000),
            jwt: JwtConfig::default(),
            store: StoreConfig::from_env(),
            admin: AdminBootstrap::from_env(),
            work_dir,
        }
    }

    /// Same as [`Config::from_env`] with the work dir (and database) relocated
    ///
    /// Used by tests to point at a temp directory.
    pub fn with_work_dir(work_dir: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.database_path = default_database_path(&config.work_dir);
        config.admin = None;
        config
    }

    pub fn database_dir(&self) -> PathBuf {
        Path::new(&self.database_path)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(&self.work_dir))
    }

    /// Create the work dir and the database parent directory
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.work_dir)?;
        std::fs::create_dir_all(self.database_dir())?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn default_database_path(work_dir: &str) -> String {
    Path::new(work_dir)
        .join("grocer.db")
        .to_string_lossy()
        .into_owned()
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_work_dir_relocates_database() {
        let config = Config::with_work_dir("/tmp/grocer-test");
        assert_eq!(
            Path::new(&config.database_path),
            Path::new("/tmp/grocer-test/grocer.db")
        );
        assert_eq!(config.database_dir(), PathBuf::from("/tmp/grocer-test"));
        assert!(config.admin.is_none());
    }

    #[test]
    fn test_store_defaults() {
        let store = StoreConfig::default();
        assert_eq!(store.timezone, chrono_tz::Asia::Bangkok);
        assert_eq!(store.pickup_window_hours, 8);
        assert_eq!(store.pickup_cutoff.format("%H:%M").to_string(), "19:30");
    }

    #[test]
    fn test_env_parse_falls_back_on_garbage() {
        // key unique to this test
        unsafe { std::env::set_var("GROCER_TEST_ENV_PARSE_PORT", "not-a-port") };
        assert_eq!(env_parse::<u16>("GROCER_TEST_ENV_PARSE_PORT", 5000), 5000);
        unsafe { std::env::remove_var("GROCER_TEST_ENV_PARSE_PORT") };
        assert_eq!(env_parse::<u16>("GROCER_TEST_ENV_PARSE_PORT", 5000), 5000);
    }
}
