//! Logging Infrastructure
//!
//! Console output plus optional daily rolling files:
//! - `app/`: everything except the security target (cleaned after 14 days)
//! - `security/`: auth failures and permission denials (kept)

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const SECURITY_TARGET: &str = "security";
const APP_LOG_RETENTION_DAYS: i64 = 14;

/// Initialize console-only logging
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}

/// Initialize logging with optional rolling file output
///
/// `RUST_LOG` takes precedence over `level` when set.
///
/// ```no_run
/// // Development: pretty console only
/// grocer_server::init_logger_with_file("debug", false, None)?;
///
/// // Production: JSON console + files
/// grocer_server::init_logger_with_file("info", true, Some("./data/logs"))?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let appenders = match log_dir {
        Some(dir) => {
            let log_dir = Path::new(dir);
            let app_dir = log_dir.join("app");
            let security_dir = log_dir.join(SECURITY_TARGET);
            fs::create_dir_all(&app_dir)?;
            fs::create_dir_all(&security_dir)?;

            tokio::spawn(periodic_cleanup(app_dir.clone()));

            Some((
                RollingFileAppender::new(Rotation::DAILY, app_dir, "app"),
                RollingFileAppender::new(Rotation::DAILY, security_dir, SECURITY_TARGET),
            ))
        }
        None => None,
    };
    let (app_log, security_log) = appenders.unzip();

    let registry = tracing_subscriber::registry().with(env_filter);

    if json_format {
        let console_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_thread_ids(true);

        let app_layer = app_log.map(|writer| {
            fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .with_writer(std::sync::Mutex::new(writer))
                .with_filter(filter_fn(|meta| meta.target() != SECURITY_TARGET))
        });

        let security_layer = security_log.map(|writer| {
            fmt::layer()
                .json()
                .with_target(true)
                .with_writer(std::sync::Mutex::new(writer))
                .with_filter(filter_fn(|meta| meta.target() == SECURITY_TARGET))
        });

        registry
            .with(console_layer)
            .with(app_layer)
            .with(security_layer)
            .try_init()?;
    } else {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true);

        let app_layer = app_log.map(|writer| {
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(writer))
                .with_filter(filter_fn(|meta| meta.target() != SECURITY_TARGET))
        });

        let security_layer = security_log.map(|writer| {
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(writer))
                .with_filter(filter_fn(|meta| meta.target() == SECURITY_TARGET))
        });

        registry
            .with(console_layer)
            .with(app_layer)
            .with(security_layer)
            .try_init()?;
    }

    Ok(())
}

/// Delete `app.YYYY-MM-DD` files older than the retention window
pub fn cleanup_old_logs(app_log_dir: &Path) -> anyhow::Result<usize> {
    let cutoff = chrono::Utc::now().date_naive() - chrono::Duration::days(APP_LOG_RETENTION_DAYS);
    let mut removed = 0;

    for entry in fs::read_dir(app_log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(date_part) = name.strip_prefix("app.") else {
            continue;
        };
        if let Ok(date) = chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            && date < cutoff
        {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }

    Ok(removed)
}

/// Runs hourly for the lifetime of the process
async fn periodic_cleanup(app_log_dir: PathBuf) {
    use tokio::time::{Duration, sleep};

    loop {
        sleep(Duration::from_secs(3600)).await;

        match cleanup_old_logs(&app_log_dir) {
            Ok(0) => {}
            Ok(n) => tracing::info!(removed = n, "Old application logs removed"),
            Err(e) => tracing::error!(error = %e, "Failed to cleanup old logs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_removes_only_expired_app_logs() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("app.2000-01-01");
        let today = dir
            .path()
            .join(format!("app.{}", chrono::Utc::now().format("%Y-%m-%d")));
        let other = dir.path().join("notes.txt");
        for path in [&old, &today, &other] {
            fs::write(path, "x").unwrap();
        }

        let removed = cleanup_old_logs(dir.path()).unwrap();

        assert_eq!(removed, 1);
        assert!(!old.exists());
        assert!(today.exists());
        assert!(other.exists());
    }
}
