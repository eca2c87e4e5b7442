//! Logging Infrastructure
//!
//! Structured logging for development and production:
//! - Console output (pretty in development, JSON in production)
//! - Daily rotating application logs, 14 files kept
//! - Daily rotating security logs (target `security`), never pruned

use std::fs;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::Layered;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, prelude::*};

type BoxedLayer = Box<dyn Layer<Layered<EnvFilter, Registry>> + Send + Sync>;

/// Application log files retained before rotation deletes the oldest
const APP_LOG_RETENTION: usize = 14;

/// Initialize the logging system
///
/// # Arguments
/// * `level` - Log level or filter directive (e.g., "info", "dine_server=debug")
/// * `json_format` - JSON console output (production) instead of pretty output
/// * `log_dir` - Optional directory for file logging
///
/// `RUST_LOG` takes precedence over `level` when set.
pub fn init_logger(level: &str, json_format: bool, log_dir: Option<&str>) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let mut layers: Vec<BoxedLayer> = vec![console_layer(json_format)];

    if let Some(dir) = log_dir {
        let log_dir = Path::new(dir);
        let app_log_dir = log_dir.join("app");
        let security_log_dir = log_dir.join("security");
        fs::create_dir_all(&app_log_dir)?;
        fs::create_dir_all(&security_log_dir)?;

        // Application logs: everything except the security target
        let app_log = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("app")
            .filename_suffix("log")
            .max_log_files(APP_LOG_RETENTION)
            .build(app_log_dir)?;
        layers.push(
            fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::sync::Mutex::new(app_log))
                .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                    meta.target() != "security"
                }))
                .boxed(),
        );

        // Permanent security logs
        let security_log = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("security")
            .filename_suffix("log")
            .build(security_log_dir)?;
        layers.push(
            fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(std::sync::Mutex::new(security_log))
                .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                    meta.target() == "security"
                }))
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()?;
    Ok(())
}

fn console_layer(json_format: bool) -> BoxedLayer {
    if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    }
}

/// Security log helper - records authentication and authorization events
///
/// Events go to target `security` (and the security log file when enabled).
///
/// # Examples
/// ```ignore
/// security_log!(WARN, "auth_failed", username = %name, reason = "invalid_password");
/// security_log!(WARN, "store_access_denied", operator_id = 7, store_id = 3);
/// ```
#[macro_export]
macro_rules! security_log {
    (WARN, $event:expr, $($arg:tt)*) => {
        tracing::warn!(
            target: "security",
            event = $event,
            timestamp = %chrono::Local::now().to_rfc3339(),
            $($arg)*
        );
    };
    (ERROR, $event:expr, $($arg:tt)*) => {
        tracing::error!(
            target: "security",
            event = $event,
            timestamp = %chrono::Local::now().to_rfc3339(),
            $($arg)*
        );
    };
    (INFO, $event:expr, $($arg:tt)*) => {
        tracing::info!(
            target: "security",
            event = $event,
            timestamp = %chrono::Local::now().to_rfc3339(),
            $($arg)*
        );
    };
}
