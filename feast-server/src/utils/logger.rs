//! Logging Infrastructure
//!
//! Structured logging setup with support for both development and
//! production environments.

use std::path::Path;

/// Initialize the logger
///
/// `RUST_LOG` controls filtering; defaults to `info`. If `LOG_DIR`
/// points at an existing directory, output additionally rolls daily
/// into `feast-server.*` files there.
pub fn init_logger() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Ok(dir) = std::env::var("LOG_DIR") {
        let log_path = Path::new(&dir);
        if log_path.exists() {
            let file_appender = tracing_appender::rolling::daily(&dir, "feast-server");
            subscriber.with_writer(file_appender).init();
            return;
        }
    }

    subscriber.init();
}
