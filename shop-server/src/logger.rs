//! Logging setup
//!
//! Console logging by default; a daily-rolling log file when `LOG_DIR`
//! points at an existing directory.

use std::path::Path;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "shop_server=info,tower_http=info";

/// Initialize tracing from `RUST_LOG` and the optional `LOG_DIR`.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if let Ok(dir) = std::env::var("LOG_DIR")
        && Path::new(&dir).exists()
    {
        let file_appender = tracing_appender::rolling::daily(&dir, "shop-server");
        subscriber.with_writer(file_appender).with_ansi(false).init();
        return;
    }

    subscriber.init();
}
