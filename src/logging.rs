use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::app_cache_dir;

/// File-only subscriber; the terminal belongs to the UI. Keep the guard alive until exit.
pub fn init_tracing(file_name: &str) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let log_dir = app_cache_dir()
        .map(|dir| dir.join("logs"))
        .unwrap_or_else(|| "logs".into());
    let file_appender = tracing_appender::rolling::daily(log_dir, file_name);
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer)
        .with_target(true);

    let init_result = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init();
    if let Err(err) = init_result {
        eprintln!("tracing init failed: {err}");
        return None;
    }

    Some(file_guard)
}
