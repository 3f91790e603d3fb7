use tracing_appender::non_blocking::NonBlocking;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::Config;

/// Set up application logging based on configuration
pub fn setup_logging(config: &Config) -> tracing_appender::non_blocking::WorkerGuard {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level()));

    if let Some(path) = config.log_file_path() {
        let (file_writer, guard) = create_file_logger(path);

        let subscriber = FmtSubscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(file_writer)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set global tracing subscriber");

        guard
    } else {
        // No file configured: log to stderr so command output stays clean
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set global tracing subscriber");

        // The guard type is tied to a non-blocking writer, so hand back one
        // wrapping a writer that is never used
        let (_unused_writer, guard) = tracing_appender::non_blocking(
            tracing_appender::rolling::never(std::env::temp_dir(), "unused.log"),
        );
        guard
    }
}

fn create_file_logger(path: &str) -> (NonBlocking, tracing_appender::non_blocking::WorkerGuard) {
    let log_path = std::path::PathBuf::from(path);
    let log_dir = log_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| std::env::current_dir().expect("Current directory not accessible"))
                .join("cv-desk")
                .join("logs")
        });

    std::fs::create_dir_all(&log_dir).expect("Failed to create log directory");

    let log_file_name = log_path
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("cv-desk.log"));

    let file_appender = tracing_appender::rolling::never(&log_dir, log_file_name);
    tracing_appender::non_blocking(file_appender)
}
