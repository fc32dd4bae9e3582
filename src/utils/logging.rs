//! Tracing subscriber setup: stdout plus an append-only log file

use std::path::Path;

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Default filter: our crate at info, chatty dependencies at warn
pub const LOG_FILTER: &str = "info,frenzy_angler=info,reqwest=warn,hyper=warn,hyper_util=warn,tungstenite=warn,tokio_tungstenite=warn,native_tls=warn,mio=warn,want=warn";

const LOG_FILE_NAME: &str = "angler.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(LOG_FILTER))
}

/// Install the global subscriber; falls back to stdout only if the log file
/// cannot be opened
pub fn init_logging(log_dir: &Path) {
    let _ = std::fs::create_dir_all(log_dir);
    let log_file_path = log_dir.join(LOG_FILE_NAME);

    let file_result = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path);

    match file_result {
        Ok(file) => {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .with_span_events(FmtSpan::NONE);

            let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);

            tracing_subscriber::registry()
                .with(env_filter())
                .with(file_layer)
                .with(stdout_layer)
                .init();

            tracing::debug!("[INIT] Logging initialized, file: {:?}", log_file_path);
        }
        Err(e) => {
            tracing_subscriber::fmt().with_env_filter(env_filter()).init();
            eprintln!(
                "[INIT] Failed to create log file at {:?}: {}",
                log_file_path, e
            );
        }
    }
}
