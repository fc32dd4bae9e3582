//! Path utilities for finding data directories

use std::env;
use std::path::PathBuf;

/// Returns the folder where the token file, config and logs live.
/// Uses the executable directory when it carries a `config` folder or a
/// `token.txt` next to it, otherwise the current working directory.
pub fn get_data_dir() -> PathBuf {
    if let Ok(exe_path) = env::current_exe() {
        if let Some(parent) = exe_path.parent() {
            if parent.join("config").exists() || parent.join("token.txt").exists() {
                return parent.to_path_buf();
            }
        }
    }

    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Directory for the append-only log file
pub fn get_log_dir() -> PathBuf {
    get_data_dir().join("logs")
}
