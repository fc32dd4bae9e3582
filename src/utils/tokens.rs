//! Account token file loading

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{FishingError, Result};
use crate::utils::path::get_data_dir;

/// Default token file path
pub fn get_tokens_path() -> PathBuf {
    get_data_dir().join("token.txt")
}

/// One token per line; blank lines and `#` comments are skipped
pub fn parse_tokens(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Read the token file; an unreadable or empty file is a configuration error
pub fn load_tokens(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| {
        FishingError::config(format!("failed to read {}: {}", path.display(), e))
    })?;

    let tokens = parse_tokens(&content);
    if tokens.is_empty() {
        return Err(FishingError::config(format!(
            "no tokens found in {}",
            path.display()
        )));
    }

    tracing::info!("Loaded {} token(s) from {:?}", tokens.len(), path);
    Ok(tokens)
}
