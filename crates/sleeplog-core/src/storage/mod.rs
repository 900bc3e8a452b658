mod config;
pub mod diary_db;

pub use config::{Config, GridConfig, PatientConfig, SrtConfig, UiConfig};
pub use diary_db::{parse_entries_json, DiaryDb};

use std::path::PathBuf;

use crate::error::{Result, StorageError};

/// Returns the diary's data directory, creating it if needed.
///
/// `SLEEPLOG_DATA_DIR` wins when set. Otherwise `~/.config/sleeplog/`, or
/// `~/.config/sleeplog-dev/` with `SLEEPLOG_ENV=dev`.
///
/// # Errors
/// Returns [`StorageError::DataDir`] if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("SLEEPLOG_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("SLEEPLOG_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("sleeplog-dev")
            } else {
                base_dir.join("sleeplog")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
