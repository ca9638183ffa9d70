//! Data directory layout.

use std::path::PathBuf;

pub const DATA_DIR_ENV: &str = "ALERTHUB_DATA_DIR";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `ALERTHUB_DATA_DIR` environment variable
/// 2. `~/.alerthub`
/// 3. `./.alerthub`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".alerthub");
    }

    PathBuf::from(".alerthub")
}
