//! Data directory resolution.
//!
//! The data directory holds `palaver.db` and `config.toml`. It is
//! `$PALAVER_DATA_DIR` when set, otherwise `~/.palaver`.

use std::path::{Path, PathBuf};

/// Overrides the data directory.
pub const ENV_DATA_DIR: &str = "PALAVER_DATA_DIR";

/// Resolve the data directory from the environment and the home directory.
pub fn resolve_data_dir() -> PathBuf {
    data_dir_from(std::env::var(ENV_DATA_DIR).ok(), dirs::home_dir())
}

/// Pure resolution rule, separated for testing.
pub fn data_dir_from(env_value: Option<String>, home: Option<PathBuf>) -> PathBuf {
    match env_value.filter(|v| !v.trim().is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => home
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".palaver"),
    }
}

/// Create the data directory (and parents) if it does not exist.
pub async fn ensure_data_dir(data_dir: &Path) -> std::io::Result<()> {
    tokio::fs::create_dir_all(data_dir).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_value_wins() {
        let dir = data_dir_from(Some("/srv/palaver".into()), Some(PathBuf::from("/home/a")));
        assert_eq!(dir, PathBuf::from("/srv/palaver"));
    }

    #[test]
    fn falls_back_to_home() {
        let dir = data_dir_from(None, Some(PathBuf::from("/home/a")));
        assert_eq!(dir, PathBuf::from("/home/a/.palaver"));

        let dir = data_dir_from(Some(String::new()), Some(PathBuf::from("/home/a")));
        assert_eq!(dir, PathBuf::from("/home/a/.palaver"));
    }

    #[test]
    fn no_home_uses_current_dir() {
        assert_eq!(data_dir_from(None, None), PathBuf::from("./.palaver"));
    }

    #[tokio::test]
    async fn ensure_creates_nested_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        ensure_data_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        // Idempotent.
        ensure_data_dir(&nested).await.unwrap();
    }
}
