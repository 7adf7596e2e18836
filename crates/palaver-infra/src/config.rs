//! Configuration loader for Palaver.
//!
//! Reads `config.toml` from the data directory (`~/.palaver/` in production)
//! into [`ChatConfig`], then applies environment overrides. Falls back to
//! defaults when the file is missing or malformed.

use std::path::{Path, PathBuf};

use palaver_types::config::ChatConfig;
use palaver_types::error::ConfigError;

/// File name of the configuration file inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Overrides `system_prompt_template`.
pub const ENV_SYSTEM_PROMPT: &str = "PALAVER_SYSTEM_PROMPT";
/// Overrides `model`.
pub const ENV_MODEL: &str = "PALAVER_MODEL";
/// Overrides `base_url`.
pub const ENV_BASE_URL: &str = "PALAVER_BASE_URL";

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Strictly read `{data_dir}/config.toml`.
///
/// Returns `Ok(None)` when the file does not exist.
pub async fn read_chat_config(data_dir: &Path) -> Result<Option<ChatConfig>, ConfigError> {
    let path = config_path(data_dir);

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                reason: err.to_string(),
            });
        }
    };

    toml::from_str::<ChatConfig>(&content)
        .map(Some)
        .map_err(|err| ConfigError::Parse {
            path: path.display().to_string(),
            reason: err.to_string(),
        })
}

/// Load the effective configuration.
///
/// - Missing file: defaults.
/// - Unreadable or malformed file: logs a warning and uses defaults.
/// - Environment overrides are applied last in every case.
pub async fn load_chat_config(data_dir: &Path) -> ChatConfig {
    let config = match read_chat_config(data_dir).await {
        Ok(Some(config)) => config,
        Ok(None) => {
            tracing::debug!(
                "No {CONFIG_FILE} found in {}, using defaults",
                data_dir.display()
            );
            ChatConfig::default()
        }
        Err(err) => {
            tracing::warn!("{err}, using defaults");
            ChatConfig::default()
        }
    };

    apply_env_overrides(config, |key| std::env::var(key).ok())
}

/// Apply `PALAVER_*` overrides using `lookup` to read variables.
///
/// Blank values are ignored.
pub fn apply_env_overrides(
    mut config: ChatConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> ChatConfig {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(prompt) = get(ENV_SYSTEM_PROMPT) {
        config.system_prompt_template = Some(prompt);
    }
    if let Some(model) = get(ENV_MODEL) {
        config.model = model;
    }
    if let Some(base_url) = get(ENV_BASE_URL) {
        config.base_url = base_url;
    }
    config
}
