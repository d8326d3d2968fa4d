use std::path::Path;

use tracing::{debug, info};

use super::SecretsConfig;
use crate::utils::ConfigError;

const PLACEHOLDER_KEY: &str = "your-api-key";

/// 按 secrets 文件 -> 环境变量的顺序查找 API key，两处都没有则报错
pub fn resolve_api_key(secrets: &SecretsConfig) -> Result<String, ConfigError> {
    if let Some(key) = read_secrets_file(Path::new(&secrets.path), &secrets.key)? {
        info!("从 {} 读取 API key", secrets.path);
        return Ok(key);
    }

    if let Some(key) = std::env::var(&secrets.env_var).ok().and_then(usable) {
        info!("从环境变量 {} 读取 API key", secrets.env_var);
        return Ok(key);
    }

    Err(ConfigError::MissingCredential)
}

fn read_secrets_file(path: &Path, key: &str) -> Result<Option<String>, ConfigError> {
    if !path.exists() {
        debug!("secrets 文件不存在: {}", path.display());
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let table: toml::Table = toml::from_str(&content)?;

    Ok(table
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .and_then(usable))
}

fn usable(key: String) -> Option<String> {
    let key = key.trim();
    if key.is_empty() || key == PLACEHOLDER_KEY {
        None
    } else {
        Some(key.to_string())
    }
}
