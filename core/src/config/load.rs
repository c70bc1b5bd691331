use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::types::AppConfig;

pub const CONFIG_ENV: &str = "OPSGATE_CONFIG";
pub const BOOTSTRAP_ENV: &str = "OPSGATE_BOOTSTRAP";

const LOCAL_CONFIG_FILE: &str = "opsgate.toml";

pub fn load_default() -> Result<AppConfig, ConfigError> {
    let mut cfg = match resolve_config_path()? {
        Some(path) => load_from_path(&path)?,
        None => AppConfig::default(),
    };

    if let Ok(v) = std::env::var("OPSGATE_STATE_FILE") {
        if !v.trim().is_empty() {
            cfg.state_file = v;
        }
    }
    if let Ok(v) = std::env::var("OPSGATE_LOG") {
        if !v.trim().is_empty() {
            cfg.logging.level = v;
        }
    }
    if let Ok(v) = std::env::var("OPSGATE_REMOTE_CHECKS") {
        if v.trim() == "false" {
            cfg.remote.enabled = false;
        }
    }

    Ok(cfg)
}

pub fn load_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg = toml::from_str::<AppConfig>(&s).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if cfg.remote.max_concurrency == 0 {
        return Err(ConfigError::Validation(
            "remote.max_concurrency must be at least 1".to_string(),
        ));
    }
    Ok(cfg)
}

/// Bootstrap mode is on only when the variable is exactly `true`.
pub fn bootstrap_from_env() -> bool {
    std::env::var(BOOTSTRAP_ENV)
        .map(|v| v == "true")
        .unwrap_or(false)
}

fn resolve_config_path() -> Result<Option<PathBuf>, ConfigError> {
    if let Ok(v) = std::env::var(CONFIG_ENV) {
        if !v.trim().is_empty() {
            let p = PathBuf::from(shellexpand::tilde(&v).into_owned());
            if !p.is_file() {
                return Err(ConfigError::NotFound(p));
            }
            return Ok(Some(p));
        }
    }

    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Ok(Some(local));
    }

    Ok(dirs::config_dir()
        .map(|d| d.join("opsgate").join("config.toml"))
        .filter(|p| p.is_file()))
}
