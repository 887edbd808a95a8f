//! Service configuration, read from `FACEGATE_*` environment variables.
use std::path::{Path, PathBuf};

use facegate_engine::EngineConfig;
use thiserror::Error;

pub const DEFAULT_ADDR: &str = "0.0.0.0:1907";
pub const DEFAULT_ENGINE_ROOT: &str = "..";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
/// Engine image directory, relative to the engine root
pub const DEFAULT_IMAGES_SUBDIR: &str = "database/main_images";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key}={value:?} is not valid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("cannot determine working directory: {0}")]
    WorkingDir(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub addr: String,
    pub engine: EngineConfig,
    /// Served under `/images`
    pub images_dir: PathBuf,
    /// Where uploads are staged
    pub scratch_dir: PathBuf,
    /// Custom fragment templates; embedded ones when `None`
    pub templates_path: Option<String>,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let engine_root = absolute(Path::new(
            &get("FACEGATE_ENGINE_ROOT").unwrap_or_else(|| DEFAULT_ENGINE_ROOT.to_string()),
        ))?;

        let mut engine = EngineConfig::new(engine_root.clone());
        if let Some(bin) = get("FACEGATE_ENGINE_BIN") {
            engine = engine.with_executable(bin);
        }
        if let Some(script) = get("FACEGATE_ENGINE_SCRIPT") {
            engine = engine.with_entry_script(script);
        }
        let max_procs = get("FACEGATE_MAX_ENGINE_PROCS")
            .map(|v| parse_positive("FACEGATE_MAX_ENGINE_PROCS", v))
            .transpose()?;
        engine = engine.with_max_concurrent(max_procs);

        let images_dir = get("FACEGATE_IMAGES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| engine_root.join(DEFAULT_IMAGES_SUBDIR));
        let scratch_dir = get("FACEGATE_SCRATCH_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);
        let max_upload_bytes = get("FACEGATE_MAX_UPLOAD_BYTES")
            .map(|v| parse_positive("FACEGATE_MAX_UPLOAD_BYTES", v))
            .transpose()?
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        Ok(Self {
            addr: get("FACEGATE_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string()),
            engine,
            images_dir,
            scratch_dir,
            templates_path: get("FACEGATE_TEMPLATES"),
            max_upload_bytes,
        })
    }
}

fn parse_positive(key: &'static str, value: String) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err(ConfigError::Invalid { key, value, reason: "must be greater than zero".into() }),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::Invalid { key, value, reason: e.to_string() }),
    }
}

fn absolute(path: &Path) -> Result<PathBuf, ConfigError> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.addr, DEFAULT_ADDR);
        assert!(config.engine.project_root.is_absolute());
        assert!(config.images_dir.ends_with(DEFAULT_IMAGES_SUBDIR));
        assert_eq!(config.engine.max_concurrent, None);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(config.templates_path.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("FACEGATE_ADDR", "127.0.0.1:9000"),
            ("FACEGATE_ENGINE_ROOT", "/srv/engine"),
            ("FACEGATE_ENGINE_BIN", "/usr/bin/python3"),
            ("FACEGATE_MAX_ENGINE_PROCS", "4"),
            ("FACEGATE_SCRATCH_DIR", "/var/tmp/facegate"),
        ])
        .unwrap();
        assert_eq!(config.addr, "127.0.0.1:9000");
        assert_eq!(config.engine.resolved_executable(), PathBuf::from("/usr/bin/python3"));
        assert_eq!(config.engine.resolved_entry_script(), PathBuf::from("/srv/engine/cli.py"));
        assert_eq!(config.images_dir, PathBuf::from("/srv/engine/database/main_images"));
        assert_eq!(config.scratch_dir, PathBuf::from("/var/tmp/facegate"));
        assert_eq!(config.engine.max_concurrent, Some(4));
    }

    #[test]
    fn test_invalid_numbers() {
        assert!(matches!(
            config(&[("FACEGATE_MAX_ENGINE_PROCS", "many")]),
            Err(ConfigError::Invalid { key: "FACEGATE_MAX_ENGINE_PROCS", .. })
        ));
        assert!(matches!(
            config(&[("FACEGATE_MAX_UPLOAD_BYTES", "0")]),
            Err(ConfigError::Invalid { key: "FACEGATE_MAX_UPLOAD_BYTES", .. })
        ));
    }
}
