use super::Config;
use crate::error::ConfigError;
use directories::UserDirs;
use std::fs;
use std::path::{Path, PathBuf};

impl Config {
    /// Default config location: `~/.calmline/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        UserDirs::new().map(|u| u.home_dir().join(".calmline").join("config.toml"))
    }

    /// Load config from `explicit` (must exist) or the default location
    /// (optional), then apply environment overrides and validate.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: Config = toml::from_str(&contents).map_err(|e| ConfigError::Load {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }
}
