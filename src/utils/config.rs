use super::changelog::ParserConfig;
use super::reader::DEFAULT_CHUNK_SIZE;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

pub const CONFIG_FILE_NAME: &str = "changelog-lint.toml";

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

/// main configuration for changelog-lint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintConfig {
    /// parser options
    #[serde(default)]
    pub parser: ParserConfig,

    /// bytes read from the changelog per chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl LintConfig {
    /// load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::error::Error::FileReadError {
                path: path.to_path_buf(),
                source: e,
            })?;

        let config: LintConfig =
            toml::from_str(&contents).map_err(|e| crate::error::Error::ConfigParseError {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(config)
    }

    /// find and load the configuration file in `dir`
    ///
    /// returns the default config if the file is missing or unreadable
    pub fn load_or_default<P: AsRef<Path>>(dir: P) -> Self {
        match Self::find_config_file(&dir) {
            Some(config_path) => Self::load_from_file(&config_path).unwrap_or_else(|e| {
                warn!("ignoring config file: {}", e);
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// looks for `changelog-lint.toml` in `dir`
    pub fn find_config_file<P: AsRef<Path>>(dir: P) -> Option<PathBuf> {
        let config_path = dir.as_ref().join(CONFIG_FILE_NAME);

        if config_path.is_file() {
            Some(config_path)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: LintConfig = toml::from_str("[parser]\nrelease_today = true\n").unwrap();
        assert!(config.parser.release_today);
        assert!(!config.parser.strict);
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_empty_config() {
        let config: LintConfig = toml::from_str("").unwrap();
        assert_eq!(config, LintConfig::default());
    }
}
