//! Compiler configuration, read from a TOML file.
//!
//! ```toml
//! libraries = ["libs/geometry.json"]
//! deny_warnings = false
//! log_level = "debug"
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External library metadata files to import before analysis.
    pub libraries: Vec<PathBuf>,
    /// Treat warnings like errors when deciding whether to generate code.
    pub deny_warnings: bool,
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            libraries: vec![],
            deny_warnings: true,
            log_level: None,
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Config, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Config::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.deny_warnings);
    }

    #[test]
    fn test_config_fields() {
        let config = Config::from_toml_str(
            "libraries = [\"a.json\", \"b.json\"]\ndeny_warnings = false\nlog_level = \"trace\"\n",
        )
        .unwrap();

        assert_eq!(
            config.libraries,
            vec![PathBuf::from("a.json"), PathBuf::from("b.json")]
        );
        assert!(!config.deny_warnings);
        assert_eq!(config.log_level.as_deref(), Some("trace"));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(Config::from_toml_str("deny_warnings = \"yes\"").is_err());
    }

    #[test]
    fn test_missing_file() {
        let error = Config::load(Path::new("/definitely/not/tern.toml")).unwrap_err();
        assert!(matches!(error, ConfigError::Io { .. }));
    }
}
