// File: src/config.rs
use crate::core::game::DEFAULT_MAX_TRIES;
use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Phoneme length of generated puzzles.
pub const DEFAULT_COLUMNS: usize = 5;

/// Runtime settings. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub max_tries: usize,
    pub columns: usize,
    /// Progress record and asset cache live here.
    pub data_dir: PathBuf,
    pub manifest: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_tries: DEFAULT_MAX_TRIES,
            columns: DEFAULT_COLUMNS,
            data_dir: PathBuf::from(".phonedle"),
            manifest: PathBuf::from("assets/manifest.json"),
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> StoreResult<Self> {
        let raw = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Defaults when no file is given or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> StoreResult<Self> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.data_dir.join("cache")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"max_tries": 8}"#).unwrap();
        assert_eq!(config.max_tries, 8);
        assert_eq!(config.columns, DEFAULT_COLUMNS);
        assert_eq!(config.data_dir, PathBuf::from(".phonedle"));
    }

    #[test]
    fn loads_from_file_or_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert_eq!(GameConfig::load_or_default(Some(path.as_path())).unwrap(), GameConfig::default());

        fs::write(&path, r#"{"columns": 4, "data_dir": "/tmp/phonedle"}"#).unwrap();
        let config = GameConfig::load_or_default(Some(path.as_path())).unwrap();
        assert_eq!(config.columns, 4);
        assert_eq!(config.max_tries, 6);
        assert_eq!(config.cache_dir(), PathBuf::from("/tmp/phonedle/cache"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "max_tries = 6").unwrap();
        assert!(matches!(GameConfig::load(&path), Err(StoreError::Json(_))));
    }
}
