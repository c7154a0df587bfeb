//! Key-value persistence.
//!
//! Values are JSON documents addressed by a short key (`settings`,
//! `history`). [`FileStore`] keeps one `<key>.json` per key under a base
//! directory; [`MemoryStore`] keeps them in a map for tests.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ConfigError;

pub trait Store {
    /// Raw stored document, `None` if the key was never written.
    fn get_raw(&self, key: &str) -> Result<Option<String>, ConfigError>;
    fn set_raw(&mut self, key: &str, value: &str) -> Result<(), ConfigError>;
    fn remove(&mut self, key: &str) -> Result<(), ConfigError>;
}

/// Typed access on top of any [`Store`].
pub trait StoreExt: Store {
    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        let Some(raw) = self.get_raw(key)? else {
            return Ok(None);
        };
        let cleaned = strip_comments(&raw);
        serde_json::from_str(&cleaned)
            .map(Some)
            .map_err(|e| ConfigError::Serde { key: key.to_string(), message: e.to_string() })
    }

    fn save<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| ConfigError::Serde { key: key.to_string(), message: e.to_string() })?;
        self.set_raw(key, &json)
    }
}

impl<S: Store + ?Sized> StoreExt for S {}

/// Drop whole-line `//` comments so hand-edited files still parse.
fn strip_comments(contents: &str) -> String {
    contents
        .lines()
        .filter(|line| !line.trim().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `~/.config/numbot` (platform equivalent), or `./numbot` without a
    /// config dir.
    pub fn default_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("numbot")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new(Self::default_dir())
    }
}

impl Store for FileStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => {
                log::debug!("read {} ({} bytes)", path.display(), contents.len());
                Ok(Some(contents))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ConfigError::Io(format!("{}: {e}", path.display()))),
        }
    }

    fn set_raw(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", self.dir.display())))?;
        let path = self.path_for(key);
        fs::write(&path, value).map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        log::debug!("wrote {}", path.display());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), ConfigError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ConfigError::Io(format!("{}: {e}", path.display()))),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.values.get(key).cloned())
    }

    fn set_raw(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), ConfigError> {
        self.values.remove(key);
        Ok(())
    }
}
