//! Configuration loading for Parlor applications
//!
//! Locates the shared Parlor config directory (~/.config/parlor/) and
//! reads or writes JSON files inside it.
//!
//! Call [`init`] at application startup to bootstrap the config directory.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Name of the application directory under the platform config root
const APP_DIR: &str = "parlor";

/// A directory holding Parlor JSON config files
///
/// [`ConfigDir::default_location`] resolves the per-user directory;
/// [`ConfigDir::at`] points somewhere else (tests, portable installs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDir {
    root: PathBuf,
}

impl ConfigDir {
    /// The per-user config directory (~/.config/parlor/ on Linux)
    pub fn default_location() -> Option<Self> {
        dirs::config_dir().map(|p| Self::at(p.join(APP_DIR)))
    }

    /// Use an explicit directory
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a file inside this directory
    pub fn path(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// Check whether a file exists inside this directory
    pub fn exists(&self, filename: &str) -> bool {
        self.path(filename).exists()
    }

    /// Create the directory (and parents) if missing
    pub fn ensure(&self) -> Result<&Path> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create config directory: {}", self.root.display()))?;
        Ok(&self.root)
    }

    /// Load and parse a JSON file from this directory
    pub fn load_json<T: DeserializeOwned>(&self, filename: &str) -> Result<T> {
        load_json_file(&self.path(filename))
    }

    /// Write a value as pretty JSON, creating the directory first
    pub fn save_json<T: Serialize>(&self, filename: &str, value: &T) -> Result<PathBuf> {
        self.ensure()?;
        let path = self.path(filename);
        let content = serde_json::to_string_pretty(value)?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(path)
    }
}

/// Initialize the Parlor config directory.
///
/// Creates ~/.config/parlor/ if it doesn't exist and returns its path.
pub fn init() -> Result<PathBuf> {
    let dir = ConfigDir::default_location().context("Could not determine config directory")?;
    dir.ensure()?;
    Ok(dir.root)
}

/// Get the path to a config file within the default config directory
pub fn config_path(filename: &str) -> Option<PathBuf> {
    ConfigDir::default_location().map(|d| d.path(filename))
}

/// Load and parse a JSON file from an arbitrary path
pub fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}
