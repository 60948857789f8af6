//! View configuration.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while reading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where and how saved images are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Writable pictures directory.
    pub pictures_dir: PathBuf,
    /// Subdirectory of `pictures_dir` that receives saved images.
    pub subdirectory: String,
    /// File extension for saved images, without the dot.
    pub extension: String,
    /// JPEG quality (1-100).
    pub jpeg_quality: u8,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            pictures_dir: default_pictures_dir(),
            subdirectory: "filters".to_string(),
            extension: "jpg".to_string(),
            jpeg_quality: 90,
        }
    }
}

impl ViewConfig {
    /// Default settings rooted at `dir` instead of the platform pictures
    /// directory.
    pub fn with_pictures_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            pictures_dir: dir.into(),
            ..Self::default()
        }
    }

    /// Directory saved images go into.
    pub fn output_dir(&self) -> PathBuf {
        self.pictures_dir.join(&self.subdirectory)
    }

    pub fn pictures_dir(&self) -> &Path {
        &self.pictures_dir
    }

    /// Parse a JSON config. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Ok(Self::from_json(&json)?)
    }
}

fn default_pictures_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Pictures")))
        .unwrap_or_else(|| PathBuf::from("Pictures"))
}
