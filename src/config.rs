//! Optional `voxlen.toml` settings

use crate::error::{Error, Result};
use crate::timeline::DEFAULT_TITLE_SECS;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "voxlen.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding `<script-id>.json` records
    pub store_dir: PathBuf,
    /// Directory holding `<script-id>/audio/scene-NN.mp3` clips
    pub media_dir: PathBuf,
    /// Length of the title card shown before the first scene
    pub title_secs: f64,
    pub fps: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(".script-store"),
            media_dir: PathBuf::from(".media-store"),
            title_secs: DEFAULT_TITLE_SECS,
            fps: 30,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        toml::from_str(&content).map_err(|source| Error::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load an explicitly requested file, or the default file if it exists.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
