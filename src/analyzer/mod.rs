use crate::error::{Error, Result};
use crate::mp3::{self, ScanStatus};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Measurement of a single clip
#[derive(Debug, Clone, Serialize)]
pub struct ClipAnalysis {
    pub file_path: String,
    pub file_name: String,
    pub bytes: usize,
    pub duration_secs: f64,
    pub frame_count: usize,
    pub status: ClipStatus,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClipStatus {
    Measured,
    NoFrames,
    Error,
}

impl From<ScanStatus> for ClipStatus {
    fn from(status: ScanStatus) -> Self {
        match status {
            ScanStatus::Measured => ClipStatus::Measured,
            ScanStatus::NoFrames => ClipStatus::NoFrames,
        }
    }
}

impl std::fmt::Display for ClipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClipStatus::Measured => write!(f, "MEASURED"),
            ClipStatus::NoFrames => write!(f, "NO_FRAMES"),
            ClipStatus::Error => write!(f, "ERROR"),
        }
    }
}

impl ClipAnalysis {
    /// Measured duration, or `None` when the clip could not be read.
    pub fn duration(&self) -> Option<f64> {
        match self.status {
            ClipStatus::Error => None,
            _ => Some(self.duration_secs),
        }
    }
}

/// Reads clips from disk and measures them
pub struct Analyzer {
    /// Descend into subdirectories when collecting clips
    pub recursive: bool,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self { recursive: true }
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Analyze a single clip file
    pub fn analyze<P: AsRef<Path>>(&self, path: P) -> ClipAnalysis {
        let path = path.as_ref();
        let file_path = path.display().to_string();

        match std::fs::read(path) {
            Ok(data) => self.analyze_bytes(&file_path, &data),
            Err(e) => {
                warn!(path = %file_path, error = %e, "failed to read clip");
                ClipAnalysis {
                    file_name: file_name(path, &file_path),
                    file_path,
                    bytes: 0,
                    duration_secs: 0.0,
                    frame_count: 0,
                    status: ClipStatus::Error,
                    error: Some(format!("Failed to read file: {}", e)),
                }
            }
        }
    }

    /// Analyze a clip that is already in memory
    pub fn analyze_bytes(&self, file_path: &str, data: &[u8]) -> ClipAnalysis {
        let scan = mp3::scan(data);
        debug!(path = %file_path, seconds = scan.seconds, frames = scan.frame_count, "measured clip");

        ClipAnalysis {
            file_path: file_path.to_string(),
            file_name: file_name(Path::new(file_path), file_path),
            bytes: data.len(),
            duration_secs: scan.seconds,
            frame_count: scan.frame_count,
            status: scan.status().into(),
            error: None,
        }
    }

    /// Analyze clips in parallel, returning results in input order
    pub fn analyze_all(&self, paths: &[PathBuf]) -> Vec<ClipAnalysis> {
        paths.par_iter().map(|p| self.analyze(p)).collect()
    }

    /// Find `.mp3` files under `dir`, sorted by path
    pub fn collect<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let mut paths = Vec::new();
        for entry in WalkDir::new(dir).max_depth(max_depth) {
            let entry = entry.map_err(|source| Error::Walk {
                path: dir.to_path_buf(),
                source,
            })?;
            if entry.file_type().is_file() && is_mp3(entry.path()) {
                paths.push(entry.into_path());
            }
        }

        paths.sort();
        Ok(paths)
    }
}

fn is_mp3(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("mp3"))
}

fn file_name(path: &Path, fallback: &str) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| fallback.to_string())
}
