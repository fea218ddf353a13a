pub mod csv;
pub mod json;

use crate::analyzer::{ClipAnalysis, ClipStatus};
use crate::error::{Error, Result};
use std::path::Path;

/// Generate a report in the appropriate format based on file extension
pub fn generate<P: AsRef<Path>>(path: P, results: &[ClipAnalysis]) -> Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut file = std::fs::File::create(path).map_err(|e| Error::io(path, e))?;

    match ext.as_str() {
        "json" => json::write(&mut file, results),
        _ => csv::write(&mut file, results).map_err(|e| Error::io(path, e)),
    }
}

/// Summary statistics for a batch of results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub measured: usize,
    pub no_frames: usize,
    pub error: usize,
    /// Sum of all readable clips, pads included
    pub total_duration_secs: f64,
}

impl Summary {
    pub fn from_results(results: &[ClipAnalysis]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };

        for r in results {
            match r.status {
                ClipStatus::Measured => summary.measured += 1,
                ClipStatus::NoFrames => summary.no_frames += 1,
                ClipStatus::Error => summary.error += 1,
            }
            summary.total_duration_secs += r.duration().unwrap_or(0.0);
        }

        summary
    }
}
