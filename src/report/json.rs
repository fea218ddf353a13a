//! JSON report generation

use crate::analyzer::ClipAnalysis;
use crate::error::Result;
use crate::report::Summary;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct JsonReport<'a> {
    generated: String,
    summary: JsonSummary,
    files: &'a [ClipAnalysis],
}

#[derive(Serialize)]
struct JsonSummary {
    total: usize,
    measured: usize,
    no_frames: usize,
    error: usize,
    total_duration_secs: f64,
}

pub fn write<W: Write>(writer: &mut W, results: &[ClipAnalysis]) -> Result<()> {
    let summary = Summary::from_results(results);

    let report = JsonReport {
        generated: chrono::Utc::now().to_rfc3339(),
        summary: JsonSummary {
            total: summary.total,
            measured: summary.measured,
            no_frames: summary.no_frames,
            error: summary.error,
            total_duration_secs: summary.total_duration_secs,
        },
        files: results,
    };

    serde_json::to_writer_pretty(writer, &report)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Analyzer;

    #[test]
    fn test_json_shape() {
        let results = vec![Analyzer::new().analyze_bytes("clips/scene-01.mp3", &[0u8; 8])];
        let mut out = Vec::new();
        write(&mut out, &results).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(json["generated"].as_str().unwrap()).is_ok());
        assert_eq!(json["summary"]["no_frames"], 1);
        assert_eq!(json["files"][0]["status"], "NO_FRAMES");
        assert_eq!(json["files"][0]["file_name"], "scene-01.mp3");
        assert_eq!(json["files"][0]["bytes"], 8);
    }
}
