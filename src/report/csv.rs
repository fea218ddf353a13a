//! CSV report generation

use crate::analyzer::ClipAnalysis;
use std::io::{self, Write};

pub fn write<W: Write>(writer: &mut W, results: &[ClipAnalysis]) -> io::Result<()> {
    // Header
    writeln!(writer, "status,filepath,bytes,frames,duration_secs")?;

    // Rows
    for r in results {
        writeln!(
            writer,
            "{},{},{},{},{:.3}",
            r.status,
            escape_csv(&r.file_path),
            r.bytes,
            r.frame_count,
            r.duration_secs
        )?;
    }

    Ok(())
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
