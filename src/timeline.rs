//! Per-scene video timeline
//!
//! A scene plays for as long as its voice-over clip when one was measured,
//! and for the script's duration hint otherwise. The title card comes first.

use serde::Serialize;

pub const DEFAULT_TITLE_SECS: f64 = 4.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub text: String,
    pub image_prompt: String,
    pub duration_hint: f64,
    /// Measured voice-over length, pad included
    pub duration: Option<f64>,
}

impl Scene {
    pub fn effective_duration(&self) -> (f64, DurationSource) {
        match self.duration {
            Some(d) if d > 0.0 => (d, DurationSource::Audio),
            _ => (self.duration_hint, DurationSource::Hint),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationSource {
    Audio,
    Hint,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub index: usize,
    pub start: f64,
    pub duration: f64,
    pub source: DurationSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub title_secs: f64,
    pub entries: Vec<TimelineEntry>,
    pub total_secs: f64,
}

impl Timeline {
    pub fn build(scenes: &[Scene], title_secs: f64) -> Self {
        let mut cursor = title_secs;
        let entries = scenes
            .iter()
            .enumerate()
            .map(|(index, scene)| {
                let (duration, source) = scene.effective_duration();
                let entry = TimelineEntry {
                    index,
                    start: cursor,
                    duration,
                    source,
                };
                cursor += duration;
                entry
            })
            .collect();

        Self {
            title_secs,
            entries,
            total_secs: cursor,
        }
    }

    /// Length of the video in frames at `fps`
    pub fn frames(&self, fps: u32) -> u64 {
        (self.total_secs * fps as f64).round() as u64
    }

    /// Scene durations in order, without the title card
    pub fn durations(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.duration).collect()
    }
}

const CHAPTER_NAMES: [&str; 5] = ["Intro", "The Setup", "The Story", "Reactions", "Conclusion"];

/// Index of the last scene belonging to each chapter.
///
/// Bounds can overlap or go backwards for short scripts; a chapter whose
/// start has already passed is never emitted.
fn chapter_ends(scene_count: usize) -> [i64; 5] {
    let n = scene_count as i64;
    [0, 2, 6_i64.min(n - 2), 8_i64.min(n - 1), n - 1]
}

/// `M:SS - Chapter` lines for a video description.
///
/// A chapter opens at scene 0 and at the scene right after the previous
/// chapter's last scene. Times are measured from the first scene.
pub fn chapter_timestamps(durations: &[f64]) -> String {
    let ends = chapter_ends(durations.len());
    let mut lines = Vec::new();
    let mut chapter = 0;
    let mut current = 0.0;

    for (index, duration) in durations.iter().enumerate() {
        let opens = index == 0 || (chapter > 0 && index as i64 == ends[chapter - 1] + 1);
        if opens && chapter < CHAPTER_NAMES.len() {
            lines.push(format!("{} - {}", format_timestamp(current), CHAPTER_NAMES[chapter]));
            chapter += 1;
        }
        current += duration;
    }

    lines.join("\n")
}

/// `M:SS`, both parts floored
pub fn format_timestamp(secs: f64) -> String {
    let secs = secs.max(0.0);
    let minutes = (secs / 60.0).floor() as u64;
    let seconds = (secs % 60.0).floor() as u64;
    format!("{}:{:02}", minutes, seconds)
}
