//! Playable duration of narrated MP3 voice-over clips, and the per-scene
//! video timelines built from them.
//!
//! The core is [`mp3::measure_duration`], which walks MPEG Layer III frame
//! headers without decoding audio. Everything else reads clips and script
//! records from disk and feeds the measurements onward.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod mp3;
pub mod report;
pub mod store;
pub mod timeline;

pub use analyzer::{Analyzer, ClipAnalysis, ClipStatus};
pub use config::Config;
pub use error::{Error, Result};
pub use mp3::measure_duration;
pub use timeline::{Scene, Timeline};
