//! Stored script records and the media directory layout
//!
//! Records live at `<store_dir>/<id>.json`; voice-over clips at
//! `<media_dir>/<id>/audio/scene-NN.mp3` with `NN` counting from 01.
//! Fields this crate does not model are kept and written back untouched.

use crate::analyzer::{Analyzer, ClipStatus};
use crate::error::{Error, Result};
use crate::timeline::Scene;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredScript {
    pub id: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reddit_url: Option<String>,
    pub script: Script,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_generated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images_generated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_generated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Media>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    pub title: String,
    pub description: String,
    pub scenes: Vec<ScriptScene>,
    pub total_duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptScene {
    pub text: String,
    pub image_prompt: String,
    pub duration_hint: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub scenes: Vec<SceneMedia>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneMedia {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

/// A measured voice-over clip for one scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneAudio {
    pub path: String,
    pub duration: f64,
}

impl StoredScript {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_str(&content).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| Error::io(path, e))
    }

    /// Record measured clips, one slot per script scene.
    ///
    /// Audio path and duration are overwritten for every scene (cleared when
    /// the slot is `None`); image paths are kept. The script total becomes
    /// the sum of the measured durations.
    pub fn apply_audio(&mut self, clips: &[Option<SceneAudio>]) {
        let scene_count = self.script.scenes.len();
        let media = self.media.get_or_insert_with(Media::default);
        media.scenes.resize_with(scene_count.max(media.scenes.len()), SceneMedia::default);

        for (index, slot) in media.scenes.iter_mut().take(scene_count).enumerate() {
            let clip = clips.get(index).and_then(Option::as_ref);
            slot.audio_path = clip.map(|c| c.path.clone());
            slot.duration = clip.map(|c| c.duration);
        }

        self.script.total_duration = clips.iter().flatten().map(|c| c.duration).sum();
        self.audio_generated = Some(true);
        debug!(id = %self.id, total = self.script.total_duration, "applied audio durations");
    }

    /// Script scenes joined with any measured durations
    pub fn scenes(&self) -> Vec<Scene> {
        let media = self.media.as_ref().map(|m| m.scenes.as_slice()).unwrap_or(&[]);
        self.script
            .scenes
            .iter()
            .enumerate()
            .map(|(index, s)| Scene {
                text: s.text.clone(),
                image_prompt: s.image_prompt.clone(),
                duration_hint: s.duration_hint,
                duration: media.get(index).and_then(|m| m.duration),
            })
            .collect()
    }

    /// Like [`scenes`](Self::scenes), but clips measured on disk win over
    /// durations stored in the record
    pub fn scenes_with_clips(&self, clips: &[Option<SceneAudio>]) -> Vec<Scene> {
        let mut scenes = self.scenes();
        for (scene, clip) in scenes.iter_mut().zip(clips) {
            if let Some(clip) = clip {
                scene.duration = Some(clip.duration);
            }
        }
        scenes
    }
}

/// Directory of `<id>.json` script records
pub struct ScriptStore {
    dir: PathBuf,
}

impl ScriptStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    pub fn get(&self, id: &str) -> Result<StoredScript> {
        let path = self.path(id);
        if !path.is_file() {
            return Err(Error::ScriptNotFound(id.to_string()));
        }
        StoredScript::load(path)
    }

    pub fn put(&self, script: &StoredScript) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| Error::io(&self.dir, e))?;
        script.save(self.path(&script.id))
    }
}

/// Where generated media for a script lives
pub struct MediaLayout {
    root: PathBuf,
}

impl MediaLayout {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn audio_dir(&self, id: &str) -> PathBuf {
        self.root.join(id).join("audio")
    }

    /// Clip for the scene at zero-based `index`
    pub fn audio_path(&self, id: &str, index: usize) -> PathBuf {
        self.audio_dir(id).join(format!("scene-{:02}.mp3", index + 1))
    }

    /// Measure `scene-NN.mp3` for every scene of `script`.
    ///
    /// A slot is `None` when the clip is missing, unreadable, or holds no
    /// MPEG frames.
    pub fn measure_scenes(&self, script: &StoredScript, analyzer: &Analyzer) -> Vec<Option<SceneAudio>> {
        let candidates: Vec<(PathBuf, bool)> = (0..script.script.scenes.len())
            .map(|index| {
                let path = self.audio_path(&script.id, index);
                let present = path.is_file();
                (path, present)
            })
            .collect();
        let present: Vec<PathBuf> = candidates
            .iter()
            .filter(|(_, present)| *present)
            .map(|(path, _)| path.clone())
            .collect();
        let mut results = analyzer.analyze_all(&present).into_iter();

        candidates
            .into_iter()
            .map(|(_, present)| {
                if !present {
                    return None;
                }
                let result = results.next()?;
                if result.status != ClipStatus::Measured {
                    debug!(path = %result.file_path, status = %result.status, "clip not measured");
                    return None;
                }
                Some(SceneAudio {
                    path: result.file_path,
                    duration: result.duration_secs,
                })
            })
            .collect()
    }
}
