//! JSON story document: what to show, how it moves, and where exports go.
//!
//! ```json
//! {
//!   "image": "photo.jpg",
//!   "overlay": { "text": "Summer sale", "style": { "position": "bottom-center" } },
//!   "audio": "track.mp3",
//!   "animation": { "preset": "hype", "duration_ms": 7000 },
//!   "fonts": { "default": "Inter", "families": { "Inter": "fonts/Inter.ttf" } },
//!   "export": { "fps": 30, "video_bits_per_second": 8000000, "out_dir": "downloads" },
//!   "audio_sync": { "resync_epsilon_ms": 50, "startup_guard_ms": 100 }
//! }
//! ```
//!
//! Relative paths resolve against the directory holding the document.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::animation::kind::AnimationKind;
use crate::animation::preset::{AnimationSelection, DEFAULT_PRESET_ID, preset_by_id};
use crate::assets::text::FontBook;
use crate::audio::sync::AudioSyncConfig;
use crate::export::pipeline::{DEFAULT_VIDEO_BITS_PER_SECOND, ExportSettings};
use crate::foundation::core::Fps;
use crate::foundation::error::{StoryError, StoryResult};
use crate::layout::anchor::TextOverlay;

/// Animation choice: a preset plus optional manual overrides.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    /// Preset id; the default preset when absent.
    pub preset: Option<String>,
    /// Manual kind override.
    pub kind: Option<AnimationKind>,
    /// Manual loop length override.
    pub duration_ms: Option<u64>,
}

/// Fonts available to the overlay.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontConfig {
    /// Family used when the overlay names none or an unknown one.
    pub default: Option<String>,
    /// Family name to font file.
    pub families: BTreeMap<String, PathBuf>,
}

/// Export tunables as written in the document.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Capture rate in whole frames per second.
    pub fps: u32,
    /// Target video bitrate.
    pub video_bits_per_second: u64,
    /// Where downloads land.
    pub out_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            video_bits_per_second: DEFAULT_VIDEO_BITS_PER_SECOND,
            out_dir: PathBuf::from("downloads"),
        }
    }
}

/// A story as loaded from JSON.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoryDocument {
    /// Background image.
    pub image: PathBuf,
    /// Text overlay.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay: Option<TextOverlay>,
    /// Looping audio track, also muxed into exports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<PathBuf>,
    /// Animation choice.
    #[serde(default)]
    pub animation: AnimationConfig,
    /// Overlay fonts.
    #[serde(default)]
    pub fonts: FontConfig,
    /// Export tunables.
    #[serde(default)]
    pub export: ExportConfig,
    /// Audio resync tunables.
    #[serde(default)]
    pub audio_sync: AudioSyncConfig,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl StoryDocument {
    /// Parse a document; relative paths resolve against the working directory.
    pub fn from_reader<R: std::io::Read>(r: R) -> StoryResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| StoryError::validation(format!("parse story JSON: {e}")))
    }

    /// Parse a document file; relative paths resolve against its directory.
    pub fn from_path(path: impl AsRef<Path>) -> StoryResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            StoryError::validation(format!("open story JSON '{}': {e}", path.display()))
        })?;
        let mut doc = Self::from_reader(BufReader::new(f))?;
        doc.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(doc)
    }

    /// Directory relative paths resolve against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Override the directory relative paths resolve against.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Check everything that serde cannot.
    pub fn validate(&self) -> StoryResult<()> {
        if self.image.as_os_str().is_empty() {
            return Err(StoryError::validation("image path must not be empty"));
        }
        if let Some(id) = self.animation.preset.as_deref()
            && preset_by_id(id).is_none()
        {
            return Err(StoryError::validation(format!("unknown preset '{id}'")));
        }
        if self.animation.duration_ms == Some(0) {
            return Err(StoryError::validation("animation.duration_ms must be > 0"));
        }
        if let Some(default) = self.fonts.default.as_deref()
            && !self.fonts.families.contains_key(default)
        {
            return Err(StoryError::validation(format!(
                "fonts.default '{default}' is not listed in fonts.families"
            )));
        }
        if self.export.fps == 0 {
            return Err(StoryError::validation("export.fps must be > 0"));
        }
        if self.export.video_bits_per_second == 0 {
            return Err(StoryError::validation(
                "export.video_bits_per_second must be > 0",
            ));
        }
        if let Some(bb) = self.overlay.as_ref().and_then(|o| o.bounding_box) {
            let coords = [bb.ymin, bb.xmin, bb.ymax, bb.xmax];
            if coords.iter().any(|c| !c.is_finite() || !(0.0..=1000.0).contains(c)) {
                return Err(StoryError::validation(
                    "overlay bounding box coordinates must be within 0..=1000",
                ));
            }
            if bb.ymin >= bb.ymax || bb.xmin >= bb.xmax {
                return Err(StoryError::validation("overlay bounding box is empty"));
            }
        }
        Ok(())
    }

    /// Resolve `path` against the document directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Background image location.
    pub fn image_path(&self) -> PathBuf {
        self.resolve_path(&self.image)
    }

    /// Audio track location.
    pub fn audio_path(&self) -> Option<PathBuf> {
        self.audio.as_deref().map(|p| self.resolve_path(p))
    }

    /// Download directory.
    pub fn out_dir(&self) -> PathBuf {
        self.resolve_path(&self.export.out_dir)
    }

    /// Preset and manual overrides as an [`AnimationSelection`].
    pub fn selection(&self) -> StoryResult<AnimationSelection> {
        let mut selection = AnimationSelection::with_preset(
            self.animation.preset.as_deref().unwrap_or(DEFAULT_PRESET_ID),
        );
        if let Some(kind) = self.animation.kind {
            selection.set_manual_kind(kind);
        }
        if let Some(ms) = self.animation.duration_ms {
            selection.set_manual_duration(Duration::from_millis(ms))?;
        }
        Ok(selection)
    }

    /// Load every configured font.
    pub fn font_book(&self) -> StoryResult<FontBook> {
        let mut book = FontBook::new();
        for (name, path) in &self.fonts.families {
            book.load(name.clone(), &self.resolve_path(path))?;
        }
        if let Some(default) = self.fonts.default.as_deref() {
            book.set_default(default)?;
        }
        tracing::debug!(faces = book.names().count(), "fonts loaded");
        Ok(book)
    }

    /// Export tunables, with the audio track attached.
    pub fn export_settings(&self) -> StoryResult<ExportSettings> {
        Ok(ExportSettings {
            fps: Fps::new(self.export.fps, 1)?,
            video_bits_per_second: self.export.video_bits_per_second,
            audio: self.audio_path(),
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
