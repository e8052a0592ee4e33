use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;

use crate::assets::decode::SourceImage;
use crate::encode::ffmpeg::ensure_parent_dir;
use crate::encode::sink::EncodedBlob;
use crate::export::mime::extension_for;
use crate::foundation::error::{StoryError, StoryResult};

/// Where finished artifacts are written.
#[derive(Clone, Debug)]
pub struct Downloads {
    dir: PathBuf,
}

impl Downloads {
    /// Downloads rooted at `dir`; created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Concatenate the blob's chunks into `story-video-<ms>.<ext>`.
    pub fn save_video(&self, blob: EncodedBlob) -> StoryResult<PathBuf> {
        if blob.is_empty() {
            return Err(StoryError::encoder("encoder produced no data"));
        }
        let path = self
            .dir
            .join(video_file_name(&blob.mime, unix_millis()));
        write_file(&path, &blob.into_bytes())?;
        tracing::info!(path = %path.display(), "video saved");
        Ok(path)
    }

    /// Re-serve the source image bytes unchanged as `story-magic-image-<ms>.png`.
    pub fn save_image(&self, image: &SourceImage) -> StoryResult<PathBuf> {
        let path = self.dir.join(image_file_name(unix_millis()));
        write_file(&path, &image.bytes)?;
        tracing::info!(path = %path.display(), "image saved");
        Ok(path)
    }
}

/// `story-video-<ms>.<mp4|webm>`.
pub fn video_file_name(mime: &str, unix_ms: u128) -> String {
    format!("story-video-{unix_ms}.{}", extension_for(mime))
}

/// `story-magic-image-<ms>.png`.
pub fn image_file_name(unix_ms: u128) -> String {
    format!("story-magic-image-{unix_ms}.png")
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

fn write_file(path: &Path, bytes: &[u8]) -> StoryResult<()> {
    ensure_parent_dir(path)?;
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/export/download.rs"]
mod tests;
