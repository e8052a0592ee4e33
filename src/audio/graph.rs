//! One-shot audio preparation for export.
//!
//! The track is decoded once to interleaved stereo `f32`, trimmed or padded to exactly one loop,
//! and written to a temporary raw file the encoder reads as a second input.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::encode::sink::AudioInputConfig;
use crate::foundation::error::{StoryError, StoryResult};

/// Sample rate used for export audio.
pub const EXPORT_SAMPLE_RATE: u32 = 48_000;
/// Channel count used for export audio.
pub const EXPORT_CHANNELS: u16 = 2;

/// Decoded interleaved PCM.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioPcm {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
    /// Interleaved samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Trim or zero-pad to exactly `duration`.
    pub fn fit_to_duration(&mut self, duration: Duration) {
        let frames = (duration.as_nanos() * u128::from(self.sample_rate)).div_ceil(1_000_000_000);
        let len = (frames as usize).saturating_mul(usize::from(self.channels));
        self.interleaved_f32.resize(len, 0.0);
    }

    /// Length in seconds.
    pub fn duration(&self) -> Duration {
        let per_second = u64::from(self.sample_rate) * u64::from(self.channels);
        if per_second == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.interleaved_f32.len() as f64 / per_second as f64)
    }
}

/// Decode any audio file to interleaved stereo `f32` using the system `ffmpeg`.
pub fn decode_audio_f32_stereo(path: &Path, sample_rate: u32) -> StoryResult<AudioPcm> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| StoryError::audio_decode(format!("failed to run ffmpeg for audio decode: {e}")))?;

    if !out.status.success() {
        let msg = String::from_utf8_lossy(&out.stderr);
        return Err(StoryError::audio_decode(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            msg.trim()
        )));
    }
    if !out.stdout.len().is_multiple_of(4) {
        return Err(StoryError::audio_decode(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }

    let interleaved_f32 = out
        .stdout
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    Ok(AudioPcm {
        sample_rate,
        channels: EXPORT_CHANNELS,
        interleaved_f32,
    })
}

/// Write interleaved `f32` samples as raw little-endian bytes.
pub fn write_f32le_file(samples_interleaved: &[f32], out_path: &Path) -> StoryResult<()> {
    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        StoryError::audio_decode(format!(
            "failed to write audio file '{}': {e}",
            out_path.display()
        ))
    })
}

/// Export-time audio: a temporary raw PCM file sized to one loop.
///
/// The file is removed by [`AudioGraph::close`] or on drop.
#[derive(Debug)]
pub struct AudioGraph {
    input: AudioInputConfig,
    closed: bool,
}

impl AudioGraph {
    /// Decode `source` and prepare one loop of `duration`.
    #[tracing::instrument(level = "debug", skip_all, fields(source = %source.display()))]
    pub fn build(source: &Path, duration: Duration) -> StoryResult<Self> {
        if !source.is_file() {
            return Err(StoryError::audio_decode(format!(
                "audio source '{}' does not exist",
                source.display()
            )));
        }
        let pcm = decode_audio_f32_stereo(source, EXPORT_SAMPLE_RATE)?;
        Self::from_pcm(pcm, duration)
    }

    /// Prepare already-decoded PCM.
    pub fn from_pcm(mut pcm: AudioPcm, duration: Duration) -> StoryResult<Self> {
        if pcm.channels == 0 || pcm.sample_rate == 0 {
            return Err(StoryError::audio_decode("audio has no channels or sample rate"));
        }
        let decoded = pcm.duration();
        pcm.fit_to_duration(duration);
        let path = temp_pcm_path();
        write_f32le_file(&pcm.interleaved_f32, &path)?;
        tracing::debug!(
            decoded_s = decoded.as_secs_f64(),
            loop_s = duration.as_secs_f64(),
            path = %path.display(),
            "prepared export audio"
        );
        Ok(Self {
            input: AudioInputConfig {
                path,
                sample_rate: pcm.sample_rate,
                channels: pcm.channels,
            },
            closed: false,
        })
    }

    /// Encoder input description.
    pub fn input(&self) -> &AudioInputConfig {
        &self.input
    }

    /// Remove the temporary file.
    pub fn close(mut self) {
        self.remove_file();
    }

    fn remove_file(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(err) = std::fs::remove_file(&self.input.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.input.path.display(), error = %err, "failed to remove temp audio");
            }
        }
    }
}

impl Drop for AudioGraph {
    fn drop(&mut self) {
        self.remove_file();
    }
}

fn temp_pcm_path() -> PathBuf {
    std::env::temp_dir().join(format!(
        "storyloop_audio_{}_{}.f32le",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0)
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/audio/graph.rs"]
mod tests;
