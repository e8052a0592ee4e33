//! Frame consumers: preview sinks and capture encoders.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{StoryError, StoryResult};
use crate::render::backend::FrameRGBA;

/// Configuration handed to a [`FrameSink`] before any frame.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Nominal frames-per-second.
    pub fps: Fps,
}

/// Raw PCM audio input for encoders that mux audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioInputConfig {
    /// Path to interleaved `f32le` PCM data.
    pub path: PathBuf,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
}

/// Preview surface: receives every presented frame in order.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> StoryResult<()>;
    /// Push one frame; indices strictly increase.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> StoryResult<()>;
    /// Called once after the last frame.
    fn end(&mut self) -> StoryResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Captured frames in order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// Whether `end` was called.
    pub fn ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> StoryResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> StoryResult<()> {
        if let Some((last, _)) = self.frames.last() {
            if idx <= *last {
                return Err(StoryError::validation("frame indices must strictly increase"));
            }
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> StoryResult<()> {
        self.ended = true;
        Ok(())
    }
}

/// What a capture should produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSpec {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Capture sampling rate.
    pub fps: Fps,
    /// Negotiated container/codec mime type.
    pub mime: String,
    /// Target video bitrate.
    pub video_bits_per_second: u64,
    /// Optional audio track.
    pub audio: Option<AudioInputConfig>,
}

/// Encoded output: the mime type plus the chunks in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedBlob {
    /// Container/codec mime type.
    pub mime: String,
    /// Data chunks as emitted by the encoder.
    pub chunks: Vec<Vec<u8>>,
}

impl EncodedBlob {
    /// Total byte size.
    pub fn len(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// Whether no bytes were emitted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Concatenate all chunks.
    pub fn into_bytes(self) -> Vec<u8> {
        self.chunks.concat()
    }
}

/// A running encoder fed by the capture stream.
pub trait EncoderHandle {
    /// Encode one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> StoryResult<()>;
    /// Finish encoding and return everything emitted.
    fn stop(self: Box<Self>) -> StoryResult<EncodedBlob>;
    /// Tear down without producing output.
    fn abort(self: Box<Self>);
}

/// Platform capture capability.
pub trait CaptureBackend {
    /// Whether capture is possible at all.
    fn is_available(&self) -> bool;
    /// Whether `mime` can be encoded.
    fn is_type_supported(&self, mime: &str) -> bool;
    /// Start an encoder for `spec`.
    fn begin_capture(&mut self, spec: StreamSpec) -> StoryResult<Box<dyn EncoderHandle>>;
}

/// Shared record of what an [`InMemoryCapture`] encoder received.
#[derive(Debug, Default)]
pub struct CaptureLog {
    /// Spec of the last capture.
    pub spec: Option<StreamSpec>,
    /// Frame indices pushed, in order.
    pub frames: Vec<FrameIndex>,
    /// Whether the last encoder was stopped normally.
    pub stopped: bool,
    /// Whether the last encoder was aborted.
    pub aborted: bool,
}

/// Capture backend that keeps everything in memory.
///
/// Each pushed frame becomes one chunk holding its index. Used to test the export pipeline.
#[derive(Debug, Clone)]
pub struct InMemoryCapture {
    available: bool,
    supported: Vec<String>,
    fail_after: Option<usize>,
    log: Arc<Mutex<CaptureLog>>,
}

impl InMemoryCapture {
    /// Backend supporting exactly `mimes`.
    pub fn new<I, S>(mimes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            available: true,
            supported: mimes.into_iter().map(Into::into).collect(),
            fail_after: None,
            log: Arc::default(),
        }
    }

    /// Backend with no capture support at all.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(Vec::<String>::new())
        }
    }

    /// Make the encoder fail on the frame after `frames` successful ones.
    pub fn failing_after(mut self, frames: usize) -> Self {
        self.fail_after = Some(frames);
        self
    }

    /// Shared capture log.
    pub fn log(&self) -> Arc<Mutex<CaptureLog>> {
        Arc::clone(&self.log)
    }
}

impl CaptureBackend for InMemoryCapture {
    fn is_available(&self) -> bool {
        self.available
    }

    fn is_type_supported(&self, mime: &str) -> bool {
        self.available && self.supported.iter().any(|m| m == mime)
    }

    fn begin_capture(&mut self, spec: StreamSpec) -> StoryResult<Box<dyn EncoderHandle>> {
        if !self.is_type_supported(&spec.mime) {
            return Err(StoryError::encoder(format!("mime '{}' not supported", spec.mime)));
        }
        let mime = spec.mime.clone();
        if let Ok(mut log) = self.log.lock() {
            *log = CaptureLog {
                spec: Some(spec),
                ..CaptureLog::default()
            };
        }
        Ok(Box::new(InMemoryEncoder {
            mime,
            chunks: Vec::new(),
            fail_after: self.fail_after,
            log: Arc::clone(&self.log),
        }))
    }
}

struct InMemoryEncoder {
    mime: String,
    chunks: Vec<Vec<u8>>,
    fail_after: Option<usize>,
    log: Arc<Mutex<CaptureLog>>,
}

impl EncoderHandle for InMemoryEncoder {
    fn push_frame(&mut self, idx: FrameIndex, _frame: &FrameRGBA) -> StoryResult<()> {
        if self.fail_after.is_some_and(|n| self.chunks.len() >= n) {
            return Err(StoryError::encoder("in-memory encoder failure"));
        }
        self.chunks.push(idx.0.to_le_bytes().to_vec());
        if let Ok(mut log) = self.log.lock() {
            log.frames.push(idx);
        }
        Ok(())
    }

    fn stop(self: Box<Self>) -> StoryResult<EncodedBlob> {
        if let Ok(mut log) = self.log.lock() {
            log.stopped = true;
        }
        Ok(EncodedBlob {
            mime: self.mime,
            chunks: self.chunks,
        })
    }

    fn abort(self: Box<Self>) {
        if let Ok(mut log) = self.log.lock() {
            log.aborted = true;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
