//! One-loop video export.
//!
//! `Idle -> Recording -> Muxing -> Idle`, with `Failed` reachable from every step. Whatever
//! happens, the viewer leaves `Exporting`, the encoder is stopped or killed, and the audio
//! graph's temporary file is removed.

use std::path::PathBuf;

use crate::audio::graph::AudioGraph;
use crate::encode::sink::{CaptureBackend, StreamSpec};
use crate::export::capture::{CaptureStatus, CaptureStream};
use crate::export::download::Downloads;
use crate::export::mime::negotiate;
use crate::foundation::core::Fps;
use crate::foundation::error::{StoryError, StoryResult};
use crate::playback::schedule::FrameScheduler;
use crate::viewer::StoryViewer;

/// Alert shown after any failure once recording has begun.
pub const EXPORT_FAILED_ALERT: &str = "Video export failed.";

/// Capture sampling rate.
pub const DEFAULT_EXPORT_FPS: Fps = Fps { num: 30, den: 1 };
/// Target video bitrate.
pub const DEFAULT_VIDEO_BITS_PER_SECOND: u64 = 8_000_000;

/// Where the pipeline is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportPhase {
    /// No export running.
    #[default]
    Idle,
    /// Frames are being captured.
    Recording,
    /// The encoder is finalizing and the file is being written.
    Muxing,
    /// The last export failed.
    Failed,
}

/// User-facing error surface.
pub trait Notifier {
    /// Show `message` to the user.
    fn alert(&mut self, message: &str);
}

/// Notifier that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn alert(&mut self, message: &str) {
        tracing::error!("{message}");
    }
}

/// Notifier that keeps every message, for tests and headless callers.
#[derive(Debug, Default, Clone)]
pub struct CollectingNotifier {
    messages: Vec<String>,
}

impl CollectingNotifier {
    /// Messages in the order they were raised.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl Notifier for CollectingNotifier {
    fn alert(&mut self, message: &str) {
        self.messages.push(message.to_owned());
    }
}

/// Export tunables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportSettings {
    /// Capture sampling rate.
    pub fps: Fps,
    /// Target video bitrate.
    pub video_bits_per_second: u64,
    /// Audio track to mux, if any.
    pub audio: Option<PathBuf>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            fps: DEFAULT_EXPORT_FPS,
            video_bits_per_second: DEFAULT_VIDEO_BITS_PER_SECOND,
            audio: None,
        }
    }
}

/// What a finished export produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportReport {
    /// Saved file.
    pub path: PathBuf,
    /// Negotiated mime type.
    pub mime: String,
    /// Frames handed to the encoder.
    pub frames: u64,
    /// Whether an audio track was muxed.
    pub with_audio: bool,
}

/// Drives a [`StoryViewer`] through one captured loop.
pub struct ExportPipeline<B: CaptureBackend, N: Notifier> {
    backend: B,
    notifier: N,
    downloads: Downloads,
    settings: ExportSettings,
    phase: ExportPhase,
}

impl<B: CaptureBackend, N: Notifier> ExportPipeline<B, N> {
    /// Pipeline writing into `downloads`.
    pub fn new(backend: B, notifier: N, downloads: Downloads, settings: ExportSettings) -> Self {
        Self {
            backend,
            notifier,
            downloads,
            settings,
            phase: ExportPhase::Idle,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> ExportPhase {
        self.phase
    }

    /// Notifier, to inspect raised alerts.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Capture backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Export tunables.
    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    fn enter(&mut self, phase: ExportPhase) {
        tracing::debug!(from = ?self.phase, to = ?phase, "export phase");
        self.phase = phase;
    }

    /// Capture exactly one loop of `viewer` and save it.
    ///
    /// An unsupported platform raises one alert and leaves the viewer untouched. Any later
    /// failure moves the viewer to `Failed` and raises [`EXPORT_FAILED_ALERT`] after cleanup.
    #[tracing::instrument(skip_all, fields(duration_ms = viewer.spec().duration.as_millis() as u64))]
    pub fn export<S: FrameScheduler>(
        &mut self,
        viewer: &mut StoryViewer<S>,
    ) -> StoryResult<ExportReport> {
        if viewer.state().is_exporting() {
            return Err(StoryError::validation("an export is already running"));
        }
        if viewer.image().is_none() {
            return Err(StoryError::validation("no image loaded"));
        }

        let mime = match negotiate(&self.backend) {
            Ok(mime) => mime,
            Err(err) => {
                tracing::error!(error = %err, "video export unavailable");
                let message = match &err {
                    StoryError::UnsupportedPlatform(msg) => msg.as_str(),
                    _ => EXPORT_FAILED_ALERT,
                };
                self.notifier.alert(message);
                return Err(err);
            }
        };
        tracing::info!(mime, "export started");

        viewer.begin_export();
        self.enter(ExportPhase::Recording);

        match self.record(viewer, mime) {
            Ok(report) => {
                viewer.finish_export();
                self.enter(ExportPhase::Idle);
                tracing::info!(path = %report.path.display(), frames = report.frames, "export finished");
                Ok(report)
            }
            Err(err) => {
                tracing::error!(error = %err, "video export failed");
                viewer.fail_export(err.to_string());
                self.enter(ExportPhase::Failed);
                self.notifier.alert(EXPORT_FAILED_ALERT);
                Err(err)
            }
        }
    }

    fn record<S: FrameScheduler>(
        &mut self,
        viewer: &mut StoryViewer<S>,
        mime: &str,
    ) -> StoryResult<ExportReport> {
        let duration = viewer.spec().duration;
        let audio = self
            .settings
            .audio
            .as_deref()
            .and_then(|path| match AudioGraph::build(path, duration) {
                Ok(graph) => Some(graph),
                Err(err) => {
                    tracing::warn!(error = %err, "audio preparation failed, exporting video only");
                    None
                }
            });

        let canvas = viewer.canvas();
        let encoder = self.backend.begin_capture(StreamSpec {
            width: canvas.width,
            height: canvas.height,
            fps: self.settings.fps,
            mime: mime.to_owned(),
            video_bits_per_second: self.settings.video_bits_per_second,
            audio: audio.as_ref().map(|g| g.input().clone()),
        })?;
        let mut capture = CaptureStream::new(encoder, self.settings.fps, duration);

        loop {
            let Some(now) = viewer.run_once() else {
                return Err(StoryError::encoder(
                    "render loop stopped before one loop was captured",
                ));
            };
            if capture.offer(now, viewer.last_frame())? == CaptureStatus::Complete {
                break;
            }
        }

        self.enter(ExportPhase::Muxing);
        let frames = capture.frames_pushed();
        let blob = capture.finish()?;
        let mime = blob.mime.clone();
        let path = self.downloads.save_video(blob)?;
        let with_audio = audio.is_some();
        if let Some(graph) = audio {
            graph.close();
        }
        Ok(ExportReport {
            path,
            mime,
            frames,
            with_audio,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/pipeline.rs"]
mod tests;
