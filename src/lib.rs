//! storyloop renders looping story videos from a single image.
//!
//! A background image gets an animated camera move, a text overlay gets its own reveal, and
//! exactly one loop can be captured into an MP4 or WebM file with an optional audio track.
//!
//! - Load a [`StoryDocument`] or build the pieces directly
//! - Drive a [`StoryViewer`] with a [`FrameScheduler`] for preview
//! - Run an [`ExportPipeline`] against a [`CaptureBackend`] to save one loop
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Animation kinds, presets, and per-frame resolution.
pub mod animation;
/// Image, font, and color assets.
pub mod assets;
/// Preview audio sync and export audio preparation.
pub mod audio;
/// JSON story documents.
pub mod config;
/// Preview sinks and capture encoders.
pub mod encode;
/// One-loop video export.
pub mod export;
/// Shared value types and errors.
pub mod foundation;
/// Word wrap and overlay placement.
pub mod layout;
/// Clock, scheduling, and playback state.
pub mod playback;
/// Frame rendering.
pub mod render;
/// The interactive story viewer.
pub mod viewer;

pub use crate::animation::kind::AnimationKind;
pub use crate::animation::preset::{AnimationSelection, AnimationSpec, PRESETS, Preset};
pub use crate::animation::resolve::{RevealState, TextMotion, Transform};
pub use crate::assets::decode::SourceImage;
pub use crate::assets::text::FontBook;
pub use crate::audio::sync::{AudioElement, AudioSyncConfig, AudioSyncController};
pub use crate::config::StoryDocument;
pub use crate::encode::ffmpeg::FfmpegCapture;
pub use crate::encode::sink::{
    CaptureBackend, EncodedBlob, EncoderHandle, FrameSink, InMemoryCapture, InMemorySink,
    SinkConfig, StreamSpec,
};
pub use crate::export::download::Downloads;
pub use crate::export::pipeline::{
    CollectingNotifier, ExportPhase, ExportPipeline, ExportReport, ExportSettings, LogNotifier,
    Notifier,
};
pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Progress, Rgba8Premul};
pub use crate::foundation::error::{StoryError, StoryResult};
pub use crate::layout::anchor::{Anchor, BoundingBox, TextOverlay, TextStyle};
pub use crate::playback::schedule::{FrameScheduler, RealtimeScheduler, VirtualScheduler};
pub use crate::playback::state::PlaybackState;
pub use crate::render::backend::FrameRGBA;
pub use crate::render::cpu::{FrameRenderer, RendererOpts};
pub use crate::viewer::StoryViewer;
