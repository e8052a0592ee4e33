//! The story viewer: one image, one overlay, one looping animation.
//!
//! The viewer owns the render loop. Each fired frame request reads the clock, resolves the
//! transform and text reveal, renders, presents, and re-arms only while the state keeps the
//! loop alive. Export drives the same loop through [`crate::export::pipeline`].

use std::path::Path;
use std::time::Duration;

use crate::animation::kind::AnimationKind;
use crate::animation::preset::{AnimationSelection, AnimationSpec};
use crate::animation::resolve::{RevealState, resolve, resolve_reveal, text_motion};
use crate::assets::decode::SourceImage;
use crate::audio::sync::AudioSyncController;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, Fps, FrameIndex, Progress};
use crate::foundation::error::StoryResult;
use crate::layout::anchor::TextOverlay;
use crate::playback::clock::{AnimationClock, ClockTick};
use crate::playback::schedule::{FrameRequestId, FrameScheduler};
use crate::playback::state::{PlaybackEvent, PlaybackState};
use crate::render::backend::FrameRGBA;
use crate::render::cpu::FrameRenderer;

/// Interactive viewer around a [`FrameRenderer`], driven by a [`FrameScheduler`].
pub struct StoryViewer<S: FrameScheduler> {
    scheduler: S,
    renderer: FrameRenderer,
    clock: AnimationClock,
    state: PlaybackState,
    selection: AnimationSelection,
    spec: AnimationSpec,
    overlay: Option<TextOverlay>,
    image: Option<SourceImage>,
    preview: Option<Box<dyn FrameSink>>,
    audio: Option<AudioSyncController>,
    pending: Option<FrameRequestId>,
    last_frame: Option<FrameRGBA>,
    presented: u64,
    closed: bool,
}

impl<S: FrameScheduler> StoryViewer<S> {
    /// Paused viewer with the default preset and nothing loaded.
    pub fn new(scheduler: S, renderer: FrameRenderer) -> Self {
        let selection = AnimationSelection::default();
        let spec = selection.spec();
        Self {
            scheduler,
            renderer,
            clock: AnimationClock::new(spec.duration),
            state: PlaybackState::default(),
            selection,
            spec,
            overlay: None,
            image: None,
            preview: None,
            audio: None,
            pending: None,
            last_frame: None,
            presented: 0,
            closed: false,
        }
    }

    /// Current playback state.
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Resolved animation.
    pub fn spec(&self) -> AnimationSpec {
        self.spec
    }

    /// Preset and manual overrides.
    pub fn selection(&self) -> &AnimationSelection {
        &self.selection
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        self.renderer.canvas()
    }

    /// Loop clock.
    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    /// Loaded image, if any.
    pub fn image(&self) -> Option<&SourceImage> {
        self.image.as_ref()
    }

    /// Overlay text, if any.
    pub fn overlay(&self) -> Option<&TextOverlay> {
        self.overlay.as_ref()
    }

    /// Most recent successfully rendered frame. Pausing keeps it.
    pub fn last_frame(&self) -> Option<&FrameRGBA> {
        self.last_frame.as_ref()
    }

    /// Frame scheduler.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Frame scheduler, mutably.
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Renderer, for font changes.
    pub fn renderer_mut(&mut self) -> &mut FrameRenderer {
        &mut self.renderer
    }

    /// Audio controller, if attached.
    pub fn audio_mut(&mut self) -> Option<&mut AudioSyncController> {
        self.audio.as_mut()
    }

    /// Whether a frame request is outstanding.
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Attach a preview surface; every presented frame is pushed to it.
    pub fn set_preview_sink(&mut self, mut sink: Box<dyn FrameSink>, fps: Fps) -> StoryResult<()> {
        let canvas = self.renderer.canvas();
        sink.begin(SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps,
        })?;
        if let Some(mut old) = self.preview.replace(sink) {
            old.end()?;
        }
        self.presented = 0;
        Ok(())
    }

    /// Detach the preview surface, ending it.
    pub fn take_preview_sink(&mut self) -> StoryResult<Option<Box<dyn FrameSink>>> {
        match self.preview.take() {
            Some(mut sink) => {
                sink.end()?;
                Ok(Some(sink))
            }
            None => Ok(None),
        }
    }

    /// Attach a looping audio track. It follows the current state right away.
    pub fn set_audio(&mut self, mut controller: AudioSyncController) {
        controller.sync_playback(&self.state);
        if let Some(mut old) = self.audio.replace(controller) {
            old.stop_and_rewind();
        }
    }

    /// Load a new image. The phase restarts and one frame is drawn even while paused.
    pub fn set_image(&mut self, image: SourceImage) {
        tracing::debug!(
            width = image.prepared.width,
            height = image.prepared.height,
            "image loaded"
        );
        self.image = Some(image);
        self.clock.restart();
        self.request_redraw();
    }

    /// Decode and load the image at `path`.
    ///
    /// A failed load is logged and leaves the viewer as it was; nothing new is drawn.
    pub fn load_image(&mut self, path: &Path) -> bool {
        match SourceImage::open(path) {
            Ok(image) => {
                self.set_image(image);
                true
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "image failed to load");
                false
            }
        }
    }

    /// Replace the overlay text; redraws without touching the phase.
    pub fn set_overlay(&mut self, overlay: Option<TextOverlay>) {
        self.overlay = overlay;
        self.request_redraw();
    }

    /// Switch to a preset, dropping manual overrides.
    pub fn choose_preset(&mut self, preset_id: &str) {
        self.selection.choose_preset(preset_id);
        self.apply_selection();
    }

    /// Override the animation kind.
    pub fn set_manual_kind(&mut self, kind: AnimationKind) {
        self.selection.set_manual_kind(kind);
        self.apply_selection();
    }

    /// Override the loop duration.
    pub fn set_manual_duration(&mut self, duration: Duration) -> StoryResult<()> {
        self.selection.set_manual_duration(duration)?;
        self.apply_selection();
        Ok(())
    }

    /// Replace the whole selection.
    pub fn set_selection(&mut self, selection: AnimationSelection) {
        self.selection = selection;
        self.apply_selection();
    }

    fn apply_selection(&mut self) {
        let spec = self.selection.spec();
        if spec == self.spec {
            return;
        }
        tracing::debug!(kind = %spec.kind, duration_ms = spec.duration.as_millis() as u64, "animation changed");
        self.spec = spec;
        self.clock.set_duration(spec.duration);
        self.request_redraw();
    }

    /// Start or resume playback. Ignored while exporting.
    pub fn play(&mut self) -> bool {
        self.transition(PlaybackEvent::Play)
    }

    /// Pause playback, keeping the last frame and the phase.
    pub fn pause(&mut self) -> bool {
        self.transition(PlaybackEvent::Pause)
    }

    /// Flip between play and pause.
    pub fn toggle(&mut self) -> bool {
        self.transition(PlaybackEvent::Toggle)
    }

    fn transition(&mut self, event: PlaybackEvent) -> bool {
        if !self.state.apply(event) {
            return false;
        }
        if let Some(audio) = self.audio.as_mut() {
            audio.sync_playback(&self.state);
        }
        if self.state.keeps_loop_armed() {
            self.arm();
        } else {
            self.clock.pause(self.scheduler.now());
            self.disarm();
        }
        true
    }

    /// Enter export: phase back to zero, audio stopped and rewound, loop armed.
    pub(crate) fn begin_export(&mut self) {
        if !self.state.apply(PlaybackEvent::BeginExport) {
            return;
        }
        self.clock.restart();
        if let Some(audio) = self.audio.as_mut() {
            audio.stop_and_rewind();
        }
        self.arm();
    }

    /// Leave export normally; the loop keeps playing.
    pub(crate) fn finish_export(&mut self) {
        if self.state.apply(PlaybackEvent::FinishExport)
            && let Some(audio) = self.audio.as_mut()
        {
            audio.sync_playback(&self.state);
        }
    }

    /// Leave export after a failure; the loop stops on the current phase.
    pub(crate) fn fail_export(&mut self, message: impl Into<String>) {
        if self.state.apply(PlaybackEvent::FailExport(message.into())) {
            self.clock.pause(self.scheduler.now());
            self.disarm();
        }
    }

    /// Wait for the next paint opportunity and handle it.
    ///
    /// Returns the frame timestamp, or `None` when the loop is not armed.
    pub fn run_once(&mut self) -> Option<Duration> {
        if self.closed {
            return None;
        }
        let now = self.scheduler.wait_for_frame()?;
        self.on_animation_frame(now);
        Some(now)
    }

    /// Run the loop for `span` of scheduler time, or until it disarms. Returns frames handled.
    pub fn run_for(&mut self, span: Duration) -> u64 {
        let until = self.scheduler.now() + span;
        let mut handled = 0;
        while self.scheduler.now() < until {
            if self.run_once().is_none() {
                break;
            }
            handled += 1;
        }
        handled
    }

    /// Frame callback: read the clock, render, present, re-arm.
    ///
    /// Returns the frame drawn by this call. A failed frame is logged and skipped; the
    /// previous frame stays current.
    pub fn on_animation_frame(&mut self, now: Duration) -> Option<&FrameRGBA> {
        self.pending = None;
        if self.closed {
            return None;
        }
        let running = self.state.keeps_loop_armed();
        let tick = if running {
            self.clock.tick(now)
        } else {
            self.clock.peek(now)
        };

        if !self.state.is_exporting()
            && let Some(audio) = self.audio.as_mut()
        {
            audio.on_frame(&tick, self.spec.duration, &self.state);
        }

        let drawn = self.draw(&tick);

        if running {
            self.arm();
        }
        if drawn { self.last_frame.as_ref() } else { None }
    }

    /// Render the frame at `progress` without touching the clock or the loop.
    pub fn render_at(&mut self, progress: Progress) -> StoryResult<Option<FrameRGBA>> {
        let Some(image) = self.image.as_ref() else {
            return Ok(None);
        };
        let transform = resolve(self.spec.kind, progress);
        let reveal = match self.overlay.as_ref() {
            Some(o) => resolve_reveal(
                text_motion(self.spec.kind, self.selection.active_preset_id()),
                progress,
                o.text.chars().count(),
            ),
            None => RevealState::Full,
        };
        self.renderer
            .render(&image.prepared, &transform, self.overlay.as_ref(), reveal)
            .map(Some)
    }

    fn draw(&mut self, tick: &ClockTick) -> bool {
        let frame = match self.render_at(tick.progress) {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                tracing::trace!("no image loaded, nothing to draw");
                return false;
            }
            Err(err) => {
                tracing::warn!(error = %err, progress = tick.progress.get(), "frame render failed, skipping");
                return false;
            }
        };
        if let Some(sink) = self.preview.as_mut() {
            match sink.push_frame(FrameIndex(self.presented), &frame) {
                Ok(()) => self.presented += 1,
                Err(err) => tracing::warn!(error = %err, "preview sink rejected frame"),
            }
        }
        self.last_frame = Some(frame);
        true
    }

    /// Ask for one frame even while paused.
    pub fn request_redraw(&mut self) {
        if !self.closed {
            self.arm();
        }
    }

    fn arm(&mut self) {
        if self.pending.is_none() && !self.closed {
            self.pending = Some(self.scheduler.request_frame());
        }
    }

    fn disarm(&mut self) {
        if let Some(id) = self.pending.take() {
            self.scheduler.cancel_frame(id);
        }
    }

    /// Tear down: cancel the pending frame, silence audio, end the preview.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.disarm();
        self.closed = true;
        if let Some(audio) = self.audio.as_mut() {
            audio.stop_and_rewind();
        }
        if let Some(mut sink) = self.preview.take()
            && let Err(err) = sink.end()
        {
            tracing::warn!(error = %err, "preview sink failed to end");
        }
        tracing::debug!("viewer closed");
    }

    /// Whether [`Self::close`] ran.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<S: FrameScheduler> Drop for StoryViewer<S> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
#[path = "../tests/unit/viewer.rs"]
mod tests;
