use std::sync::{Arc, Mutex};

use super::*;
use crate::assets::text::FontBook;
use crate::audio::sync::{AudioElement, AudioSyncConfig};
use crate::foundation::core::Canvas;
use crate::playback::schedule::VirtualScheduler;
use crate::render::cpu::RendererOpts;

const STEP: Duration = Duration::from_millis(10);

fn png(w: u32, h: u32) -> Vec<u8> {
    let mut out = Vec::new();
    image::RgbaImage::from_pixel(w, h, image::Rgba([30, 120, 200, 255]))
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}

fn viewer() -> StoryViewer<VirtualScheduler> {
    let opts = RendererOpts {
        canvas: Canvas {
            width: 36,
            height: 64,
        },
        ..RendererOpts::default()
    };
    let renderer = FrameRenderer::new(opts, FontBook::new()).unwrap();
    let mut v = StoryViewer::new(VirtualScheduler::new(STEP), renderer);
    v.set_manual_duration(Duration::from_secs(1)).unwrap();
    v
}

fn loaded() -> StoryViewer<VirtualScheduler> {
    let mut v = viewer();
    v.set_image(SourceImage::from_bytes(png(8, 8)).unwrap());
    v
}

#[derive(Clone, Default)]
struct CountingSink(Arc<Mutex<Vec<FrameIndex>>>);

impl FrameSink for CountingSink {
    fn begin(&mut self, _cfg: SinkConfig) -> StoryResult<()> {
        Ok(())
    }
    fn push_frame(&mut self, idx: FrameIndex, _frame: &FrameRGBA) -> StoryResult<()> {
        self.0.lock().unwrap().push(idx);
        Ok(())
    }
    fn end(&mut self) -> StoryResult<()> {
        Ok(())
    }
}

#[derive(Clone, Default)]
struct FakeAudio(Arc<Mutex<Vec<&'static str>>>);

impl AudioElement for FakeAudio {
    fn play(&mut self) -> StoryResult<()> {
        self.0.lock().unwrap().push("play");
        Ok(())
    }
    fn pause(&mut self) {
        self.0.lock().unwrap().push("pause");
    }
    fn seek_to_start(&mut self) {
        self.0.lock().unwrap().push("seek");
    }
    fn set_muted(&mut self, _muted: bool) {}
}

#[test]
fn loading_an_image_draws_once_while_paused() {
    let mut v = loaded();
    assert_eq!(v.state(), &PlaybackState::Paused);
    assert!(v.is_armed());
    assert!(v.run_once().is_some());
    assert!(v.last_frame().is_some());
    assert!(!v.is_armed());
    assert!(!v.clock().is_started());
    assert!(v.run_once().is_none());
}

#[test]
fn nothing_is_drawn_without_an_image() {
    let mut v = viewer();
    v.play();
    assert!(v.run_once().is_some());
    assert!(v.last_frame().is_none());
    assert!(v.is_armed());
}

#[test]
fn playing_rearms_every_frame_and_presents() {
    let mut v = loaded();
    let sink = CountingSink::default();
    v.set_preview_sink(Box::new(sink.clone()), Fps { num: 100, den: 1 })
        .unwrap();
    v.play();
    assert_eq!(v.run_for(Duration::from_millis(100)), 10);
    assert!(v.is_armed());
    let presented = sink.0.lock().unwrap().clone();
    assert_eq!(presented.len(), 10);
    assert!(presented.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn pause_keeps_frame_and_resume_keeps_phase() {
    let mut v = loaded();
    v.play();
    for _ in 0..5 {
        v.run_once();
    }
    let now = v.scheduler().now();
    let before = v.clock().peek(now).elapsed;
    assert_eq!(before, Duration::from_millis(40));

    assert!(v.pause());
    assert!(!v.is_armed());
    assert!(v.last_frame().is_some());
    assert!(v.run_once().is_none());

    v.scheduler_mut().advance(Duration::from_secs(3));
    assert_eq!(v.clock().peek(v.scheduler().now()).elapsed, before);

    assert!(v.play());
    v.run_once();
    let after = v.clock().peek(v.scheduler().now()).elapsed;
    assert_eq!(after, before);
}

#[test]
fn changing_the_animation_restarts_the_phase() {
    let mut v = loaded();
    v.play();
    v.run_for(Duration::from_millis(200));
    assert!(v.clock().is_started());

    v.choose_preset("hype");
    assert!(!v.clock().is_started());
    assert_eq!(v.spec().duration, Duration::from_secs(5));
    v.run_once();
    assert_eq!(v.clock().peek(v.scheduler().now()).elapsed, Duration::ZERO);

    v.run_for(Duration::from_millis(50));
    v.set_image(SourceImage::from_bytes(png(4, 4)).unwrap());
    assert!(!v.clock().is_started());
}

#[test]
fn same_spec_keeps_phase() {
    let mut v = loaded();
    v.play();
    v.run_for(Duration::from_millis(50));
    v.set_manual_duration(Duration::from_secs(1)).unwrap();
    assert!(v.clock().is_started());
}

#[test]
fn export_ignores_play_and_pause() {
    let mut v = loaded();
    v.play();
    v.run_for(Duration::from_millis(300));
    v.begin_export();
    assert!(v.state().is_exporting());
    assert!(!v.clock().is_started());
    assert!(!v.pause());
    assert!(!v.toggle());
    assert!(v.is_armed());

    v.fail_export("boom");
    assert_eq!(v.state(), &PlaybackState::Failed("boom".to_owned()));
    assert!(!v.is_armed());
    assert!(v.play());
    assert!(v.is_armed());
}

#[test]
fn audio_follows_state_and_rewinds_for_export() {
    let mut v = loaded();
    let audio = FakeAudio::default();
    v.set_audio(AudioSyncController::new(
        Box::new(audio.clone()),
        AudioSyncConfig::default(),
    ));
    v.play();
    v.pause();
    v.begin_export();
    v.finish_export();
    let calls = audio.0.lock().unwrap().clone();
    assert_eq!(calls, ["pause", "play", "pause", "pause", "seek", "play"]);
    assert!(v.state().is_playing());
}

#[test]
fn close_cancels_the_pending_frame() {
    let mut v = loaded();
    v.play();
    v.run_once();
    assert!(v.scheduler().has_pending());
    v.close();
    assert!(v.is_closed());
    assert!(!v.scheduler().has_pending());
    assert!(v.run_once().is_none());
    v.play();
    assert!(!v.scheduler().has_pending());
}

#[test]
fn render_at_is_independent_of_the_loop() {
    let mut v = loaded();
    v.set_overlay(Some(TextOverlay::new("hello")));
    let frame = v.render_at(Progress::new(0.5)).unwrap().unwrap();
    assert_eq!((frame.width, frame.height), (36, 64));
    assert!(!v.clock().is_started());
}

#[test]
fn failed_image_load_stalls_quietly() {
    let mut v = viewer();
    let missing = std::env::temp_dir().join("storyloop_missing_image.png");
    assert!(!v.load_image(&missing));
    assert!(v.image().is_none());
    v.play();
    v.run_once();
    assert!(v.last_frame().is_none());
}
