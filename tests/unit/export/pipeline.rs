use std::time::Duration;

use super::*;
use crate::assets::decode::SourceImage;
use crate::assets::text::FontBook;
use crate::encode::sink::InMemoryCapture;
use crate::export::mime::{MIME_PREFERENCES, NO_FORMAT_ALERT};
use crate::foundation::core::Canvas;
use crate::playback::schedule::VirtualScheduler;
use crate::playback::state::PlaybackState;
use crate::render::cpu::{FrameRenderer, RendererOpts};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("storyloop_export_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn viewer() -> StoryViewer<VirtualScheduler> {
    let opts = RendererOpts {
        canvas: Canvas {
            width: 18,
            height: 32,
        },
        ..RendererOpts::default()
    };
    let renderer = FrameRenderer::new(opts, FontBook::new()).unwrap();
    let mut v = StoryViewer::new(
        VirtualScheduler::new(DEFAULT_EXPORT_FPS.frame_interval()),
        renderer,
    );
    let mut png = Vec::new();
    image::RgbaImage::from_pixel(4, 4, image::Rgba([250, 200, 10, 255]))
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    v.set_image(SourceImage::from_bytes(png).unwrap());
    v.set_manual_duration(Duration::from_secs(1)).unwrap();
    v
}

fn pipeline(
    backend: InMemoryCapture,
    dir: &std::path::Path,
) -> ExportPipeline<InMemoryCapture, CollectingNotifier> {
    ExportPipeline::new(
        backend,
        CollectingNotifier::default(),
        Downloads::new(dir),
        ExportSettings::default(),
    )
}

#[test]
fn exports_one_loop_and_resumes_playing() {
    let dir = scratch_dir("ok");
    let backend = InMemoryCapture::new(["video/webm;codecs=vp9"]);
    let log = backend.log();
    let mut p = pipeline(backend, &dir);
    let mut v = viewer();

    let report = p.export(&mut v).unwrap();
    assert_eq!(report.mime, "video/webm;codecs=vp9");
    assert_eq!(report.frames, 30);
    assert!(!report.with_audio);
    assert!(report.path.exists());
    assert_eq!(report.path.extension().and_then(|e| e.to_str()), Some("webm"));
    assert_eq!(p.phase(), ExportPhase::Idle);
    assert!(p.notifier().messages().is_empty());
    assert_eq!(v.state(), &PlaybackState::Playing);

    let log = log.lock().unwrap();
    assert!(log.stopped);
    let spec = log.spec.as_ref().unwrap();
    assert_eq!((spec.width, spec.height), (18, 32));
    assert_eq!(spec.video_bits_per_second, 8_000_000);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn unsupported_platform_changes_nothing() {
    let dir = scratch_dir("unsupported");
    let mut p = pipeline(InMemoryCapture::new(["video/ogg"]), &dir);
    let mut v = viewer();
    v.run_once();

    let err = p.export(&mut v).unwrap_err();
    assert!(matches!(err, StoryError::UnsupportedPlatform(_)));
    assert_eq!(p.notifier().messages(), [NO_FORMAT_ALERT]);
    assert_eq!(v.state(), &PlaybackState::Paused);
    assert_eq!(p.phase(), ExportPhase::Idle);
    assert!(!dir.exists());
}

#[test]
fn encoder_failure_cleans_up_and_alerts_once() {
    let dir = scratch_dir("fail");
    let backend = InMemoryCapture::new(MIME_PREFERENCES).failing_after(5);
    let log = backend.log();
    let mut p = pipeline(backend, &dir);
    let mut v = viewer();
    v.play();

    assert!(p.export(&mut v).is_err());
    assert_eq!(p.notifier().messages(), [EXPORT_FAILED_ALERT]);
    assert_eq!(p.phase(), ExportPhase::Failed);
    assert!(matches!(v.state(), PlaybackState::Failed(_)));
    assert!(!v.is_armed());
    assert!(log.lock().unwrap().aborted);
    assert!(!dir.exists());

    // a later attempt starts from Failed
    let ok = InMemoryCapture::new(MIME_PREFERENCES);
    let mut p = pipeline(ok, &dir);
    assert!(p.export(&mut v).is_ok());
    assert_eq!(v.state(), &PlaybackState::Playing);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_audio_degrades_to_video_only() {
    let dir = scratch_dir("audio");
    let mut p = ExportPipeline::new(
        InMemoryCapture::new(["video/mp4"]),
        CollectingNotifier::default(),
        Downloads::new(&dir),
        ExportSettings {
            audio: Some(dir.join("does-not-exist.mp3")),
            ..ExportSettings::default()
        },
    );
    let mut v = viewer();
    let report = p.export(&mut v).unwrap();
    assert!(!report.with_audio);
    assert_eq!(report.path.extension().and_then(|e| e.to_str()), Some("mp4"));
    assert!(p.notifier().messages().is_empty());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn export_without_image_is_rejected_quietly() {
    let dir = scratch_dir("noimage");
    let mut p = pipeline(InMemoryCapture::new(MIME_PREFERENCES), &dir);
    let renderer = FrameRenderer::new(RendererOpts::default(), FontBook::new()).unwrap();
    let mut v = StoryViewer::new(VirtualScheduler::new(Duration::from_millis(10)), renderer);
    assert!(matches!(p.export(&mut v), Err(StoryError::Validation(_))));
    assert!(p.notifier().messages().is_empty());
}
