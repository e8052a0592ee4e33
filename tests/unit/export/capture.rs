use super::*;
use crate::encode::sink::{CaptureBackend, InMemoryCapture, StreamSpec};

fn spec() -> StreamSpec {
    StreamSpec {
        width: 2,
        height: 2,
        fps: Fps { num: 30, den: 1 },
        mime: "video/webm".to_owned(),
        video_bits_per_second: 1,
        audio: None,
    }
}

fn frame() -> FrameRGBA {
    FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 16],
        premultiplied: true,
    }
}

fn stream(backend: &mut InMemoryCapture, duration: Duration) -> CaptureStream {
    let enc = backend.begin_capture(spec()).unwrap();
    CaptureStream::new(enc, Fps { num: 30, den: 1 }, duration)
}

#[test]
fn slot_times_are_exact() {
    let fps = Fps { num: 30, den: 1 };
    assert_eq!(slot_time(fps, 0), Some(Duration::ZERO));
    assert_eq!(slot_time(fps, 30), Some(Duration::from_secs(1)));
    assert_eq!(slot_time(fps, 150), Some(Duration::from_secs(5)));
}

#[test]
fn sixty_hz_loop_yields_duration_times_fps_frames() {
    let mut backend = InMemoryCapture::new(["video/webm"]);
    let log = backend.log();
    let duration = Duration::from_secs(2);
    let mut cap = stream(&mut backend, duration);
    let f = frame();
    let step = Duration::from_nanos(16_666_667);
    let mut now = Duration::from_secs(3);
    let mut ticks = 0;
    while cap.offer(now, Some(&f)).unwrap() == CaptureStatus::Recording {
        now += step;
        ticks += 1;
        assert!(ticks < 1000);
    }
    assert!(cap.elapsed(now) >= duration);
    assert_eq!(cap.frames_pushed(), 60);
    let blob = cap.finish().unwrap();
    assert_eq!(blob.chunks.len(), 60);
    let log = log.lock().unwrap();
    assert!(log.stopped);
    assert_eq!(log.frames.first(), Some(&FrameIndex(0)));
    assert_eq!(log.frames.last(), Some(&FrameIndex(59)));
}

#[test]
fn slow_loop_duplicates_frames() {
    let mut backend = InMemoryCapture::new(["video/webm"]);
    let mut cap = stream(&mut backend, Duration::from_secs(1));
    let f = frame();
    assert_eq!(cap.offer(Duration::ZERO, Some(&f)).unwrap(), CaptureStatus::Recording);
    assert_eq!(cap.frames_pushed(), 1);
    // 10 Hz loop: each offer fills three slots
    cap.offer(Duration::from_millis(100), Some(&f)).unwrap();
    assert_eq!(cap.frames_pushed(), 4);
    let status = cap.offer(Duration::from_millis(1000), Some(&f)).unwrap();
    assert_eq!(status, CaptureStatus::Complete);
    assert_eq!(cap.frames_pushed(), 30);
}

#[test]
fn missing_frame_consumes_slots_without_pushing() {
    let mut backend = InMemoryCapture::new(["video/webm"]);
    let mut cap = stream(&mut backend, Duration::from_secs(1));
    cap.offer(Duration::ZERO, None).unwrap();
    assert_eq!(cap.frames_pushed(), 0);
    cap.offer(Duration::from_millis(40), Some(&frame())).unwrap();
    assert_eq!(cap.frames_pushed(), 1);
}

#[test]
fn encoder_error_propagates_and_drop_aborts() {
    let mut backend = InMemoryCapture::new(["video/webm"]).failing_after(2);
    let log = backend.log();
    let mut cap = stream(&mut backend, Duration::from_secs(1));
    let f = frame();
    cap.offer(Duration::ZERO, Some(&f)).unwrap();
    let err = cap.offer(Duration::from_millis(100), Some(&f));
    assert!(err.is_err());
    drop(cap);
    assert!(log.lock().unwrap().aborted);
}

struct TaggingEncoder {
    tags: std::sync::Arc<std::sync::Mutex<Vec<u8>>>,
}

impl EncoderHandle for TaggingEncoder {
    fn push_frame(&mut self, _idx: FrameIndex, frame: &FrameRGBA) -> StoryResult<()> {
        self.tags.lock().unwrap().push(frame.data[0]);
        Ok(())
    }

    fn stop(self: Box<Self>) -> StoryResult<EncodedBlob> {
        Ok(EncodedBlob {
            mime: "video/webm".to_owned(),
            chunks: Vec::new(),
        })
    }

    fn abort(self: Box<Self>) {}
}

#[test]
fn rounded_virtual_steps_keep_each_frame_on_its_own_slot() {
    let fps = Fps { num: 30, den: 1 };
    let tags = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let enc = Box::new(TaggingEncoder { tags: tags.clone() });
    let mut cap = CaptureStream::new(enc, fps, Duration::from_secs(1));
    let step = fps.frame_interval();
    assert_eq!(step, Duration::from_nanos(33_333_333));

    let mut j: u32 = 0;
    loop {
        let f = FrameRGBA {
            width: 2,
            height: 2,
            data: vec![j as u8; 16],
            premultiplied: true,
        };
        if cap.offer(step * (j + 1), Some(&f)).unwrap() == CaptureStatus::Complete {
            break;
        }
        j += 1;
        assert!(j < 100);
    }

    assert_eq!(cap.frames_pushed(), 30);
    let tags = tags.lock().unwrap().clone();
    let expected: Vec<u8> = (0..30).collect();
    assert_eq!(tags, expected);
}
