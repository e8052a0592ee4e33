use super::*;

fn frame() -> FrameRGBA {
    FrameRGBA {
        width: 1,
        height: 1,
        data: vec![0, 0, 0, 255],
        premultiplied: true,
    }
}

fn spec(mime: &str) -> StreamSpec {
    StreamSpec {
        width: 2,
        height: 2,
        fps: Fps::new(30, 1).unwrap(),
        mime: mime.to_owned(),
        video_bits_per_second: 8_000_000,
        audio: None,
    }
}

#[test]
fn in_memory_sink_records_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(SinkConfig {
        width: 1,
        height: 1,
        fps: Fps::new(60, 1).unwrap(),
    })
    .unwrap();
    sink.push_frame(FrameIndex(0), &frame()).unwrap();
    sink.push_frame(FrameIndex(3), &frame()).unwrap();
    assert!(sink.push_frame(FrameIndex(3), &frame()).is_err());
    sink.end().unwrap();
    assert_eq!(sink.frames().len(), 2);
    assert!(sink.ended());
    assert_eq!(sink.config().unwrap().fps.num, 60);
}

#[test]
fn blob_concatenates_chunks() {
    let blob = EncodedBlob {
        mime: "video/webm".into(),
        chunks: vec![vec![1, 2], vec![], vec![3]],
    };
    assert_eq!(blob.len(), 3);
    assert!(!blob.is_empty());
    assert_eq!(blob.into_bytes(), vec![1, 2, 3]);
    assert!(EncodedBlob::default().is_empty());
}

#[test]
fn in_memory_capture_supports_listed_mimes_only() {
    let cap = InMemoryCapture::new(["video/webm"]);
    assert!(cap.is_available());
    assert!(cap.is_type_supported("video/webm"));
    assert!(!cap.is_type_supported("video/mp4"));

    let none = InMemoryCapture::unavailable();
    assert!(!none.is_available());
    assert!(!none.is_type_supported("video/webm"));
}

#[test]
fn in_memory_capture_round_trip() {
    let mut cap = InMemoryCapture::new(["video/webm"]);
    let log = cap.log();
    let mut enc = cap.begin_capture(spec("video/webm")).unwrap();
    for i in 0..3 {
        enc.push_frame(FrameIndex(i), &frame()).unwrap();
    }
    let blob = enc.stop().unwrap();
    assert_eq!(blob.mime, "video/webm");
    assert_eq!(blob.chunks.len(), 3);
    let log = log.lock().unwrap();
    assert!(log.stopped);
    assert_eq!(log.frames, vec![FrameIndex(0), FrameIndex(1), FrameIndex(2)]);
}

#[test]
fn injected_failure_and_abort() {
    let mut cap = InMemoryCapture::new(["video/mp4"]).failing_after(1);
    let log = cap.log();
    assert!(cap.begin_capture(spec("video/webm")).is_err());
    let mut enc = cap.begin_capture(spec("video/mp4")).unwrap();
    enc.push_frame(FrameIndex(0), &frame()).unwrap();
    assert!(enc.push_frame(FrameIndex(1), &frame()).is_err());
    enc.abort();
    assert!(log.lock().unwrap().aborted);
}
