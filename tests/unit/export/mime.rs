use super::*;
use crate::encode::sink::InMemoryCapture;

#[test]
fn prefers_h264_mp4_when_available() {
    let backend = InMemoryCapture::new(MIME_PREFERENCES);
    assert_eq!(negotiate(&backend).unwrap(), MIME_PREFERENCES[0]);
}

#[test]
fn falls_back_in_preference_order() {
    let backend = InMemoryCapture::new(["video/webm", "video/webm;codecs=vp9"]);
    assert_eq!(negotiate(&backend).unwrap(), "video/webm;codecs=vp9");
}

#[test]
fn no_supported_type_is_unsupported_platform() {
    let backend = InMemoryCapture::new(["video/ogg"]);
    let err = negotiate(&backend).unwrap_err();
    assert!(matches!(err, StoryError::UnsupportedPlatform(ref m) if m == NO_FORMAT_ALERT));

    let err = negotiate(&InMemoryCapture::unavailable()).unwrap_err();
    assert!(matches!(err, StoryError::UnsupportedPlatform(ref m) if m == CAPTURE_UNAVAILABLE_ALERT));
}

#[test]
fn extension_follows_container() {
    assert_eq!(extension_for(MIME_PREFERENCES[0]), "mp4");
    assert_eq!(extension_for("video/mp4"), "mp4");
    assert_eq!(extension_for("video/webm;codecs=h264"), "webm");
    assert_eq!(extension_for("video/webm"), "webm");
}
