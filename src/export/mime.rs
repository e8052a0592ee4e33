use crate::encode::sink::CaptureBackend;
use crate::foundation::error::{StoryError, StoryResult};

/// Container/codec preference, best first.
pub const MIME_PREFERENCES: [&str; 5] = [
    "video/mp4;codecs=avc1.42E01E,mp4a.40.2",
    "video/mp4",
    "video/webm;codecs=h264",
    "video/webm;codecs=vp9",
    "video/webm",
];

/// Alert shown when the backend has no capture support at all.
pub const CAPTURE_UNAVAILABLE_ALERT: &str = "Video export is not supported on this system.";
/// Alert shown when capture exists but no preferred format is encodable.
pub const NO_FORMAT_ALERT: &str = "This system does not support any video export format.";

/// Pick the first preferred mime type the backend can encode.
///
/// Fails with [`StoryError::UnsupportedPlatform`] carrying the user-facing message.
pub fn negotiate(backend: &dyn CaptureBackend) -> StoryResult<&'static str> {
    if !backend.is_available() {
        return Err(StoryError::unsupported(CAPTURE_UNAVAILABLE_ALERT));
    }
    MIME_PREFERENCES
        .into_iter()
        .find(|m| backend.is_type_supported(m))
        .ok_or_else(|| StoryError::unsupported(NO_FORMAT_ALERT))
}

/// File extension for a negotiated mime type.
pub fn extension_for(mime: &str) -> &'static str {
    if mime.contains("mp4") { "mp4" } else { "webm" }
}

#[cfg(test)]
#[path = "../../tests/unit/export/mime.rs"]
mod tests;
