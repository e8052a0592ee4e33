//! Encoding: preview sinks and capture encoders.
//!
//! Capture encoders consume frames sampled from the rendered surface and emit container chunks.

/// `ffmpeg`-based capture backend.
pub mod ffmpeg;
/// Sink and encoder traits plus in-memory implementations.
pub mod sink;
