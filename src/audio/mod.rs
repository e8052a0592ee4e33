//! Audio: loop-locked preview playback and export-time PCM preparation.

/// Export audio decoding and temp file handling.
pub mod graph;
/// Loop-boundary resync for preview audio.
pub mod sync;
