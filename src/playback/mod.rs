//! Animation clock, frame scheduling, and the playback state machine.

/// Phase-preserving loop clock.
pub mod clock;
/// Frame request scheduling.
pub mod schedule;
/// Playback state machine.
pub mod state;
