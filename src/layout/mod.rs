//! Text layout: word wrapping and overlay placement.

/// Overlay anchors and placement.
pub mod anchor;
/// Greedy word wrap and typewriter truncation.
pub mod wrap;
