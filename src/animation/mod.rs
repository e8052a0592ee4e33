//! Animation kinds, presets, and the per-frame parameter resolver.

/// Animation kind vocabulary.
pub mod kind;
/// Preset catalog and user selection.
pub mod preset;
/// Progress to transform / reveal mapping.
pub mod resolve;
