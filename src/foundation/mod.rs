//! Core value types shared by every layer.

/// Canvas, fps, progress and pixel types.
pub mod core;
/// Crate error type.
pub mod error;
pub(crate) mod math;
