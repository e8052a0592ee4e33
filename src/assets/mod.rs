//! Source assets: the background image, fonts, and colors.

/// Color parsing.
pub mod color;
/// Image decoding and cover fitting.
pub mod decode;
/// Font book and line shaping.
pub mod text;
