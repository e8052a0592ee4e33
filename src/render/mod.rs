//! Frame rendering.

/// Rendered frame type.
pub mod backend;
/// `vello_cpu` frame renderer.
pub mod cpu;
/// Drop shadow blur and mask compositing.
pub mod shadow;
