//! Video export: format negotiation, fixed-rate capture, the export state machine and
//! download naming.

/// Fixed-rate sampling of presented frames.
pub mod capture;
/// Artifact naming and saving.
pub mod download;
/// Container/codec negotiation.
pub mod mime;
/// The export state machine.
pub mod pipeline;
