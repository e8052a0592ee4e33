//! Fixed-rate sampling of the rendered surface into an encoder.
//!
//! The render loop presents frames at whatever cadence the scheduler gives it. The capture
//! stream turns that into a steady `fps` sequence: every sample slot that falls due within half
//! an interval of the offered frame receives that frame, so a slow loop yields duplicated frames
//! and a fast loop yields dropped ones. Presentation times that drift by rounding from the exact
//! slot grid still land on their own slot. Recording ends on elapsed time, never on a frame count.

use std::time::Duration;

use crate::encode::sink::{EncodedBlob, EncoderHandle};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{StoryError, StoryResult};
use crate::render::backend::FrameRGBA;

/// Whether the stream wants more frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureStatus {
    /// Keep offering frames.
    Recording,
    /// One full duration has been captured; call [`CaptureStream::finish`].
    Complete,
}

/// Samples offered frames at a fixed rate and feeds them to an encoder.
pub struct CaptureStream {
    encoder: Option<Box<dyn EncoderHandle>>,
    fps: Fps,
    duration: Duration,
    started_at: Option<Duration>,
    next_slot: u64,
    pushed: u64,
}

impl CaptureStream {
    /// Wrap `encoder`, sampling at `fps` for `duration`.
    pub fn new(encoder: Box<dyn EncoderHandle>, fps: Fps, duration: Duration) -> Self {
        Self {
            encoder: Some(encoder),
            fps,
            duration,
            started_at: None,
            next_slot: 0,
            pushed: 0,
        }
    }

    /// Time since the first offered frame.
    pub fn elapsed(&self, now: Duration) -> Duration {
        self.started_at
            .map_or(Duration::ZERO, |start| now.saturating_sub(start))
    }

    /// Frames handed to the encoder so far.
    pub fn frames_pushed(&self) -> u64 {
        self.pushed
    }

    /// Offer the surface as presented at `now`.
    ///
    /// `frame` is `None` while nothing has been drawn yet; due slots are then skipped.
    pub fn offer(&mut self, now: Duration, frame: Option<&FrameRGBA>) -> StoryResult<CaptureStatus> {
        let start = *self.started_at.get_or_insert(now);
        let elapsed = now.saturating_sub(start);
        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| StoryError::encoder("capture stream already finished"))?;
        let due_by = elapsed + self.fps.frame_interval() / 2;

        while let Some(slot_at) = slot_time(self.fps, self.next_slot)
            && slot_at <= due_by
            && slot_at < self.duration
        {
            match frame {
                Some(f) => {
                    encoder.push_frame(FrameIndex(self.next_slot), f)?;
                    self.pushed += 1;
                }
                None => tracing::warn!(slot = self.next_slot, "no frame drawn yet, capture slot dropped"),
            }
            self.next_slot += 1;
        }

        if elapsed >= self.duration {
            Ok(CaptureStatus::Complete)
        } else {
            Ok(CaptureStatus::Recording)
        }
    }

    /// Stop the encoder and collect its output.
    pub fn finish(mut self) -> StoryResult<EncodedBlob> {
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| StoryError::encoder("capture stream already finished"))?;
        tracing::debug!(frames = self.pushed, "stopping encoder");
        encoder.stop()
    }

    /// Tear the encoder down without output.
    pub fn abort(mut self) {
        if let Some(encoder) = self.encoder.take() {
            encoder.abort();
        }
    }
}

impl Drop for CaptureStream {
    fn drop(&mut self) {
        if let Some(encoder) = self.encoder.take() {
            tracing::debug!("capture stream dropped while recording, aborting encoder");
            encoder.abort();
        }
    }
}

/// Exact start of sample slot `slot`, in whole nanoseconds.
fn slot_time(fps: Fps, slot: u64) -> Option<Duration> {
    let nanos = u128::from(slot) * u128::from(fps.den) * 1_000_000_000 / u128::from(fps.num);
    u64::try_from(nanos).ok().map(Duration::from_nanos)
}

#[cfg(test)]
#[path = "../../tests/unit/export/capture.rs"]
mod tests;
