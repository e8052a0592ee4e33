use std::time::Duration;

use crate::foundation::core::Progress;

/// Clock reading for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockTick {
    /// Time since the loop started, pauses excluded.
    pub elapsed: Duration,
    /// Phase within the current loop.
    pub progress: Progress,
    /// Completed loops so far.
    pub loop_index: u64,
}

/// Phase-preserving loop clock.
///
/// Timestamps are monotonic offsets from an arbitrary origin, as handed out by a
/// [`FrameScheduler`](crate::playback::schedule::FrameScheduler). The first tick after a
/// restart anchors the loop, so that frame is exactly progress 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimationClock {
    duration: Duration,
    start: Option<Duration>,
    paused_at: Option<Duration>,
}

impl AnimationClock {
    /// Clock for loops of `duration`; zero durations are treated as one millisecond.
    pub fn new(duration: Duration) -> Self {
        Self {
            duration: duration.max(Duration::from_millis(1)),
            start: None,
            paused_at: None,
        }
    }

    /// Loop length.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Change the loop length; the phase restarts.
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration.max(Duration::from_millis(1));
        self.restart();
    }

    /// Forget the anchor; the next tick is progress 0.
    pub fn restart(&mut self) {
        self.start = None;
        self.paused_at = None;
    }

    /// Whether a tick has anchored the loop.
    pub fn is_started(&self) -> bool {
        self.start.is_some()
    }

    /// Whether the clock is holding a pause.
    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Read the clock at `now`, anchoring it if needed.
    ///
    /// A pending pause is resumed first, so ticking never loses phase.
    pub fn tick(&mut self, now: Duration) -> ClockTick {
        self.resume(now);
        let start = *self.start.get_or_insert(now);
        self.reading(now.saturating_sub(start))
    }

    /// Read the clock without anchoring it. An unanchored clock reads progress 0.
    pub fn peek(&self, now: Duration) -> ClockTick {
        let Some(start) = self.start else {
            return self.reading(Duration::ZERO);
        };
        let at = self.paused_at.unwrap_or(now);
        self.reading(at.saturating_sub(start))
    }

    /// Freeze the phase at `now`.
    pub fn pause(&mut self, now: Duration) {
        if self.start.is_some() && self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    /// Continue from the frozen phase; the paused interval is skipped.
    pub fn resume(&mut self, now: Duration) {
        if let Some(paused_at) = self.paused_at.take() {
            if let Some(start) = self.start.as_mut() {
                *start += now.saturating_sub(paused_at);
            }
        }
    }

    fn reading(&self, elapsed: Duration) -> ClockTick {
        let d = self.duration.as_nanos();
        ClockTick {
            elapsed,
            progress: Progress::from_elapsed(elapsed, self.duration),
            loop_index: (elapsed.as_nanos() / d) as u64,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/clock.rs"]
mod tests;
