//! Paint-opportunity scheduling for the render loop.

use std::time::{Duration, Instant};

/// Handle for one requested frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameRequestId(pub u64);

/// Source of paint opportunities.
///
/// At most one request is outstanding: requesting again replaces the previous request.
pub trait FrameScheduler {
    /// Ask for a callback at the next paint opportunity.
    fn request_frame(&mut self) -> FrameRequestId;
    /// Drop the request `id` if it is still pending.
    fn cancel_frame(&mut self, id: FrameRequestId);
    /// Block until the pending request fires and return its timestamp.
    ///
    /// Returns `None` when nothing is requested.
    fn wait_for_frame(&mut self) -> Option<Duration>;
    /// Current timestamp on the scheduler's clock.
    fn now(&self) -> Duration;
    /// Whether a request is pending.
    fn has_pending(&self) -> bool;
}

/// Display refresh used when nothing else is configured.
pub const DEFAULT_REFRESH: Duration = Duration::from_nanos(16_666_667);

/// Wall-clock scheduler that paces frames to a fixed refresh interval.
#[derive(Debug)]
pub struct RealtimeScheduler {
    origin: Instant,
    interval: Duration,
    next_id: u64,
    pending: Option<FrameRequestId>,
    last_fire: Option<Duration>,
}

impl RealtimeScheduler {
    /// Scheduler firing at most once per `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            origin: Instant::now(),
            interval,
            next_id: 0,
            pending: None,
            last_fire: None,
        }
    }
}

impl Default for RealtimeScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH)
    }
}

impl FrameScheduler for RealtimeScheduler {
    fn request_frame(&mut self) -> FrameRequestId {
        self.next_id += 1;
        let id = FrameRequestId(self.next_id);
        self.pending = Some(id);
        id
    }

    fn cancel_frame(&mut self, id: FrameRequestId) {
        if self.pending == Some(id) {
            self.pending = None;
        }
    }

    fn wait_for_frame(&mut self) -> Option<Duration> {
        self.pending.take()?;
        if let Some(last) = self.last_fire {
            let due = last + self.interval;
            let now = self.now();
            if due > now {
                std::thread::sleep(due - now);
            }
        }
        let fired = self.now();
        self.last_fire = Some(fired);
        Some(fired)
    }

    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Deterministic scheduler on virtual time.
///
/// Every fired request advances the clock by exactly one interval. Used by tests and by
/// offline export, where frames are produced as fast as they render.
#[derive(Debug, Clone)]
pub struct VirtualScheduler {
    now: Duration,
    interval: Duration,
    next_id: u64,
    pending: Option<FrameRequestId>,
}

impl VirtualScheduler {
    /// Virtual clock starting at zero.
    pub fn new(interval: Duration) -> Self {
        Self {
            now: Duration::ZERO,
            interval,
            next_id: 0,
            pending: None,
        }
    }

    /// Let `by` pass without firing anything.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    /// Interval between fired frames.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl FrameScheduler for VirtualScheduler {
    fn request_frame(&mut self) -> FrameRequestId {
        self.next_id += 1;
        let id = FrameRequestId(self.next_id);
        self.pending = Some(id);
        id
    }

    fn cancel_frame(&mut self, id: FrameRequestId) {
        if self.pending == Some(id) {
            self.pending = None;
        }
    }

    fn wait_for_frame(&mut self) -> Option<Duration> {
        self.pending.take()?;
        self.now += self.interval;
        Some(self.now)
    }

    fn now(&self) -> Duration {
        self.now
    }

    fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/schedule.rs"]
mod tests;
