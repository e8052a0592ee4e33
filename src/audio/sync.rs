use std::time::Duration;

use crate::foundation::error::StoryResult;
use crate::playback::clock::ClockTick;
use crate::playback::state::PlaybackState;

/// A playable audio track the viewer keeps in step with the visual loop.
pub trait AudioElement {
    /// Start or resume playback. May be refused by the platform.
    fn play(&mut self) -> StoryResult<()>;
    /// Pause playback, keeping the position.
    fn pause(&mut self);
    /// Jump back to the beginning of the track.
    fn seek_to_start(&mut self);
    /// Mute or unmute output.
    fn set_muted(&mut self, muted: bool);
}

/// Resync tunables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AudioSyncConfig {
    /// How far past a loop boundary a frame may land and still trigger a resync.
    #[serde(rename = "resync_epsilon_ms", with = "millis")]
    pub resync_epsilon: Duration,
    /// No resync before this much elapsed time, so the first frame never restarts audio.
    #[serde(rename = "startup_guard_ms", with = "millis")]
    pub startup_guard: Duration,
}

impl Default for AudioSyncConfig {
    fn default() -> Self {
        Self {
            resync_epsilon: Duration::from_millis(50),
            startup_guard: Duration::from_millis(100),
        }
    }
}

mod millis {
    use std::time::Duration;

    pub(super) fn serialize<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub(super) fn deserialize<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let ms = <u64 as serde::Deserialize>::deserialize(d)?;
        Ok(Duration::from_millis(ms))
    }
}

/// Restarts a looping audio element at every visual loop boundary.
///
/// Native looping follows the track length, not the animation duration, so the controller
/// seeks back to zero itself whenever the visual loop wraps.
pub struct AudioSyncController {
    element: Box<dyn AudioElement>,
    cfg: AudioSyncConfig,
    muted: bool,
    last_resync_loop: Option<u64>,
}

impl AudioSyncController {
    /// Wrap `element`; it starts unmuted.
    pub fn new(element: Box<dyn AudioElement>, cfg: AudioSyncConfig) -> Self {
        let mut this = Self {
            element,
            cfg,
            muted: false,
            last_resync_loop: None,
        };
        this.element.set_muted(false);
        this
    }

    /// Swap the track. Mute and resync bookkeeping reset; the visual clock is untouched.
    pub fn replace_element(&mut self, element: Box<dyn AudioElement>) {
        self.element.pause();
        self.element = element;
        self.muted = false;
        self.last_resync_loop = None;
        self.element.set_muted(false);
    }

    /// Check a rendered frame for a loop boundary; returns whether audio was restarted.
    pub fn on_frame(&mut self, tick: &ClockTick, duration: Duration, state: &PlaybackState) -> bool {
        if !state.is_playing() {
            return false;
        }
        let d = duration.as_nanos().max(1);
        let loop_time = Duration::from_nanos((tick.elapsed.as_nanos() % d) as u64);
        if loop_time >= self.cfg.resync_epsilon || tick.elapsed <= self.cfg.startup_guard {
            return false;
        }
        if self.last_resync_loop == Some(tick.loop_index) {
            return false;
        }
        self.last_resync_loop = Some(tick.loop_index);
        self.element.seek_to_start();
        if let Err(err) = self.element.play() {
            tracing::debug!(error = %err, "audio play refused on resync");
        }
        tracing::trace!(loop_index = tick.loop_index, "audio resynced to loop start");
        true
    }

    /// Follow the playback state: play while playing, pause otherwise.
    pub fn sync_playback(&mut self, state: &PlaybackState) {
        if state.is_playing() {
            if let Err(err) = self.element.play() {
                tracing::debug!(error = %err, "audio play refused");
            }
        } else {
            self.element.pause();
        }
    }

    /// Pause and rewind, as export requires.
    pub fn stop_and_rewind(&mut self) {
        self.element.pause();
        self.element.seek_to_start();
        self.last_resync_loop = None;
    }

    /// Whether output is muted.
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Mute or unmute; independent of play/pause.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.element.set_muted(muted);
    }

    /// Flip mute; returns the new value.
    pub fn toggle_mute(&mut self) -> bool {
        self.set_muted(!self.muted);
        self.muted
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/sync.rs"]
mod tests;
