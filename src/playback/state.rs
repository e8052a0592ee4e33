use std::fmt;

/// What the viewer is doing.
///
/// Only [`PlaybackState::Playing`] and [`PlaybackState::Exporting`] keep the render loop armed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    /// Loop stopped; the last frame stays on screen.
    #[default]
    Paused,
    /// Loop running, audio following.
    Playing,
    /// Loop running for capture; play/pause requests are ignored.
    Exporting,
    /// Last export failed; behaves like paused until the user acts.
    Failed(String),
}

/// Inputs that move [`PlaybackState`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Start or resume the loop.
    Play,
    /// Stop the loop.
    Pause,
    /// Flip between play and pause.
    Toggle,
    /// Capture is about to start.
    BeginExport,
    /// Capture finished and the file was handed off.
    FinishExport,
    /// Capture failed.
    FailExport(String),
}

impl PlaybackState {
    /// Whether the render loop should re-arm after a frame.
    pub fn keeps_loop_armed(&self) -> bool {
        matches!(self, Self::Playing | Self::Exporting)
    }

    /// Whether an export is in flight.
    pub fn is_exporting(&self) -> bool {
        matches!(self, Self::Exporting)
    }

    /// Whether the loop is playing for the user.
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    /// State after `event`, or `None` when the event does not apply.
    pub fn next(&self, event: &PlaybackEvent) -> Option<Self> {
        use PlaybackEvent as E;
        match (self, event) {
            (Self::Exporting, E::FinishExport) => Some(Self::Playing),
            (Self::Exporting, E::FailExport(msg)) => Some(Self::Failed(msg.clone())),
            (Self::Exporting, _) => None,
            (_, E::BeginExport) => Some(Self::Exporting),
            (Self::Playing, E::Play) | (Self::Paused, E::Pause) => None,
            (_, E::Play) => Some(Self::Playing),
            (_, E::Pause) => Some(Self::Paused),
            (Self::Playing, E::Toggle) => Some(Self::Paused),
            (_, E::Toggle) => Some(Self::Playing),
            (_, E::FinishExport | E::FailExport(_)) => None,
        }
    }

    /// Apply `event` in place; returns whether the state changed.
    pub fn apply(&mut self, event: PlaybackEvent) -> bool {
        match self.next(&event) {
            Some(next) => {
                tracing::debug!(from = %self, to = %next, ?event, "playback transition");
                *self = next;
                true
            }
            None => false,
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paused => f.write_str("paused"),
            Self::Playing => f.write_str("playing"),
            Self::Exporting => f.write_str("exporting"),
            Self::Failed(msg) => write!(f, "failed: {msg}"),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/state.rs"]
mod tests;
