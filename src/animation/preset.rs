use std::time::Duration;

use crate::animation::kind::AnimationKind;
use crate::foundation::error::{StoryError, StoryResult};

/// Resolved animation: what moves, and how long one loop lasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationSpec {
    /// Animation kind.
    pub kind: AnimationKind,
    /// Loop duration, always non-zero.
    pub duration: Duration,
}

impl AnimationSpec {
    /// Create a validated spec.
    pub fn new(kind: AnimationKind, duration: Duration) -> StoryResult<Self> {
        if duration.is_zero() {
            return Err(StoryError::validation("animation duration must be > 0"));
        }
        Ok(Self { kind, duration })
    }
}

/// Named bundle of kind + duration offered to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Preset {
    /// Stable identifier.
    pub id: &'static str,
    /// Display label.
    pub label: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Animation kind.
    pub kind: AnimationKind,
    /// Loop duration in milliseconds.
    pub duration_ms: u64,
}

impl Preset {
    /// Preset as a resolved spec.
    pub fn spec(&self) -> AnimationSpec {
        AnimationSpec {
            kind: self.kind,
            duration: Duration::from_millis(self.duration_ms),
        }
    }
}

/// Fixed preset catalog.
pub const PRESETS: [Preset; 5] = [
    Preset {
        id: "cinematic",
        label: "Cinematic",
        description: "Slow zoom with elegant feel",
        kind: AnimationKind::ZoomIn,
        duration_ms: 10_000,
    },
    Preset {
        id: "hype",
        label: "Hype / Pop",
        description: "Fast cuts and energetic pulse",
        kind: AnimationKind::Pop,
        duration_ms: 5_000,
    },
    Preset {
        id: "showcase",
        label: "Showcase",
        description: "Panoramic view of the product",
        kind: AnimationKind::PanLeftRight,
        duration_ms: 7_000,
    },
    Preset {
        id: "minimal",
        label: "Minimal",
        description: "Subtle breathing effect",
        kind: AnimationKind::Breathe,
        duration_ms: 7_000,
    },
    Preset {
        id: "dynamic",
        label: "Dynamic",
        description: "Active movement and rotation",
        kind: AnimationKind::ZoomRotate,
        duration_ms: 5_000,
    },
];

/// Preset selected when nothing else is chosen.
pub const DEFAULT_PRESET_ID: &str = "cinematic";

/// Preset whose text overlay is typed out instead of faded up.
pub const TYPEWRITER_PRESET_ID: &str = "hype";

/// Loop durations offered for manual selection, in milliseconds.
pub const DURATION_CHOICES_MS: [u64; 4] = [5_000, 7_000, 10_000, 15_000];

/// Look up a preset by id.
pub fn preset_by_id(id: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.id == id)
}

/// Active preset plus optional manual overrides.
///
/// Manual kind and duration, once set, win over the preset until a new preset is chosen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimationSelection {
    active_preset: String,
    manual_kind: Option<AnimationKind>,
    manual_duration: Option<Duration>,
}

impl Default for AnimationSelection {
    fn default() -> Self {
        Self {
            active_preset: DEFAULT_PRESET_ID.to_owned(),
            manual_kind: None,
            manual_duration: None,
        }
    }
}

impl AnimationSelection {
    /// Selection starting from `preset_id`.
    ///
    /// Unknown ids are kept as-is and resolve through the fallback in [`Self::spec`].
    pub fn with_preset(preset_id: impl Into<String>) -> Self {
        Self {
            active_preset: preset_id.into(),
            manual_kind: None,
            manual_duration: None,
        }
    }

    /// Choose a preset; clears any manual override.
    pub fn choose_preset(&mut self, preset_id: impl Into<String>) {
        self.active_preset = preset_id.into();
        self.manual_kind = None;
        self.manual_duration = None;
    }

    /// Override the kind independently of the preset.
    pub fn set_manual_kind(&mut self, kind: AnimationKind) {
        self.manual_kind = Some(kind);
    }

    /// Override the loop duration independently of the preset.
    pub fn set_manual_duration(&mut self, duration: Duration) -> StoryResult<()> {
        if duration.is_zero() {
            return Err(StoryError::validation("manual duration must be > 0"));
        }
        self.manual_duration = Some(duration);
        Ok(())
    }

    /// Id of the active preset.
    pub fn active_preset_id(&self) -> &str {
        &self.active_preset
    }

    /// Manual kind, if touched.
    pub fn manual_kind(&self) -> Option<AnimationKind> {
        self.manual_kind
    }

    /// Resolve to a spec.
    ///
    /// An unknown preset id resolves to [`AnimationKind::Unknown`] with the default preset's
    /// duration, unless manual values cover both.
    pub fn spec(&self) -> AnimationSpec {
        let base = preset_by_id(&self.active_preset)
            .map(Preset::spec)
            .unwrap_or_else(|| AnimationSpec {
                kind: AnimationKind::Unknown,
                duration: Duration::from_millis(PRESETS[0].duration_ms),
            });
        AnimationSpec {
            kind: self.manual_kind.unwrap_or(base.kind),
            duration: self.manual_duration.unwrap_or(base.duration),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/preset.rs"]
mod tests;
