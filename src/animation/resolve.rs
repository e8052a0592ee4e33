//! Pure mapping from `(kind, progress)` to the background transform and the text reveal.
//!
//! Translation values are expressed in the 1080x1920 reference frame. Everything is applied
//! around the frame center.

use std::f64::consts::{PI, TAU};

use crate::animation::kind::AnimationKind;
use crate::animation::preset::TYPEWRITER_PRESET_ID;
use crate::foundation::core::{Affine, Point, Progress, Vec2};

/// Background camera transform for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Horizontal scale.
    pub scale_x: f64,
    /// Vertical scale.
    pub scale_y: f64,
    /// Horizontal shift in reference pixels, applied in scaled space.
    pub translate_x: f64,
    /// Vertical shift in reference pixels, applied in scaled space.
    pub translate_y: f64,
    /// Clockwise rotation in radians.
    pub rotation_rad: f64,
    /// Opacity of the background layer.
    pub opacity: f64,
}

impl Transform {
    /// No motion, fully opaque.
    pub const IDENTITY: Self = Self {
        scale_x: 1.0,
        scale_y: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
        rotation_rad: 0.0,
        opacity: 1.0,
    };

    fn uniform(scale: f64) -> Self {
        Self {
            scale_x: scale,
            scale_y: scale,
            ..Self::IDENTITY
        }
    }

    /// Affine applied around `center`: scale, then shift, then rotate.
    pub fn to_affine(&self, center: Point) -> Affine {
        let c = center.to_vec2();
        Affine::translate(c)
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
            * Affine::translate(Vec2::new(self.translate_x, self.translate_y))
            * Affine::rotate(self.rotation_rad)
            * Affine::translate(-c)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Background transform for `kind` at `progress`.
///
/// Text kinds resolve as zoom-in; unknown kinds resolve to [`Transform::IDENTITY`].
pub fn resolve(kind: AnimationKind, progress: Progress) -> Transform {
    let p = progress.get();
    match kind.background() {
        AnimationKind::ZoomIn => Transform::uniform(1.0 + 0.15 * p),
        AnimationKind::ZoomOut => Transform::uniform(1.15 - 0.15 * p),
        AnimationKind::PanLeftRight => Transform {
            translate_x: 80.0 - 160.0 * p,
            ..Transform::uniform(1.2)
        },
        AnimationKind::PanRightLeft => Transform {
            translate_x: -80.0 + 160.0 * p,
            ..Transform::uniform(1.2)
        },
        AnimationKind::PanTopBottom => Transform {
            translate_y: 120.0 - 240.0 * p,
            ..Transform::uniform(1.2)
        },
        AnimationKind::ZoomRotate => Transform {
            rotation_rad: (3.0 * p).to_radians(),
            ..Transform::uniform(1.0 + 0.15 * p)
        },
        AnimationKind::Breathe => Transform::uniform(1.0 + 0.05 * (TAU * p).sin()),
        AnimationKind::Fade => Transform {
            opacity: fade_ramp(p),
            ..Transform::uniform(1.0 + 0.08 * p)
        },
        AnimationKind::Parallax => Transform {
            translate_x: 30.0 * (TAU * p).sin(),
            translate_y: 20.0 * (3.0 * PI * p).cos(),
            ..Transform::uniform(1.15)
        },
        AnimationKind::Tilt => Transform {
            rotation_rad: (3.0 * (TAU * p).sin()).to_radians(),
            ..Transform::uniform(1.15)
        },
        AnimationKind::Pop => {
            if p < 0.1 {
                Transform::uniform(1.0 + (p / 0.1) * 0.05)
            } else {
                Transform::uniform(1.05)
            }
        }
        AnimationKind::Typewriter | AnimationKind::FadeUp | AnimationKind::Unknown => {
            Transform::IDENTITY
        }
    }
}

fn fade_ramp(p: f64) -> f64 {
    if p < 0.15 {
        p / 0.15
    } else if p > 0.85 {
        (1.0 - p) / 0.15
    } else {
        1.0
    }
}

/// How the overlay text enters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextMotion {
    /// Characters appear one by one over the first 40% of the loop.
    Typewriter,
    /// The block fades in and slides up over the first 20% of the loop.
    FadeUp,
}

/// Fraction of the loop over which the typewriter completes.
pub const TYPEWRITER_SPAN: f64 = 0.4;
/// Fraction of the loop over which the fade-up completes.
pub const FADE_UP_SPAN: f64 = 0.2;
/// Initial downward offset of the fade-up, in reference pixels.
pub const FADE_UP_OFFSET_PX: f64 = 100.0;

/// Pick the text motion for the current kind and preset.
///
/// An explicit text kind wins, then the typewriter preset, then fade-up.
pub fn text_motion(kind: AnimationKind, preset_id: &str) -> TextMotion {
    match kind {
        AnimationKind::Typewriter => TextMotion::Typewriter,
        AnimationKind::FadeUp => TextMotion::FadeUp,
        _ if preset_id == TYPEWRITER_PRESET_ID => TextMotion::Typewriter,
        _ => TextMotion::FadeUp,
    }
}

/// Text reveal for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RevealState {
    /// Only the first `visible_chars` characters are drawn.
    Typed {
        /// Character budget across all lines.
        visible_chars: usize,
    },
    /// The whole block is drawn with `opacity`, shifted down by `offset_y`.
    Faded {
        /// Block opacity.
        opacity: f64,
        /// Downward offset in reference pixels.
        offset_y: f64,
    },
    /// Text fully shown, no animation.
    Full,
}

/// Reveal state for `motion` at `progress` over a text of `total_chars` characters.
pub fn resolve_reveal(motion: TextMotion, progress: Progress, total_chars: usize) -> RevealState {
    let p = progress.get();
    match motion {
        TextMotion::Typewriter if p < TYPEWRITER_SPAN => {
            let visible = ((p / TYPEWRITER_SPAN) * total_chars as f64).floor() as usize;
            RevealState::Typed {
                visible_chars: visible.min(total_chars),
            }
        }
        TextMotion::FadeUp if p < FADE_UP_SPAN => {
            let t = p / FADE_UP_SPAN;
            RevealState::Faded {
                opacity: t,
                offset_y: FADE_UP_OFFSET_PX * (1.0 - t),
            }
        }
        _ => RevealState::Full,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/resolve.rs"]
mod tests;
