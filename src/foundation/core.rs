use std::time::Duration;

use crate::foundation::error::{StoryError, StoryResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Logical story canvas width in pixels (vertical video).
pub const STORY_WIDTH: u32 = 1080;
/// Logical story canvas height in pixels (vertical video).
pub const STORY_HEIGHT: u32 = 1920;

/// Zero-based frame number within a captured or previewed stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameIndex(pub u64);

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// The fixed 1080x1920 story canvas.
    pub const STORY: Self = Self {
        width: STORY_WIDTH,
        height: STORY_HEIGHT,
    };

    /// Geometric center of the canvas.
    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    /// Full canvas rectangle.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> StoryResult<Self> {
        if den == 0 {
            return Err(StoryError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(StoryError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Duration of one frame.
    pub fn frame_interval(self) -> Duration {
        Duration::from_nanos(u64::from(self.den) * 1_000_000_000 / u64::from(self.num))
    }

    /// Number of whole-or-partial frames needed to cover `span`.
    pub fn frames_to_cover(self, span: Duration) -> u64 {
        let num = span.as_nanos() * u128::from(self.num);
        let den = 1_000_000_000u128 * u128::from(self.den);
        num.div_ceil(den) as u64
    }
}

/// Periodic fraction of elapsed time through one animation loop, in `[0, 1)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Progress(f64);

impl Progress {
    /// Loop start.
    pub const ZERO: Self = Self(0.0);

    /// Build progress from an explicit fraction.
    ///
    /// Values are wrapped into `[0, 1)`, so `1.0` maps back onto the loop boundary.
    pub fn new(fraction: f64) -> Self {
        if !fraction.is_finite() {
            return Self::ZERO;
        }
        let wrapped = fraction.rem_euclid(1.0);
        Self(if wrapped >= 1.0 { 0.0 } else { wrapped })
    }

    /// `(elapsed mod duration) / duration`, computed on integer nanoseconds so the seam is exact.
    pub fn from_elapsed(elapsed: Duration, duration: Duration) -> Self {
        let dur = duration.as_nanos();
        if dur == 0 {
            return Self::ZERO;
        }
        let rem = elapsed.as_nanos() % dur;
        Self(rem as f64 / dur as f64)
    }

    /// Raw fraction.
    pub fn get(self) -> f64 {
        self.0
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Channels as a `[r, g, b, a]` array.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
