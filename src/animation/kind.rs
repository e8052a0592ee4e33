use std::fmt;

/// Every animation the story viewer can play.
///
/// Camera kinds drive the background transform. Text kinds drive the overlay reveal and fall
/// back to a zoom-in for the background. Parsing never fails: anything unrecognised becomes
/// [`AnimationKind::Unknown`], which resolves to the identity transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnimationKind {
    /// Slow push in.
    ZoomIn,
    /// Slow pull out.
    ZoomOut,
    /// Horizontal pan, left to right.
    PanLeftRight,
    /// Horizontal pan, right to left.
    PanRightLeft,
    /// Vertical pan, top to bottom.
    PanTopBottom,
    /// Push in with a slight rotation.
    ZoomRotate,
    /// Sinusoidal scale pulse.
    Breathe,
    /// Fade in and out with a slight push.
    Fade,
    /// Lissajous drift.
    Parallax,
    /// Sinusoidal rotation.
    Tilt,
    /// Quick pop then hold.
    Pop,
    /// Text typed out character by character.
    Typewriter,
    /// Text fades in while sliding up.
    FadeUp,
    /// Unrecognised kind; renders without motion.
    Unknown,
}

impl AnimationKind {
    /// All known kinds, camera kinds first.
    pub const ALL: [Self; 13] = [
        Self::ZoomIn,
        Self::ZoomOut,
        Self::PanLeftRight,
        Self::PanRightLeft,
        Self::PanTopBottom,
        Self::ZoomRotate,
        Self::Breathe,
        Self::Fade,
        Self::Parallax,
        Self::Tilt,
        Self::Pop,
        Self::Typewriter,
        Self::FadeUp,
    ];

    /// Parse a kind name. Accepts kebab-case, snake_case and a `text_`/`text-` prefix.
    pub fn parse(name: &str) -> Self {
        let norm = name.trim().to_ascii_lowercase().replace('_', "-");
        let norm = norm.strip_prefix("text-").unwrap_or(&norm);
        match norm {
            "zoom-in" => Self::ZoomIn,
            "zoom-out" => Self::ZoomOut,
            "pan-left-right" => Self::PanLeftRight,
            "pan-right-left" => Self::PanRightLeft,
            "pan-top-bottom" => Self::PanTopBottom,
            "zoom-rotate" => Self::ZoomRotate,
            "breathe" => Self::Breathe,
            "fade" => Self::Fade,
            "parallax" => Self::Parallax,
            "tilt" => Self::Tilt,
            "pop" => Self::Pop,
            "typewriter" => Self::Typewriter,
            "fade-up" => Self::FadeUp,
            _ => Self::Unknown,
        }
    }

    /// Canonical kebab-case name.
    pub fn name(self) -> &'static str {
        match self {
            Self::ZoomIn => "zoom-in",
            Self::ZoomOut => "zoom-out",
            Self::PanLeftRight => "pan-left-right",
            Self::PanRightLeft => "pan-right-left",
            Self::PanTopBottom => "pan-top-bottom",
            Self::ZoomRotate => "zoom-rotate",
            Self::Breathe => "breathe",
            Self::Fade => "fade",
            Self::Parallax => "parallax",
            Self::Tilt => "tilt",
            Self::Pop => "pop",
            Self::Typewriter => "typewriter",
            Self::FadeUp => "fade-up",
            Self::Unknown => "unknown",
        }
    }

    /// Return `true` for kinds that animate the text overlay rather than the camera.
    pub fn is_text_motion(self) -> bool {
        matches!(self, Self::Typewriter | Self::FadeUp)
    }

    /// Kind used for the background transform.
    ///
    /// Text kinds keep the image moving with a zoom-in.
    pub fn background(self) -> Self {
        if self.is_text_motion() {
            Self::ZoomIn
        } else {
            self
        }
    }
}

impl From<String> for AnimationKind {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<AnimationKind> for String {
    fn from(value: AnimationKind) -> Self {
        value.name().to_owned()
    }
}

impl fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/kind.rs"]
mod tests;
