//! Font registry and `parley` shaping for overlay lines.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use crate::foundation::error::{StoryError, StoryResult};

/// RGBA8 brush color carried through `parley` layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl From<[u8; 4]> for TextBrushRgba8 {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// Weight requested for overlay text; faces without a bold cut are emboldened by the shaper.
pub const OVERLAY_FONT_WEIGHT: parley::style::FontWeight = parley::style::FontWeight::BOLD;

/// One font file registered under a family name.
#[derive(Clone, Debug)]
pub struct FontFace {
    /// Name overlays refer to.
    pub name: String,
    /// Raw font file bytes.
    pub bytes: Arc<Vec<u8>>,
}

/// Named fonts available to the renderer, with an optional default.
#[derive(Clone, Debug, Default)]
pub struct FontBook {
    faces: BTreeMap<String, FontFace>,
    default_family: Option<String>,
}

impl FontBook {
    /// Empty book; text is skipped until a face is added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` under `name`. The first face added becomes the default.
    pub fn insert(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        let name = name.into();
        if self.default_family.is_none() {
            self.default_family = Some(name.clone());
        }
        self.faces.insert(
            name.clone(),
            FontFace {
                name,
                bytes: Arc::new(bytes),
            },
        );
    }

    /// Read a font file and register it under `name`.
    pub fn load(&mut self, name: impl Into<String>, path: &Path) -> StoryResult<()> {
        let bytes = std::fs::read(path)
            .map_err(|e| StoryError::validation(format!("read font '{}': {e}", path.display())))?;
        self.insert(name, bytes);
        Ok(())
    }

    /// Make `name` the fallback face.
    pub fn set_default(&mut self, name: &str) -> StoryResult<()> {
        if !self.faces.contains_key(name) {
            return Err(StoryError::validation(format!(
                "default font '{name}' is not registered"
            )));
        }
        self.default_family = Some(name.to_owned());
        Ok(())
    }

    /// Face for `requested`, falling back to the default face.
    pub fn resolve(&self, requested: Option<&str>) -> Option<&FontFace> {
        requested
            .and_then(|name| self.faces.get(name))
            .or_else(|| {
                self.default_family
                    .as_deref()
                    .and_then(|name| self.faces.get(name))
            })
    }

    /// Whether no face is registered.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Registered family names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.faces.keys().map(String::as_str)
    }
}

/// A single shaped line, positioned relative to its own top-left.
pub struct ShapedLine {
    /// Parley layout holding the glyph runs.
    pub layout: parley::Layout<TextBrushRgba8>,
    /// Advance width including trailing whitespace.
    pub width: f32,
    /// Baseline offset from the layout top.
    pub baseline: f32,
    /// Font ascent.
    pub ascent: f32,
    /// Font descent (positive).
    pub descent: f32,
}

impl ShapedLine {
    /// Vertical layout origin that puts the middle of the em box at `center_y`.
    pub fn top_for_middle(&self, center_y: f64) -> f64 {
        center_y + f64::from(self.ascent - self.descent) / 2.0 - f64::from(self.baseline)
    }
}

/// Stateful helper for building Parley layouts from registered font faces.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    families: HashMap<String, String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct a new layout engine with fresh Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
        }
    }

    fn family_for(&mut self, face: &FontFace) -> StoryResult<String> {
        if let Some(name) = self.families.get(&face.name) {
            return Ok(name.clone());
        }
        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(face.bytes.as_ref().clone()),
            None,
        );
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            StoryError::render(format!("font '{}' contains no usable family", face.name))
        })?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| StoryError::render("registered font family has no name"))?
            .to_string();
        tracing::debug!(face = %face.name, family = %family_name, "registered font");
        self.families
            .insert(face.name.clone(), family_name.clone());
        Ok(family_name)
    }

    /// Shape `text` on one line, without wrapping.
    pub fn shape_line(
        &mut self,
        text: &str,
        face: &FontFace,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> StoryResult<ShapedLine> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(StoryError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let family_name = self.family_for(face)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(OVERLAY_FONT_WEIGHT));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);

        let (baseline, ascent, descent) = layout
            .lines()
            .next()
            .map(|line| {
                let m = line.metrics();
                (m.baseline, m.ascent, m.descent)
            })
            .unwrap_or((size_px * 0.8, size_px * 0.8, size_px * 0.2));

        Ok(ShapedLine {
            width: layout.full_width(),
            layout,
            baseline,
            ascent,
            descent,
        })
    }

    /// Advance width of `text` including trailing whitespace.
    pub fn measure(&mut self, text: &str, face: &FontFace, size_px: f32) -> StoryResult<f32> {
        Ok(self
            .shape_line(text, face, size_px, TextBrushRgba8::default())?
            .width)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/text.rs"]
mod tests;
