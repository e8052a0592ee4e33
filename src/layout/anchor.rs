//! Overlay placement: where the text block sits and how wide it may grow.

use crate::foundation::core::{Canvas, Rect};

/// Margin between a side anchor and the canvas edge.
pub const ANCHOR_MARGIN: f64 = 100.0;
/// Wrap width when no bounding box is given.
pub const DEFAULT_MAX_WIDTH: f64 = 900.0;
/// Vertical center of the default lower-third placement.
pub const DEFAULT_LOWER_THIRD_Y: f64 = 1400.0;
/// Base font size for free placement and wide boxes.
pub const BASE_FONT_SIZE: f64 = 64.0;
/// Line advance as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.4;
/// Overlay color when the style does not set one.
pub const DEFAULT_TEXT_COLOR: &str = "#ffffff";

/// One of nine overlay anchors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    /// Top row, left column.
    TopLeft,
    /// Top row, centered.
    TopCenter,
    /// Top row, right column.
    TopRight,
    /// Middle row, left column.
    MiddleLeft,
    /// Canvas center.
    Center,
    /// Middle row, right column.
    MiddleRight,
    /// Bottom row, left column.
    BottomLeft,
    /// Bottom row, centered.
    BottomCenter,
    /// Bottom row, right column.
    BottomRight,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Row {
    Top,
    Middle,
    Bottom,
}

impl Anchor {
    fn split(self) -> (Row, TextAlign) {
        match self {
            Self::TopLeft => (Row::Top, TextAlign::Left),
            Self::TopCenter => (Row::Top, TextAlign::Center),
            Self::TopRight => (Row::Top, TextAlign::Right),
            Self::MiddleLeft => (Row::Middle, TextAlign::Left),
            Self::Center => (Row::Middle, TextAlign::Center),
            Self::MiddleRight => (Row::Middle, TextAlign::Right),
            Self::BottomLeft => (Row::Bottom, TextAlign::Left),
            Self::BottomCenter => (Row::Bottom, TextAlign::Center),
            Self::BottomRight => (Row::Bottom, TextAlign::Right),
        }
    }
}

/// Normalized box in `[ymin, xmin, ymax, xmax]` order, each in `0..=1000`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    /// Top edge.
    pub ymin: f64,
    /// Left edge.
    pub xmin: f64,
    /// Bottom edge.
    pub ymax: f64,
    /// Right edge.
    pub xmax: f64,
}

impl From<[f64; 4]> for BoundingBox {
    fn from([ymin, xmin, ymax, xmax]: [f64; 4]) -> Self {
        Self {
            ymin,
            xmin,
            ymax,
            xmax,
        }
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.ymin, b.xmin, b.ymax, b.xmax]
    }
}

fn lenient_bounding_box<'de, D>(de: D) -> Result<Option<BoundingBox>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = <serde_json::Value as serde::Deserialize>::deserialize(de)?;
    if raw.is_null() {
        return Ok(None);
    }
    let coords: Vec<f64> = raw
        .as_array()
        .map(|items| items.iter().map_while(serde_json::Value::as_f64).collect())
        .unwrap_or_default();
    match (raw.as_array().map(Vec::len), coords.as_slice()) {
        (Some(4), &[ymin, xmin, ymax, xmax]) => Ok(Some(BoundingBox::from([ymin, xmin, ymax, xmax]))),
        _ => {
            tracing::warn!(bounding_box = %raw, "malformed bounding box ignored, using anchor placement");
            Ok(None)
        }
    }
}

impl BoundingBox {
    /// Map the normalized box onto the on-canvas rectangle of the drawn image.
    pub fn to_canvas(self, image_rect: Rect) -> Rect {
        let w = image_rect.width();
        let h = image_rect.height();
        Rect::new(
            image_rect.x0 + self.xmin / 1000.0 * w,
            image_rect.y0 + self.ymin / 1000.0 * h,
            image_rect.x0 + self.xmax / 1000.0 * w,
            image_rect.y0 + self.ymax / 1000.0 * h,
        )
    }
}

/// Optional styling of the overlay.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    /// Font family name, looked up in the font book.
    #[serde(default, alias = "font_family")]
    pub font_family: Option<String>,
    /// CSS-style hex color.
    #[serde(default)]
    pub color: Option<String>,
    /// Multiplier on the base font size.
    #[serde(default, alias = "font_size_ratio")]
    pub font_size_ratio: Option<f64>,
    /// Anchor used when no bounding box is present.
    #[serde(default)]
    pub position: Option<Anchor>,
}

/// Text drawn over the animated background.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOverlay {
    /// Text content; empty text draws nothing.
    pub text: String,
    /// Detected text region; wins over `style.position`.
    ///
    /// Anything other than four numbers is ignored and the anchor decides placement.
    #[serde(
        default,
        alias = "bounding_box",
        deserialize_with = "lenient_bounding_box",
        skip_serializing_if = "Option::is_none"
    )]
    pub bounding_box: Option<BoundingBox>,
    /// Style overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<TextStyle>,
}

impl TextOverlay {
    /// Plain overlay with default placement.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Font size multiplier; zero, negative or missing ratios count as 1.
    pub fn font_size_ratio(&self) -> f64 {
        match self.style.as_ref().and_then(|s| s.font_size_ratio) {
            Some(r) if r.is_finite() && r > 0.0 => r,
            _ => 1.0,
        }
    }

    /// Requested color, or white.
    pub fn color(&self) -> &str {
        self.style
            .as_ref()
            .and_then(|s| s.color.as_deref())
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_TEXT_COLOR)
    }

    /// Requested font family, if any.
    pub fn font_family(&self) -> Option<&str> {
        self.style
            .as_ref()
            .and_then(|s| s.font_family.as_deref())
            .filter(|f| !f.is_empty())
    }
}

/// Horizontal alignment of each line against the anchor x.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    /// Line starts at the anchor.
    Left,
    /// Line is centered on the anchor.
    Center,
    /// Line ends at the anchor.
    Right,
}

impl TextAlign {
    /// Left edge of a line of `width` aligned on `anchor_x`.
    pub fn line_left(self, anchor_x: f64, width: f64) -> f64 {
        match self {
            Self::Left => anchor_x,
            Self::Center => anchor_x - width / 2.0,
            Self::Right => anchor_x - width,
        }
    }
}

/// Resolved overlay position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextPlacement {
    /// Anchor x.
    pub x: f64,
    /// Vertical center of the text block.
    pub y: f64,
    /// Wrap width.
    pub max_width: f64,
    /// Font size after the style ratio.
    pub font_size: f64,
    /// Line alignment.
    pub align: TextAlign,
}

impl TextPlacement {
    /// Distance between consecutive line centers.
    pub fn line_height(&self) -> f64 {
        self.font_size * LINE_HEIGHT_FACTOR
    }

    /// Vertical center of line `index` in a block of `count` lines.
    pub fn line_center_y(&self, index: usize, count: usize) -> f64 {
        let lh = self.line_height();
        let total = count as f64 * lh;
        self.y - total / 2.0 + lh / 2.0 + index as f64 * lh
    }
}

/// Base font size for a bounding box of width `box_width`.
pub fn font_size_for_box(box_width: f64) -> f64 {
    if box_width < 400.0 {
        32.0
    } else if box_width < 600.0 {
        48.0
    } else {
        BASE_FONT_SIZE
    }
}

/// Resolve where `overlay` goes on `canvas` when the image is drawn into `image_rect`.
pub fn resolve_placement(overlay: &TextOverlay, image_rect: Rect, canvas: Canvas) -> TextPlacement {
    let ratio = overlay.font_size_ratio();
    let cx = canvas.center().x;

    if let Some(bbox) = overlay.bounding_box {
        let r = bbox.to_canvas(image_rect);
        let center = r.center();
        return TextPlacement {
            x: center.x,
            y: center.y,
            max_width: r.width().max(0.0),
            font_size: font_size_for_box(r.width()) * ratio,
            align: TextAlign::Center,
        };
    }

    let (x, y, align) = match overlay.style.as_ref().and_then(|s| s.position) {
        Some(anchor) => {
            let (row, align) = anchor.split();
            let w = f64::from(canvas.width);
            let h = f64::from(canvas.height);
            let x = match align {
                TextAlign::Left => ANCHOR_MARGIN,
                TextAlign::Center => cx,
                TextAlign::Right => w - ANCHOR_MARGIN,
            };
            let y = match row {
                Row::Top => ANCHOR_MARGIN * 2.0,
                Row::Middle => canvas.center().y,
                Row::Bottom => h - ANCHOR_MARGIN * 2.0,
            };
            (x, y, align)
        }
        None => (cx, DEFAULT_LOWER_THIRD_Y, TextAlign::Center),
    };

    TextPlacement {
        x,
        y,
        max_width: DEFAULT_MAX_WIDTH,
        font_size: BASE_FONT_SIZE * ratio,
        align,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/anchor.rs"]
mod tests;
