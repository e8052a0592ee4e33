use std::path::Path;
use std::sync::Arc;

use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::{StoryError, StoryResult};

/// Decoded raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Rectangle that covers `canvas` while keeping the aspect ratio, centered.
    pub fn cover_rect(&self, canvas: Canvas) -> Rect {
        cover_fit(self.width, self.height, canvas)
    }
}

/// Source image as loaded: the original bytes plus the decoded pixels.
///
/// The bytes are kept so the still-image download can serve them unchanged.
#[derive(Clone, Debug)]
pub struct SourceImage {
    /// Encoded bytes as read.
    pub bytes: Arc<[u8]>,
    /// Decoded pixels.
    pub prepared: PreparedImage,
}

impl SourceImage {
    /// Decode `bytes`.
    pub fn from_bytes(bytes: Vec<u8>) -> StoryResult<Self> {
        let prepared = decode_image(&bytes)?;
        Ok(Self {
            bytes: Arc::from(bytes),
            prepared,
        })
    }

    /// Read and decode the file at `path`.
    pub fn open(path: &Path) -> StoryResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            StoryError::image_load(format!("read image '{}': {e}", path.display()))
        })?;
        Self::from_bytes(bytes)
    }
}

/// Decode any format `image` understands into premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> StoryResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| StoryError::image_load(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(StoryError::image_load("image has zero size"));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Cover-fit `width x height` onto `canvas`: scale by the larger ratio and center.
pub fn cover_fit(width: u32, height: u32, canvas: Canvas) -> Rect {
    let cw = f64::from(canvas.width);
    let ch = f64::from(canvas.height);
    let iw = f64::from(width.max(1));
    let ih = f64::from(height.max(1));
    let scale = (cw / iw).max(ch / ih);
    let w = iw * scale;
    let h = ih * scale;
    let x = (cw - w) / 2.0;
    let y = (ch - h) / 2.0;
    Rect::new(x, y, x + w, y + h)
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((u16::from(px[0]) * a + 127) / 255) as u8;
        px[1] = ((u16::from(px[1]) * a + 127) / 255) as u8;
        px[2] = ((u16::from(px[2]) * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
