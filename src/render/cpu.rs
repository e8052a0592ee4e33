//! CPU frame renderer powered by `vello_cpu`.
//!
//! One frame is: opaque clear, the cover-fitted image under the camera transform, a fixed radial
//! vignette, then the overlay text with its drop shadow.

use std::collections::HashMap;
use std::sync::Arc;

use crate::animation::resolve::{RevealState, Transform};
use crate::assets::color::Color;
use crate::assets::decode::PreparedImage;
use crate::assets::text::{FontBook, FontFace, ShapedLine, TextBrushRgba8, TextLayoutEngine};
use crate::foundation::core::{Affine, Canvas, Rect, Rgba8Premul};
use crate::foundation::error::{StoryError, StoryResult};
use crate::foundation::math::{mul_div255_u8, unit_to_u8};
use crate::layout::anchor::{TextOverlay, resolve_placement};
use crate::layout::wrap::{truncate_lines, wrap_lines};
use crate::render::backend::FrameRGBA;
use crate::render::shadow::{DropShadow, ShadowBlur, alpha_mask, composite_mask_over};

/// Radius where the vignette starts darkening.
pub const VIGNETTE_INNER_RADIUS: f64 = 500.0;
/// Radius where the vignette reaches full strength.
pub const VIGNETTE_OUTER_RADIUS: f64 = 1200.0;
/// Vignette alpha at and beyond the outer radius.
pub const VIGNETTE_MAX_ALPHA: f32 = 0.4;

/// Outline stroke width, relative to font size, that fakes a bold cut.
const EMBOLDEN_STROKE_RATIO: f32 = 0.03;

/// Options for [`FrameRenderer`].
#[derive(Clone, Copy, Debug)]
pub struct RendererOpts {
    /// Output canvas.
    pub canvas: Canvas,
    /// Straight RGBA8 clear color.
    pub clear_rgba: [u8; 4],
    /// Shadow drawn under overlay text.
    pub shadow: DropShadow,
    /// Whether to draw the radial vignette.
    pub vignette: bool,
}

impl Default for RendererOpts {
    fn default() -> Self {
        Self {
            canvas: Canvas::STORY,
            clear_rgba: [0, 0, 0, 255],
            shadow: DropShadow::overlay(),
            vignette: true,
        }
    }
}

#[derive(Clone)]
struct ImagePaint {
    key: (usize, u32, u32),
    paint: vello_cpu::Image,
}

#[derive(Clone, Debug, PartialEq)]
struct WrapKey {
    text: String,
    face: String,
    size_bits: u32,
    width_bits: u32,
}

struct PlacedLine {
    line: ShapedLine,
    left: f64,
    top: f64,
}

/// Renders story frames into premultiplied RGBA8.
pub struct FrameRenderer {
    opts: RendererOpts,
    ctx: Option<vello_cpu::RenderContext>,
    text_ctx: Option<vello_cpu::RenderContext>,
    target: vello_cpu::Pixmap,
    fonts: FontBook,
    text_engine: TextLayoutEngine,
    font_data: HashMap<String, vello_cpu::peniko::FontData>,
    image: Option<ImagePaint>,
    vignette: Option<vello_cpu::Image>,
    wrap_cache: Option<(WrapKey, Arc<Vec<String>>)>,
    blur: ShadowBlur,
    mask: Vec<u8>,
    shadow_mask: Vec<u8>,
}

impl FrameRenderer {
    /// Create a renderer drawing overlay text with faces from `fonts`.
    pub fn new(opts: RendererOpts, fonts: FontBook) -> StoryResult<Self> {
        let (w, h) = dims_u16(opts.canvas.width, opts.canvas.height)?;
        Ok(Self {
            opts,
            ctx: None,
            text_ctx: None,
            target: vello_cpu::Pixmap::new(w, h),
            fonts,
            text_engine: TextLayoutEngine::new(),
            font_data: HashMap::new(),
            image: None,
            vignette: None,
            wrap_cache: None,
            blur: ShadowBlur::default(),
            mask: Vec::new(),
            shadow_mask: Vec::new(),
        })
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        self.opts.canvas
    }

    /// Font book used for overlay text.
    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    /// Replace the font book; cached wraps and font data are dropped.
    pub fn set_fonts(&mut self, fonts: FontBook) {
        self.fonts = fonts;
        self.text_engine = TextLayoutEngine::new();
        self.font_data.clear();
        self.wrap_cache = None;
    }

    /// Render one frame.
    ///
    /// Overlay failures (no font, shaping errors) are logged and the frame is returned without
    /// text. Background failures are returned as errors.
    pub fn render(
        &mut self,
        image: &PreparedImage,
        transform: &Transform,
        overlay: Option<&TextOverlay>,
        reveal: RevealState,
    ) -> StoryResult<FrameRGBA> {
        let canvas = self.opts.canvas;
        let (w, h) = dims_u16(canvas.width, canvas.height)?;
        let cover = image.cover_rect(canvas);
        let paint = self.image_paint(image)?;
        let vignette = if self.opts.vignette {
            Some(self.vignette_paint()?)
        } else {
            None
        };

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();
        ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);

        let [r, g, b, a] = self.opts.clear_rgba;
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        ctx.fill_rect(&rect_to_cpu(canvas.rect()));

        let opacity = transform.opacity.clamp(0.0, 1.0) as f32;
        let layered = opacity < 1.0;
        if layered {
            ctx.push_opacity_layer(opacity);
        }

        let iw = f64::from(image.width);
        let ih = f64::from(image.height);
        let placed = transform.to_affine(canvas.center())
            * Affine::translate((cover.x0, cover.y0))
            * Affine::scale_non_uniform(cover.width() / iw, cover.height() / ih);
        ctx.set_transform(affine_to_cpu(placed));
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));

        if let Some(v) = vignette {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(v);
            ctx.fill_rect(&rect_to_cpu(canvas.rect()));
        }
        if layered {
            ctx.pop_layer();
        }

        ctx.flush();
        ctx.render_to_pixmap(&mut self.target);
        self.ctx = Some(ctx);

        if let Some(overlay) = overlay.filter(|o| !o.text.is_empty()) {
            if let Err(err) = self.draw_overlay(overlay, cover, reveal) {
                tracing::warn!(error = %err, "overlay text skipped");
            }
        }

        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: self.target.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn draw_overlay(
        &mut self,
        overlay: &TextOverlay,
        cover: Rect,
        reveal: RevealState,
    ) -> StoryResult<()> {
        let canvas = self.opts.canvas;
        let placement = resolve_placement(overlay, cover, canvas);
        let face = self
            .fonts
            .resolve(overlay.font_family())
            .cloned()
            .ok_or_else(|| StoryError::render("no font registered for overlay text"))?;
        let size = placement.font_size as f32;
        let lines = self.wrapped_lines(&overlay.text, &face, size, placement.max_width as f32)?;

        let (opacity, offset_y, shown) = match reveal {
            RevealState::Typed { visible_chars } => (1.0, 0.0, truncate_lines(&lines, visible_chars)),
            RevealState::Faded { opacity, offset_y } => (opacity, offset_y, lines.to_vec()),
            RevealState::Full => (1.0, 0.0, lines.to_vec()),
        };
        if opacity <= 0.0 {
            return Ok(());
        }

        let color = Color::parse(overlay.color()).unwrap_or_else(|err| {
            tracing::warn!(color = overlay.color(), error = %err, "invalid overlay color, using white");
            Color::WHITE
        });

        let count = lines.len();
        let mut placed = Vec::with_capacity(count);
        for (i, text) in shown.iter().enumerate() {
            if text.is_empty() {
                continue;
            }
            let line = self.text_engine.shape_line(
                text,
                &face,
                size,
                TextBrushRgba8::from([255, 255, 255, 255]),
            )?;
            let center_y = placement.line_center_y(i, count) + offset_y;
            let left = placement.align.line_left(placement.x, f64::from(line.width));
            let top = line.top_for_middle(center_y);
            placed.push(PlacedLine { line, left, top });
        }
        if placed.is_empty() {
            return Ok(());
        }

        let shadow = self.opts.shadow;
        let pad = f64::from(shadow.radius()) + 1.0;
        let bounds = placed
            .iter()
            .map(|p| {
                Rect::new(
                    p.left,
                    p.top,
                    p.left + f64::from(p.line.width),
                    p.top + f64::from(p.line.baseline + p.line.descent),
                )
            })
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::ZERO)
            .inflate(pad, pad);
        let reach = pad + shadow.offset.x.abs().max(shadow.offset.y.abs());
        let crop = bounds.intersect(canvas.rect().inflate(reach, reach));
        let (cx0, cy0) = (crop.x0.floor(), crop.y0.floor());
        let cw = (crop.x1.ceil() - cx0).max(0.0) as u32;
        let ch = (crop.y1.ceil() - cy0).max(0.0) as u32;
        if cw == 0 || ch == 0 {
            return Ok(());
        }
        let (cw16, ch16) = dims_u16(cw, ch)?;

        let font = self.font_data_for(&face);
        let mut tctx = match self.text_ctx.take() {
            Some(ctx) if ctx.width() == cw16 && ctx.height() == ch16 => ctx,
            _ => vello_cpu::RenderContext::new(cw16, ch16),
        };
        tctx.reset();
        tctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
        for p in &placed {
            tctx.set_transform(affine_to_cpu(Affine::translate((
                p.left - cx0,
                p.top - cy0,
            ))));
            for line in p.line.layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let glyphs: Vec<vello_cpu::Glyph> = run
                        .glyphs()
                        .map(|g| vello_cpu::Glyph {
                            id: g.id,
                            x: g.x,
                            y: g.y,
                        })
                        .collect();
                    let shaped = run.run();
                    tctx.glyph_run(&font)
                        .font_size(shaped.font_size())
                        .normalized_coords(shaped.normalized_coords())
                        .fill_glyphs(glyphs.iter().copied());
                    if shaped.synthesis().embolden() {
                        tctx.set_stroke(vello_cpu::kurbo::Stroke::new(f64::from(
                            shaped.font_size() * EMBOLDEN_STROKE_RATIO,
                        )));
                        tctx.glyph_run(&font)
                            .font_size(shaped.font_size())
                            .normalized_coords(shaped.normalized_coords())
                            .stroke_glyphs(glyphs.iter().copied());
                    }
                }
            }
        }
        tctx.flush();
        let mut coverage = vello_cpu::Pixmap::new(cw16, ch16);
        tctx.render_to_pixmap(&mut coverage);
        self.text_ctx = Some(tctx);
        alpha_mask(coverage.data_as_u8_slice(), &mut self.mask);

        self.blur
            .blur_mask(&self.mask, &mut self.shadow_mask, cw, ch, &shadow)?;

        let (x0, y0) = (cx0 as i32, cy0 as i32);
        let target = self.target.data_as_u8_slice_mut();
        composite_mask_over(
            target,
            canvas.width,
            canvas.height,
            &self.shadow_mask,
            cw,
            ch,
            x0 + shadow.offset.x.round() as i32,
            y0 + shadow.offset.y.round() as i32,
            scale_premul(shadow.color, opacity),
        );
        composite_mask_over(
            target,
            canvas.width,
            canvas.height,
            &self.mask,
            cw,
            ch,
            x0,
            y0,
            color.with_opacity(opacity).to_rgba8_premul(),
        );
        Ok(())
    }

    fn wrapped_lines(
        &mut self,
        text: &str,
        face: &FontFace,
        size: f32,
        max_width: f32,
    ) -> StoryResult<Arc<Vec<String>>> {
        let key = WrapKey {
            text: text.to_owned(),
            face: face.name.clone(),
            size_bits: size.to_bits(),
            width_bits: max_width.to_bits(),
        };
        if let Some((cached, lines)) = &self.wrap_cache {
            if *cached == key {
                return Ok(Arc::clone(lines));
            }
        }

        let engine = &mut self.text_engine;
        let mut failure = None;
        let lines = wrap_lines(
            text,
            |candidate| match engine.measure(candidate, face, size) {
                Ok(w) => w,
                Err(err) => {
                    failure.get_or_insert(err);
                    0.0
                }
            },
            max_width,
        );
        if let Some(err) = failure {
            return Err(err);
        }
        tracing::debug!(lines = lines.len(), face = %face.name, size, "wrapped overlay text");
        let lines = Arc::new(lines);
        self.wrap_cache = Some((key, Arc::clone(&lines)));
        Ok(lines)
    }

    fn font_data_for(&mut self, face: &FontFace) -> vello_cpu::peniko::FontData {
        self.font_data
            .entry(face.name.clone())
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(face.bytes.as_ref().clone()),
                    0,
                )
            })
            .clone()
    }

    fn image_paint(&mut self, image: &PreparedImage) -> StoryResult<vello_cpu::Image> {
        let key = (
            Arc::as_ptr(&image.rgba8_premul) as usize,
            image.width,
            image.height,
        );
        if let Some(cached) = self.image.as_ref().filter(|c| c.key == key) {
            return Ok(cached.paint.clone());
        }
        let paint = rgba_premul_to_image(&image.rgba8_premul, image.width, image.height)?;
        self.image = Some(ImagePaint {
            key,
            paint: paint.clone(),
        });
        Ok(paint)
    }

    fn vignette_paint(&mut self) -> StoryResult<vello_cpu::Image> {
        if let Some(v) = &self.vignette {
            return Ok(v.clone());
        }
        let canvas = self.opts.canvas;
        let bytes = vignette_rgba8_premul(canvas);
        let img = rgba_premul_to_image(&bytes, canvas.width, canvas.height)?;
        self.vignette = Some(img.clone());
        Ok(img)
    }
}

/// Radial vignette around the canvas center, premultiplied black.
pub(crate) fn vignette_rgba8_premul(canvas: Canvas) -> Vec<u8> {
    let (w, h) = (canvas.width as usize, canvas.height as usize);
    let c = canvas.center();
    let span = VIGNETTE_OUTER_RADIUS - VIGNETTE_INNER_RADIUS;
    let mut bytes = vec![0u8; w.saturating_mul(h).saturating_mul(4)];
    for (i, px) in bytes.chunks_exact_mut(4).enumerate() {
        let x = (i % w) as f64 + 0.5;
        let y = (i / w) as f64 + 0.5;
        let d = (x - c.x).hypot(y - c.y);
        let t = ((d - VIGNETTE_INNER_RADIUS) / span).clamp(0.0, 1.0) as f32;
        px[3] = unit_to_u8(VIGNETTE_MAX_ALPHA * t);
    }
    bytes
}

fn scale_premul(c: Rgba8Premul, opacity: f64) -> Rgba8Premul {
    let op = u16::from(unit_to_u8(opacity as f32));
    Rgba8Premul {
        r: mul_div255_u8(u16::from(c.r), op),
        g: mul_div255_u8(u16::from(c.g), op),
        b: mul_div255_u8(u16::from(c.b), op),
        a: mul_div255_u8(u16::from(c.a), op),
    }
}

fn dims_u16(width: u32, height: u32) -> StoryResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| StoryError::render("surface width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StoryError::render("surface height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(StoryError::render("surface has zero size"));
    }
    Ok((w, h))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> StoryResult<vello_cpu::Pixmap> {
    let (w, h) = dims_u16(width, height)?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(StoryError::render("pixmap byte len mismatch"));
    }
    let pixels: Vec<vello_cpu::peniko::color::PremulRgba8> = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

fn rgba_premul_to_image(
    bytes_premul: &[u8],
    width: u32,
    height: u32,
) -> StoryResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
