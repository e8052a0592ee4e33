//! Drop shadow and coverage-mask compositing for overlay text.
//!
//! Text is rasterized once into an 8-bit coverage mask. The shadow is that mask blurred with a
//! separable Q16 gaussian; both are composited onto the frame as solid premultiplied colors.

use crate::foundation::core::{Rgba8Premul, Vec2};
use crate::foundation::error::{StoryError, StoryResult};
use crate::foundation::math::mul_div255_u8;

/// Canvas-style drop shadow.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropShadow {
    /// Shadow color, premultiplied.
    pub color: Rgba8Premul,
    /// Canvas `shadowBlur` value; the gaussian sigma is half of it.
    pub blur: f32,
    /// Shadow offset in pixels.
    pub offset: Vec2,
}

impl DropShadow {
    /// Shadow used under overlay text: black at 80%, blur 20, 4px down.
    pub fn overlay() -> Self {
        Self {
            color: Rgba8Premul::from_straight_rgba(0, 0, 0, 204),
            blur: 20.0,
            offset: Vec2::new(0.0, 4.0),
        }
    }

    /// Gaussian standard deviation.
    pub fn sigma(&self) -> f32 {
        self.blur / 2.0
    }

    /// Kernel half-width, three sigmas.
    pub fn radius(&self) -> u32 {
        (self.sigma() * 3.0).ceil().max(0.0) as u32
    }
}

/// Reusable blur state: cached kernel plus scratch rows.
#[derive(Debug, Default)]
pub struct ShadowBlur {
    kernel: Vec<u32>,
    kernel_key: Option<(u32, u32)>,
    tmp: Vec<u8>,
}

impl ShadowBlur {
    /// Blur `mask` (`width x height`, one byte per pixel) into `out`.
    pub fn blur_mask(
        &mut self,
        mask: &[u8],
        out: &mut Vec<u8>,
        width: u32,
        height: u32,
        shadow: &DropShadow,
    ) -> StoryResult<()> {
        let expected = (width as usize).saturating_mul(height as usize);
        if mask.len() != expected {
            return Err(StoryError::render("shadow mask size mismatch"));
        }
        let key = (shadow.radius(), shadow.sigma().to_bits());
        if self.kernel_key != Some(key) {
            self.kernel = gaussian_kernel_q16(key.0, shadow.sigma())?;
            self.kernel_key = Some(key);
        }
        out.clear();
        out.resize(expected, 0);
        self.tmp.clear();
        self.tmp.resize(expected, 0);
        if self.kernel.len() == 1 {
            out.copy_from_slice(mask);
            return Ok(());
        }
        horizontal_blur_q16(mask, &mut self.tmp, width, height, &self.kernel);
        vertical_blur_q16(&self.tmp, out, width, height, &self.kernel);
        Ok(())
    }
}

/// Normalized gaussian weights in Q16; they sum to exactly `1 << 16`.
pub(crate) fn gaussian_kernel_q16(radius: u32, sigma: f32) -> StoryResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(StoryError::validation("blur sigma must be finite and > 0"));
    }

    let r = radius as i32;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(StoryError::render("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }
    Ok(weights)
}

fn horizontal_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        let row = (y * w) as usize;
        for x in 0..w {
            let mut acc = 0u64;
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                acc += u64::from(kw) * u64::from(src[row + sx as usize]);
            }
            dst[row + x as usize] = q16_to_u8(acc);
        }
    }
}

fn vertical_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0u64;
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                acc += u64::from(kw) * u64::from(src[(sy * w + x) as usize]);
            }
            dst[(y * w + x) as usize] = q16_to_u8(acc);
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

/// Composite a solid `color` through `mask` onto premultiplied RGBA8 `dst`.
///
/// The mask's top-left lands at `(at_x, at_y)`; parts outside `dst` are clipped.
#[allow(clippy::too_many_arguments)]
pub fn composite_mask_over(
    dst: &mut [u8],
    dst_width: u32,
    dst_height: u32,
    mask: &[u8],
    mask_width: u32,
    mask_height: u32,
    at_x: i32,
    at_y: i32,
    color: Rgba8Premul,
) {
    if color.a == 0 {
        return;
    }
    let dw = dst_width as i32;
    let dh = dst_height as i32;
    for my in 0..mask_height as i32 {
        let y = at_y + my;
        if y < 0 || y >= dh {
            continue;
        }
        for mx in 0..mask_width as i32 {
            let x = at_x + mx;
            if x < 0 || x >= dw {
                continue;
            }
            let cov = u16::from(mask[(my * mask_width as i32 + mx) as usize]);
            if cov == 0 {
                continue;
            }
            let sa = mul_div255_u8(u16::from(color.a), cov);
            if sa == 0 {
                continue;
            }
            let src = [
                mul_div255_u8(u16::from(color.r), cov),
                mul_div255_u8(u16::from(color.g), cov),
                mul_div255_u8(u16::from(color.b), cov),
                sa,
            ];
            let inv = 255u16 - u16::from(sa);
            let idx = ((y * dw + x) as usize) * 4;
            let d = &mut dst[idx..idx + 4];
            for c in 0..4 {
                d[c] = src[c].saturating_add(mul_div255_u8(u16::from(d[c]), inv));
            }
        }
    }
}

/// Extract the alpha channel of premultiplied RGBA8 as a coverage mask.
pub fn alpha_mask(rgba: &[u8], out: &mut Vec<u8>) {
    out.clear();
    out.extend(rgba.chunks_exact(4).map(|px| px[3]));
}

#[cfg(test)]
#[path = "../../tests/unit/render/shadow.rs"]
mod tests;
