//! Premultiplied RGBA8 buffer operations used by the CPU compositor.

use crate::foundation::core::Rgba8;
use crate::foundation::error::{CoverError, CoverResult};
use crate::foundation::math::mul_div255_u8;

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = mul_div255_u8(u16::from(px[0]), a);
        px[1] = mul_div255_u8(u16::from(px[1]), a);
        px[2] = mul_div255_u8(u16::from(px[2]), a);
    }
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in 0..3 {
            px[c] = ((u32::from(px[c]) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

pub(crate) fn clear_rgba8(buf: &mut [u8], rgba_premul: [u8; 4]) {
    for px in buf.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba_premul);
    }
}

/// Replace every pixel's color with `color`, keeping its coverage.
pub(crate) fn tint_rgba8_premul_in_place(buf: &mut [u8], color: Rgba8) {
    for px in buf.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        px[0] = mul_div255_u8(u16::from(color.r), a);
        px[1] = mul_div255_u8(u16::from(color.g), a);
        px[2] = mul_div255_u8(u16::from(color.b), a);
    }
}

pub(crate) fn opacity_rgba8_premul_in_place(buf: &mut [u8], opacity: f32) {
    let op = ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16;
    if op == 255 {
        return;
    }
    for v in buf.iter_mut() {
        *v = mul_div255_u8(u16::from(*v), op);
    }
}

/// Multiply `src` by the alpha of `mask` into `dst`.
pub(crate) fn mask_apply_alpha_rgba8_premul(src: &[u8], mask: &[u8], dst: &mut [u8]) {
    debug_assert_eq!(src.len(), mask.len());
    debug_assert_eq!(src.len(), dst.len());

    for ((s, m), d) in src
        .chunks_exact(4)
        .zip(mask.chunks_exact(4))
        .zip(dst.chunks_exact_mut(4))
    {
        let w16 = u16::from(m[3]);
        d[0] = mul_div255_u8(u16::from(s[0]), w16);
        d[1] = mul_div255_u8(u16::from(s[1]), w16);
        d[2] = mul_div255_u8(u16::from(s[2]), w16);
        d[3] = mul_div255_u8(u16::from(s[3]), w16);
    }
}

pub(crate) fn premul_over_in_place(dst: &mut [u8], src: &[u8]) -> CoverResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(CoverError::render(
            "premul_over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        over_px(d, s);
    }
    Ok(())
}

/// Composite a `src_w`x`src_h` layer over `dst` with its top-left at `(x, y)`. Parts of the
/// layer outside `dst` are dropped.
#[allow(clippy::too_many_arguments)]
pub(crate) fn premul_over_at(
    dst: &mut [u8],
    dst_w: u32,
    dst_h: u32,
    src: &[u8],
    src_w: u32,
    src_h: u32,
    x: u32,
    y: u32,
) -> CoverResult<()> {
    if src.len() != (src_w as usize) * (src_h as usize) * 4
        || dst.len() != (dst_w as usize) * (dst_h as usize) * 4
    {
        return Err(CoverError::render("premul_over_at buffer size mismatch"));
    }
    let cols = src_w.min(dst_w.saturating_sub(x)) as usize;
    let rows = src_h.min(dst_h.saturating_sub(y));
    for row in 0..rows {
        let s0 = (row as usize) * (src_w as usize) * 4;
        let d0 = (((y + row) as usize) * (dst_w as usize) + x as usize) * 4;
        let s_row = &src[s0..s0 + cols * 4];
        let d_row = &mut dst[d0..d0 + cols * 4];
        for (d, s) in d_row.chunks_exact_mut(4).zip(s_row.chunks_exact(4)) {
            over_px(d, s);
        }
    }
    Ok(())
}

fn over_px(d: &mut [u8], s: &[u8]) {
    let sa = u16::from(s[3]);
    if sa == 0 {
        return;
    }
    let inv = 255u16 - sa;
    d[3] = s[3].saturating_add(mul_div255_u8(u16::from(d[3]), inv));
    for c in 0..3 {
        let dc = mul_div255_u8(u16::from(d[c]), inv);
        d[c] = s[c].saturating_add(dc);
    }
}

/// Blur radius and sigma for a CSS-style shadow blur length.
pub(crate) fn blur_params(blur_px: f64) -> (u32, f32) {
    if !blur_px.is_finite() || blur_px <= 0.0 {
        return (0, 1.0);
    }
    let sigma = (blur_px / 2.0).max(0.5);
    ((sigma * 3.0).ceil() as u32, sigma as f32)
}

pub(crate) fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> CoverResult<Vec<u8>> {
    if src.len() != (width as usize) * (height as usize) * 4 {
        return Err(CoverError::render("blur buffer size mismatch"));
    }
    let kernel = gaussian_kernel_q16(radius, sigma)?;
    if kernel.len() == 1 {
        return Ok(src.to_vec());
    }
    let mut tmp = vec![0u8; src.len()];
    let mut dst = vec![0u8; src.len()];
    horizontal_blur_q16(src, &mut tmp, width, height, &kernel);
    vertical_blur_q16(&tmp, &mut dst, width, height, &kernel);
    Ok(dst)
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> CoverResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(CoverError::validation("blur sigma must be finite and > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = f64::from(i);
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
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
        let new_mid = (i64::from(weights[mid]) + delta).clamp(0, 65536);
        weights[mid] = new_mid as u32;
    }

    Ok(weights)
}

fn horizontal_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    v.min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/compose/pixel.rs"]
mod tests;
