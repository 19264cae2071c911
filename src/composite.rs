use image::{Rgb, RgbImage, RgbaImage};

use crate::error::{QuotecardError, QuotecardResult};

pub type Rgba8 = [u8; 4];

/// Straight-alpha source-over for a single pixel.
pub fn over(dst: Rgba8, src: Rgba8) -> Rgba8 {
    let sa = u32::from(src[3]);
    if sa == 255 {
        return src;
    }
    if sa == 0 {
        return dst;
    }

    let da = u32::from(dst[3]);
    let inv = 255 - sa;
    let out_a = sa + mul_div255(da, inv);
    if out_a == 0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        let num = u32::from(src[i]) * sa + u32::from(dst[i]) * mul_div255(da, inv);
        out[i] = ((num + out_a / 2) / out_a).min(255) as u8;
    }
    out[3] = out_a as u8;
    out
}

/// Alpha-composites `src` over `dst` in place. Both images must share the
/// same dimensions; layers in a card are always full-canvas.
pub fn composite_over(dst: &mut RgbaImage, src: &RgbaImage) -> QuotecardResult<()> {
    if dst.dimensions() != src.dimensions() {
        return Err(QuotecardError::render(
            "composite_over expects equal-size layers",
        ));
    }
    for (d, s) in dst
        .chunks_exact_mut(4)
        .zip(src.as_raw().chunks_exact(4))
    {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Alpha-blends one pixel into `dst`, ignoring out-of-bounds coordinates.
pub fn blend_pixel(dst: &mut RgbaImage, x: i64, y: i64, src: Rgba8) {
    if x < 0 || y < 0 || x >= i64::from(dst.width()) || y >= i64::from(dst.height()) {
        return;
    }
    let px = dst.get_pixel_mut(x as u32, y as u32);
    px.0 = over(px.0, src);
}

/// Alpha-blends `src` over `dst` with its top-left corner at (x, y), clipping
/// anything that falls outside the destination.
pub fn blend_at(dst: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64) {
    for (sy, row) in src.rows().enumerate() {
        for (sx, px) in row.enumerate() {
            blend_pixel(dst, x + sx as i64, y + sy as i64, px.0);
        }
    }
}

/// Overwrites the alpha channel of every pixel.
pub fn set_uniform_alpha(img: &mut RgbaImage, alpha: u8) {
    for px in img.chunks_exact_mut(4) {
        px[3] = alpha;
    }
}

/// Flattens a straight-alpha image onto an opaque black base.
pub fn flatten_over_black(img: &RgbaImage) -> RgbImage {
    let mut out = RgbImage::new(img.width(), img.height());
    for (d, s) in out
        .chunks_exact_mut(3)
        .zip(img.as_raw().chunks_exact(4))
    {
        let a = u32::from(s[3]);
        d[0] = mul_div255(u32::from(s[0]), a) as u8;
        d[1] = mul_div255(u32::from(s[1]), a) as u8;
        d[2] = mul_div255(u32::from(s[2]), a) as u8;
    }
    out
}

/// Copies `src` into `dst` at (x, y) without blending, clipping at the edges.
pub fn paste_opaque(dst: &mut RgbImage, src: &RgbImage, x: u32, y: u32) {
    for sy in 0..src.height() {
        let dy = y + sy;
        if dy >= dst.height() {
            break;
        }
        for sx in 0..src.width() {
            let dx = x + sx;
            if dx >= dst.width() {
                break;
            }
            let Rgb(px) = *src.get_pixel(sx, sy);
            dst.put_pixel(dx, dy, Rgb(px));
        }
    }
}

fn mul_div255(x: u32, y: u32) -> u32 {
    (x * y + 127) / 255
}
