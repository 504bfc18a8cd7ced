use crate::foundation::{
    core::RgbaF32Premul,
    error::{RegenError, RegenResult},
};

/// Convert a straight-alpha RGBA8 pixel to premultiplied floats in `0.0..=1.0`.
pub fn premultiply(px: [u8; 4]) -> RgbaF32Premul {
    let a = f32::from(px[3]) / 255.0;
    [
        f32::from(px[0]) / 255.0 * a,
        f32::from(px[1]) / 255.0 * a,
        f32::from(px[2]) / 255.0 * a,
        a,
    ]
}

/// Convert a premultiplied float pixel back to straight-alpha RGBA8.
///
/// Resampling can push a channel above its alpha, so results are clamped.
pub fn unpremultiply(px: RgbaF32Premul) -> [u8; 4] {
    let a = px[3].clamp(0.0, 1.0);
    if a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let mut out = [0u8; 4];
    for i in 0..3 {
        out[i] = to_u8(px[i] / a);
    }
    out[3] = to_u8(a);
    out
}

/// Pull a resampled pixel back into the premultiplied domain: `0 <= c <= a <= 1`.
pub fn clamp_premul(px: &mut RgbaF32Premul) {
    px[3] = px[3].clamp(0.0, 1.0);
    for i in 0..3 {
        px[i] = px[i].clamp(0.0, px[3]);
    }
}

/// Porter-Duff source-over for one premultiplied pixel.
pub fn over(dst: RgbaF32Premul, src: RgbaF32Premul) -> RgbaF32Premul {
    let sa = src[3];
    if sa <= 0.0 {
        return dst;
    }
    if sa >= 1.0 {
        return src;
    }

    let inv = 1.0 - sa;
    let mut out = [0.0f32; 4];
    for i in 0..4 {
        out[i] = (src[i] + dst[i] * inv).min(1.0);
    }
    out
}

/// Composite `src` over `dst`; both are premultiplied RGBA float buffers of the same size.
pub fn over_in_place(dst: &mut [f32], src: &[f32]) -> RegenResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(RegenError::render(
            "over_in_place expects equal-length rgba buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
