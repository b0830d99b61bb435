//! RGB to luma conversion using ITU-R 601-2 weights.
//!
//! Pages arrive from the rendering pipeline as RGB or grayscale. RGB input
//! is reduced to 8-bit luma before monochrome conversion, with the same
//! fixed-point weights common document rasterizers use for their "L" mode,
//! so that a page converted here matches a page the rasterizer emitted as
//! grayscale.

/// ITU-R 601-2 red weight, scaled by 2^16.
pub const LUMA_R: u32 = 19595;

/// ITU-R 601-2 green weight, scaled by 2^16.
pub const LUMA_G: u32 = 38470;

/// ITU-R 601-2 blue weight, scaled by 2^16.
pub const LUMA_B: u32 = 7471;

/// Luma of one RGB pixel (0-255), rounded to nearest.
#[inline]
pub fn luma_u8(r: u8, g: u8, b: u8) -> u8 {
    let weighted = LUMA_R * r as u32 + LUMA_G * g as u32 + LUMA_B * b as u32;
    ((weighted + 0x8000) >> 16) as u8
}

/// Convert packed RGB pixels (3 bytes each) to one luma byte per pixel.
///
/// A trailing partial pixel is ignored.
pub fn rgb_to_luma(rgb: &[u8]) -> Vec<u8> {
    rgb.chunks_exact(3)
        .map(|px| luma_u8(px[0], px[1], px[2]))
        .collect()
}
