//! Reduction of grayscale pages to packed 1-bit planes.
//!
//! Packing rule: one bit per pixel, 1 = white, 0 = black, most significant
//! bit first, every row padded to a whole byte. Padding bits are zero.

use serde::{Deserialize, Serialize};

use crate::format::{bit_plane_size, row_bytes};
use crate::page::BitmapPage;

/// Luma at or above which a pixel is white.
pub const DEFAULT_THRESHOLD: u8 = 128;

/// How grayscale pixels are reduced to black and white.
///
/// One mode is used for every page of a container so pages look alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MonochromeMode {
    /// Hard cut at `level`: luma >= level is white.
    Threshold { level: u8 },
    /// Floyd-Steinberg error diffusion; a diffused luma strictly above
    /// [`DEFAULT_THRESHOLD`] is white, as in Pillow's `convert("1")`.
    #[default]
    FloydSteinberg,
}

impl MonochromeMode {
    pub fn threshold() -> Self {
        MonochromeMode::Threshold {
            level: DEFAULT_THRESHOLD,
        }
    }
}

/// Reduce a page to a packed bit-plane with the given mode.
pub fn pack_page(page: &BitmapPage, mode: MonochromeMode) -> Vec<u8> {
    let width = page.width as usize;
    let height = page.height as usize;

    match mode {
        MonochromeMode::Threshold { level } => {
            pack_bits(page.width, page.height, |x, y| page.pixels[y * width + x] >= level)
        }
        MonochromeMode::FloydSteinberg => {
            let white = floyd_steinberg(&page.pixels, width, height);
            pack_bits(page.width, page.height, |x, y| white[y * width + x])
        }
    }
}

/// Pack pixels into an MSB-first, row-padded bit-plane.
///
/// `is_white(x, y)` is queried once per pixel in row-major order.
pub fn pack_bits<F>(width: u32, height: u32, mut is_white: F) -> Vec<u8>
where
    F: FnMut(usize, usize) -> bool,
{
    let stride = row_bytes(width);
    let mut out = vec![0u8; bit_plane_size(width, height)];

    for y in 0..height as usize {
        let row = &mut out[y * stride..(y + 1) * stride];
        for x in 0..width as usize {
            if is_white(x, y) {
                row[x / 8] |= 0x80 >> (x % 8);
            }
        }
    }

    out
}

/// Expand a packed bit-plane to one luma byte per pixel (0 or 255).
///
/// Returns `None` when `data` is not exactly `ceil(width / 8) * height` bytes.
pub fn unpack_bits(data: &[u8], width: u32, height: u32) -> Option<Vec<u8>> {
    if data.len() != bit_plane_size(width, height) {
        return None;
    }

    let stride = row_bytes(width);
    let mut pixels = Vec::with_capacity(width as usize * height as usize);

    for row in data.chunks_exact(stride.max(1)).take(height as usize) {
        for x in 0..width as usize {
            let bit = row[x / 8] & (0x80 >> (x % 8));
            pixels.push(if bit != 0 { 255 } else { 0 });
        }
    }

    Some(pixels)
}

/// Floyd-Steinberg dithering, scanning rows left to right.
///
/// A diffused value of exactly 128 goes black.
///
/// Error weights: 7/16 right, 3/16 below-left, 5/16 below, 1/16 below-right.
fn floyd_steinberg(luma: &[u8], width: usize, height: usize) -> Vec<bool> {
    let mut white = vec![false; width * height];

    // Error carried into the current and next row, indexed x + 1 so the
    // below-left neighbour of column 0 has a slot.
    let mut current = vec![0i32; width + 2];
    let mut next = vec![0i32; width + 2];

    for y in 0..height {
        for x in 0..width {
            let value = luma[y * width + x] as i32 + current[x + 1] / 16;
            let value = value.clamp(0, 255);
            let is_white = value > DEFAULT_THRESHOLD as i32;
            white[y * width + x] = is_white;

            let error = value - if is_white { 255 } else { 0 };
            current[x + 2] += error * 7;
            next[x] += error * 3;
            next[x + 1] += error * 5;
            next[x + 2] += error;
        }

        std::mem::swap(&mut current, &mut next);
        next.iter_mut().for_each(|e| *e = 0);
    }

    white
}


// ============================================================================
// Property-Based Tests
// ============================================================================
