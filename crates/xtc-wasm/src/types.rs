//! WASM-compatible wrapper types for page images.
//!
//! JavaScript hands pages over as RGB buffers (what a canvas or a decoded
//! comic page naturally provides) and gets rendered pages back the same way.

use wasm_bindgen::prelude::*;
use xtc_core::reader::PageView;
use xtc_core::BitmapPage;

/// An RGB page image shared with JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy is made
/// to JavaScript memory as a `Uint8Array`.
#[wasm_bindgen]
pub struct JsPageImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsPageImage {
    /// Create a new JsPageImage from dimensions and pixel data.
    ///
    /// # Arguments
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsPageImage {
        JsPageImage {
            width,
            height,
            pixels,
        }
    }

    /// Get the image width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the image height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the number of bytes in the pixel buffer (width * height * 3 for RGB)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns RGB pixel data as Uint8Array.
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup automatically.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsPageImage {
    /// Whether the buffer holds exactly `width * height` RGB pixels.
    pub(crate) fn is_well_formed(&self) -> bool {
        self.pixels.len() == self.width as usize * self.height as usize * 3
    }

    /// Reduce to a luma page for encoding.
    pub(crate) fn to_bitmap_page(&self) -> BitmapPage {
        BitmapPage::from_rgb(self.width, self.height, &self.pixels)
    }

    /// Expand a decoded container page to RGB.
    pub(crate) fn from_page_view(view: &PageView<'_>) -> Self {
        let pixels = view.pixels().into_iter().flat_map(|v| [v, v, v]).collect();
        Self {
            width: view.width(),
            height: view.height(),
            pixels,
        }
    }
}
