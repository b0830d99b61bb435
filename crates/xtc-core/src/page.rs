//! Page inputs accepted by the container assembler.

use image::{DynamicImage, GrayImage};

use crate::format::bit_plane_size;
use crate::luminance::rgb_to_luma;

/// A decoded page with 8-bit luma pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitmapPage {
    /// Page width in pixels.
    pub width: u32,
    /// Page height in pixels.
    pub height: u32,
    /// Luma pixel data in row-major order (1 byte per pixel, 0 = black).
    /// Length should be width * height.
    pub pixels: Vec<u8>,
}

impl BitmapPage {
    /// Create a new BitmapPage from luma pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a page from RGB pixel data (3 bytes per pixel).
    pub fn from_rgb(width: u32, height: u32, rgb: &[u8]) -> Self {
        Self::new(width, height, rgb_to_luma(rgb))
    }

    /// A page filled with a single luma value.
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self::new(width, height, vec![value; width as usize * height as usize])
    }

    pub fn from_gray_image(img: GrayImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// Create a page from any decoded image.
    ///
    /// Color images go through RGB so the luma weights match
    /// [`crate::luminance`], not the `image` crate's own conversion.
    pub fn from_dynamic_image(img: DynamicImage) -> Self {
        match img {
            DynamicImage::ImageLuma8(gray) => Self::from_gray_image(gray),
            other => {
                let rgb = other.into_rgb8();
                let (width, height) = rgb.dimensions();
                Self::from_rgb(width, height, rgb.as_raw())
            }
        }
    }

    /// Convert to an image::GrayImage for resampling.
    pub fn to_gray_image(&self) -> Option<GrayImage> {
        GrayImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Check if this is an empty/invalid page.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}

/// A page already reduced to a packed 1-bit plane by the caller.
///
/// Bits are MSB-first, 1 = white, rows padded to a byte boundary. The
/// length is checked when the page is encoded, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedPage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl PackedPage {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// A page with every pixel white.
    pub fn blank(width: u32, height: u32) -> Self {
        Self::new(width, height, vec![0xFF; bit_plane_size(width, height)])
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// One page handed to the assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    /// Grayscale pixels, reduced to 1 bit by the container's monochrome mode.
    Bitmap(BitmapPage),
    /// Pre-packed bit-plane, stored as given.
    Packed(PackedPage),
}

impl Page {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Page::Bitmap(page) => page.dimensions(),
            Page::Packed(page) => page.dimensions(),
        }
    }
}

impl From<BitmapPage> for Page {
    fn from(page: BitmapPage) -> Self {
        Page::Bitmap(page)
    }
}

impl From<PackedPage> for Page {
    fn from(page: PackedPage) -> Self {
        Page::Packed(page)
    }
}

impl From<GrayImage> for Page {
    fn from(img: GrayImage) -> Self {
        Page::Bitmap(BitmapPage::from_gray_image(img))
    }
}

impl From<DynamicImage> for Page {
    fn from(img: DynamicImage) -> Self {
        Page::Bitmap(BitmapPage::from_dynamic_image(img))
    }
}
