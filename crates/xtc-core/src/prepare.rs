//! Page resampling to the container resolution.
//!
//! The assembler rejects pages whose size differs from the configured
//! resolution. Callers that start from arbitrary scans use
//! [`fit_to_resolution`] first, stretching each page to the panel size.

use serde::{Deserialize, Serialize};

use crate::error::XtcError;
use crate::page::BitmapPage;

/// Interpolation filter for resampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, blocky).
    Nearest,
    /// Bilinear interpolation (fast, acceptable quality).
    #[default]
    Bilinear,
    /// Lanczos3 interpolation (slower, sharpest line art).
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }

    /// Map a numeric filter code (0 = nearest, 1 = bilinear, 2 = lanczos3).
    /// Unknown codes fall back to the default.
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => FilterType::Nearest,
            2 => FilterType::Lanczos3,
            _ => FilterType::Bilinear,
        }
    }
}

/// Resample a page to exactly `width` x `height`.
///
/// The aspect ratio is not preserved: the page is stretched to fill the
/// panel.
///
/// # Arguments
///
/// * `page` - The source page
/// * `width` - Target width in pixels
/// * `height` - Target height in pixels
/// * `filter` - Interpolation filter to use
///
/// # Returns
///
/// A new `BitmapPage` with the target dimensions.
///
/// # Errors
///
/// Returns `XtcError::InvalidConfig` for a zero target dimension and
/// `XtcError::PixelBufferMismatch` if the source pixel buffer does not match its
/// dimensions.
pub fn fit_to_resolution(
    page: &BitmapPage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<BitmapPage, XtcError> {
    if width == 0 || height == 0 {
        return Err(XtcError::InvalidConfig(format!(
            "target resolution {}x{} must be non-zero",
            width, height
        )));
    }

    // Fast path: if dimensions match, just clone
    if page.dimensions() == (width, height) {
        return Ok(page.clone());
    }

    let gray = page.to_gray_image().ok_or(XtcError::PixelBufferMismatch {
        page: None,
        expected: page.width as usize * page.height as usize,
        actual: page.pixels.len(),
    })?;

    let resized = image::imageops::resize(&gray, width, height, filter.to_image_filter());

    Ok(BitmapPage::from_gray_image(resized))
}
