//! XTG page blob encoding.
//!
//! A page blob is a 22-byte [`BlobHeader`] immediately followed by the
//! packed bit-plane. Encoding is a pure function of the page and the
//! monochrome mode, so pages can be encoded on any thread.

use std::io::Write;

use crate::error::XtcError;
use crate::format::{bit_plane_size, BlobHeader, XTG_HEADER_SIZE};
use crate::monochrome::{pack_page, MonochromeMode};
use crate::page::Page;

/// An encoded page: header plus packed bit-plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageBlob {
    header: BlobHeader,
    data: Vec<u8>,
}

impl PageBlob {
    /// Build a blob from an already packed bit-plane.
    ///
    /// # Errors
    ///
    /// Returns `XtcError::SizeMismatch` when `data` is not exactly
    /// `ceil(width / 8) * height` bytes, and `XtcError::InvalidConfig` when
    /// a dimension does not fit the 16-bit header fields.
    pub fn from_bit_plane(width: u32, height: u32, data: Vec<u8>) -> Result<Self, XtcError> {
        let (w16, h16) = match (u16::try_from(width), u16::try_from(height)) {
            (Ok(w), Ok(h)) => (w, h),
            _ => {
                return Err(XtcError::InvalidConfig(format!(
                    "page dimensions {}x{} exceed the 16-bit blob header fields",
                    width, height
                )))
            }
        };

        let expected = bit_plane_size(width, height);
        if data.len() != expected {
            return Err(XtcError::SizeMismatch {
                page: None,
                expected,
                actual: data.len(),
            });
        }

        let data_size = u32::try_from(expected).map_err(|_| {
            XtcError::InvalidConfig(format!("bit-plane of {} bytes is too large", expected))
        })?;

        Ok(Self {
            header: BlobHeader::monochrome(w16, h16, data_size),
            data,
        })
    }

    pub fn header(&self) -> &BlobHeader {
        &self.header
    }

    /// The packed bit-plane.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u16 {
        self.header.width
    }

    pub fn height(&self) -> u16 {
        self.header.height
    }

    /// Total encoded size: header plus payload.
    #[inline]
    pub fn len(&self) -> usize {
        XTG_HEADER_SIZE + self.data.len()
    }

    /// Always false; a blob carries at least its header.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.header.to_bytes())?;
        writer.write_all(&self.data)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len());
        bytes.extend_from_slice(&self.header.to_bytes());
        bytes.extend_from_slice(&self.data);
        bytes
    }
}

/// Encode one page into an XTG blob.
///
/// Bitmap pages are reduced to 1 bit with `mode`; packed pages are stored
/// as given after their length is checked.
///
/// # Errors
///
/// Returns `XtcError::SizeMismatch` if the packed plane has the wrong length
/// and `XtcError::PixelBufferMismatch` if a bitmap's luma buffer does not
/// hold `width * height` pixels.
pub fn encode_page(page: &Page, mode: MonochromeMode) -> Result<PageBlob, XtcError> {
    match page {
        Page::Bitmap(bitmap) => {
            let expected_pixels = bitmap.width as usize * bitmap.height as usize;
            if bitmap.pixels.len() != expected_pixels {
                return Err(XtcError::PixelBufferMismatch {
                    page: None,
                    expected: expected_pixels,
                    actual: bitmap.pixels.len(),
                });
            }
            PageBlob::from_bit_plane(bitmap.width, bitmap.height, pack_page(bitmap, mode))
        }
        Page::Packed(packed) => {
            PageBlob::from_bit_plane(packed.width, packed.height, packed.data.clone())
        }
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
