//! XTC container and XTG page blob binary layout.
//!
//! ```text
//! XTC file (all integers little-endian)
//! =====================================
//!
//! File header (56 bytes):
//!   0x00 magic            u32  "XTC\0"
//!   0x04 version          u16  0x0100
//!   0x06 page_count       u16
//!   0x08 reading_dir      u8   0 = left to right, 1 = right to left
//!   0x09 has_metadata     u8
//!   0x0A has_thumbnails   u8
//!   0x0B has_chapters     u8
//!   0x0C current_page     u32
//!   0x10 metadata_offset  u64
//!   0x18 index_offset     u64
//!   0x20 data_offset      u64
//!   0x28 thumbs_offset    u64
//!   0x30 chapters_offset  u64
//!
//! Metadata block (256 bytes): UTF-8 title at 0x00 (max 127 bytes),
//!   creation time at 0xF0, chapter count at 0xF6, rest reserved.
//!
//! Index entry (16 bytes, one per page):
//!   0x00 blob_offset u64 (absolute)
//!   0x08 blob_size   u32 (header + data)
//!   0x0C width       u16
//!   0x0E height      u16
//!
//! XTG page blob header (22 bytes), followed by `data_size` bytes:
//!   0x00 magic        u32  "XTG\0"
//!   0x04 width        u16
//!   0x06 height       u16
//!   0x08 color_mode   u8   0 = monochrome
//!   0x09 compression  u8   0 = none
//!   0x0A data_size    u32
//!   0x0E checksum     u64  reserved, zero
//! ```

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::ReadError;

/// "XTC\0" read as a little-endian u32.
pub const XTC_MAGIC: u32 = 0x0043_5458;

/// "XTG\0" read as a little-endian u32.
pub const XTG_MAGIC: u32 = 0x0047_5458;

/// Container format version 1.0.
pub const XTC_VERSION: u16 = 0x0100;

pub const XTC_HEADER_SIZE: usize = 56;
pub const METADATA_SIZE: usize = 256;
pub const INDEX_ENTRY_SIZE: usize = 16;
pub const XTG_HEADER_SIZE: usize = 22;

/// Largest title, in bytes, stored in the metadata block.
pub const MAX_TITLE_BYTES: usize = 127;

pub const METADATA_CREATE_TIME_OFFSET: usize = 0xF0;
pub const METADATA_CHAPTER_COUNT_OFFSET: usize = 0xF6;

/// Page count is a u16 in the file header.
pub const MAX_PAGE_COUNT: usize = u16::MAX as usize;

/// Page turn direction stored in the file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum ReadingDirection {
    /// Western books.
    LeftToRight = 0,
    /// Manga and other right-bound books.
    #[default]
    RightToLeft = 1,
}

impl ReadingDirection {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ReadingDirection::LeftToRight),
            1 => Some(ReadingDirection::RightToLeft),
            _ => None,
        }
    }
}

/// XTG pixel format tag. Only 1-bit monochrome is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ColorMode {
    Monochrome = 0,
}

/// XTG payload compression tag. Payloads are always stored raw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Compression {
    None = 0,
}

/// Bytes needed for one packed row of `width` pixels.
#[inline]
pub fn row_bytes(width: u32) -> usize {
    (width as usize).div_ceil(8)
}

/// Bytes needed for a packed bit-plane: `ceil(width / 8) * height`.
#[inline]
pub fn bit_plane_size(width: u32, height: u32) -> usize {
    row_bytes(width) * height as usize
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(buf)
}

fn read_u64(bytes: &[u8], at: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(buf)
}

/// XTC file header (56 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XtcHeader {
    pub magic: u32,
    pub version: u16,
    pub page_count: u16,
    pub reading_direction: ReadingDirection,
    pub has_metadata: bool,
    pub has_thumbnails: bool,
    pub has_chapters: bool,
    /// Resume position, zero-based.
    pub current_page: u32,
    pub metadata_offset: u64,
    pub index_offset: u64,
    pub data_offset: u64,
    pub thumbnails_offset: u64,
    pub chapters_offset: u64,
}

impl XtcHeader {
    /// Parse a header from exactly [`XTC_HEADER_SIZE`] bytes.
    ///
    /// Only the reading direction is checked here; magic and version are
    /// checked by [`XtcHeader::validate`].
    pub fn from_bytes(bytes: &[u8; XTC_HEADER_SIZE]) -> Result<Self, ReadError> {
        let reading_direction = ReadingDirection::from_u8(bytes[8]).ok_or_else(|| {
            ReadError::InvalidLayout(format!("unknown reading direction {}", bytes[8]))
        })?;

        Ok(Self {
            magic: read_u32(bytes, 0),
            version: read_u16(bytes, 4),
            page_count: read_u16(bytes, 6),
            reading_direction,
            has_metadata: bytes[9] != 0,
            has_thumbnails: bytes[10] != 0,
            has_chapters: bytes[11] != 0,
            current_page: read_u32(bytes, 12),
            metadata_offset: read_u64(bytes, 16),
            index_offset: read_u64(bytes, 24),
            data_offset: read_u64(bytes, 32),
            thumbnails_offset: read_u64(bytes, 40),
            chapters_offset: read_u64(bytes, 48),
        })
    }

    /// Check magic and version.
    pub fn validate(&self) -> Result<(), ReadError> {
        if self.magic != XTC_MAGIC {
            return Err(ReadError::InvalidMagic {
                what: "container",
                expected: XTC_MAGIC,
                actual: self.magic,
            });
        }
        if self.version != XTC_VERSION {
            return Err(ReadError::UnsupportedVersion(self.version));
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> [u8; XTC_HEADER_SIZE] {
        let mut bytes = [0u8; XTC_HEADER_SIZE];

        bytes[0..4].copy_from_slice(&self.magic.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.page_count.to_le_bytes());
        bytes[8] = self.reading_direction as u8;
        bytes[9] = self.has_metadata as u8;
        bytes[10] = self.has_thumbnails as u8;
        bytes[11] = self.has_chapters as u8;
        bytes[12..16].copy_from_slice(&self.current_page.to_le_bytes());
        bytes[16..24].copy_from_slice(&self.metadata_offset.to_le_bytes());
        bytes[24..32].copy_from_slice(&self.index_offset.to_le_bytes());
        bytes[32..40].copy_from_slice(&self.data_offset.to_le_bytes());
        bytes[40..48].copy_from_slice(&self.thumbnails_offset.to_le_bytes());
        bytes[48..56].copy_from_slice(&self.chapters_offset.to_le_bytes());

        bytes
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.to_bytes())
    }
}

/// One row of the page index table (16 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    /// Absolute offset of the page blob from the start of the file.
    pub blob_offset: u64,
    /// Blob header plus payload, in bytes.
    pub blob_size: u32,
    pub width: u16,
    pub height: u16,
}

impl IndexEntry {
    pub fn from_bytes(bytes: &[u8; INDEX_ENTRY_SIZE]) -> Self {
        Self {
            blob_offset: read_u64(bytes, 0),
            blob_size: read_u32(bytes, 8),
            width: read_u16(bytes, 12),
            height: read_u16(bytes, 14),
        }
    }

    pub fn to_bytes(&self) -> [u8; INDEX_ENTRY_SIZE] {
        let mut bytes = [0u8; INDEX_ENTRY_SIZE];
        bytes[0..8].copy_from_slice(&self.blob_offset.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.blob_size.to_le_bytes());
        bytes[12..14].copy_from_slice(&self.width.to_le_bytes());
        bytes[14..16].copy_from_slice(&self.height.to_le_bytes());
        bytes
    }

    /// Offset one past the last byte of the blob.
    #[inline]
    pub fn end_offset(&self) -> u64 {
        self.blob_offset + self.blob_size as u64
    }
}

/// XTG page blob header (22 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobHeader {
    pub magic: u32,
    pub width: u16,
    pub height: u16,
    pub color_mode: u8,
    pub compression: u8,
    pub data_size: u32,
    /// Reserved. Always written as zero.
    pub checksum: u64,
}

impl BlobHeader {
    /// Header for an uncompressed monochrome page.
    pub fn monochrome(width: u16, height: u16, data_size: u32) -> Self {
        Self {
            magic: XTG_MAGIC,
            width,
            height,
            color_mode: ColorMode::Monochrome as u8,
            compression: Compression::None as u8,
            data_size,
            checksum: 0,
        }
    }

    pub fn from_bytes(bytes: &[u8; XTG_HEADER_SIZE]) -> Self {
        Self {
            magic: read_u32(bytes, 0),
            width: read_u16(bytes, 4),
            height: read_u16(bytes, 6),
            color_mode: bytes[8],
            compression: bytes[9],
            data_size: read_u32(bytes, 10),
            checksum: read_u64(bytes, 14),
        }
    }

    pub fn to_bytes(&self) -> [u8; XTG_HEADER_SIZE] {
        let mut bytes = [0u8; XTG_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.width.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.height.to_le_bytes());
        bytes[8] = self.color_mode;
        bytes[9] = self.compression;
        bytes[10..14].copy_from_slice(&self.data_size.to_le_bytes());
        bytes[14..22].copy_from_slice(&self.checksum.to_le_bytes());
        bytes
    }
}
