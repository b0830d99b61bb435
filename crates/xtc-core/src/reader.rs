//! XTC container parsing.
//!
//! [`XtcReader`] checks the whole layout once up front (header, section
//! offsets, index table, every blob header) so that page access afterwards
//! is a plain slice lookup, the way a reading device seeks straight to a
//! page through the index table.

use std::io::Cursor;

use image::{GrayImage, ImageFormat};

use crate::error::ReadError;
use crate::format::{
    bit_plane_size, BlobHeader, ColorMode, Compression, IndexEntry, XtcHeader, INDEX_ENTRY_SIZE,
    METADATA_SIZE, XTC_HEADER_SIZE, XTG_HEADER_SIZE, XTG_MAGIC,
};
use crate::metadata::parse_title;
use crate::monochrome::unpack_bits;

/// A validated, borrowed view of an XTC container.
#[derive(Debug, Clone)]
pub struct XtcReader<'a> {
    data: &'a [u8],
    header: XtcHeader,
    index: Vec<IndexEntry>,
}

impl<'a> XtcReader<'a> {
    /// Parse and validate a complete container.
    ///
    /// # Errors
    ///
    /// Returns a `ReadError` describing the first inconsistency found.
    pub fn parse(data: &'a [u8]) -> Result<Self, ReadError> {
        let header_bytes: &[u8; XTC_HEADER_SIZE] = slice_at(data, "header", 0, XTC_HEADER_SIZE)?
            .try_into()
            .map_err(|_| ReadError::InvalidLayout("header slice".to_string()))?;
        let header = XtcHeader::from_bytes(header_bytes)?;
        header.validate()?;

        if header.page_count == 0 {
            return Err(ReadError::InvalidLayout("container has no pages".to_string()));
        }
        if header.has_metadata {
            slice_at(data, "metadata", header.metadata_offset, METADATA_SIZE)?;
        }

        let index_len = header.page_count as usize * INDEX_ENTRY_SIZE;
        let index_bytes = slice_at(data, "index table", header.index_offset, index_len)?;
        let index: Vec<IndexEntry> = index_bytes
            .chunks_exact(INDEX_ENTRY_SIZE)
            .map(|chunk| {
                let mut entry = [0u8; INDEX_ENTRY_SIZE];
                entry.copy_from_slice(chunk);
                IndexEntry::from_bytes(&entry)
            })
            .collect();

        let reader = Self {
            data,
            header,
            index,
        };
        reader.check_offsets()?;
        for page in 0..reader.index.len() {
            reader.check_blob(page)?;
        }

        Ok(reader)
    }

    /// Blobs must start at the data offset, abut one another and end at
    /// the end of the file.
    fn check_offsets(&self) -> Result<(), ReadError> {
        let index_end = self.header.index_offset + (self.index.len() * INDEX_ENTRY_SIZE) as u64;
        if self.header.data_offset != index_end {
            return Err(ReadError::InvalidLayout(format!(
                "data offset {} does not follow index table ending at {}",
                self.header.data_offset, index_end
            )));
        }

        let mut expected = self.header.data_offset;
        for (page, entry) in self.index.iter().enumerate() {
            if entry.blob_offset != expected {
                return Err(ReadError::InvalidLayout(format!(
                    "page {} blob at offset {}, expected {}",
                    page, entry.blob_offset, expected
                )));
            }
            expected = entry.end_offset();
        }

        if expected != self.data.len() as u64 {
            return Err(ReadError::InvalidLayout(format!(
                "blobs end at {}, file is {} bytes",
                expected,
                self.data.len()
            )));
        }
        Ok(())
    }

    fn check_blob(&self, page: usize) -> Result<(), ReadError> {
        let entry = &self.index[page];
        let invalid = |reason: String| ReadError::InvalidBlob { page, reason };

        if (entry.blob_size as usize) < XTG_HEADER_SIZE {
            return Err(invalid(format!("size {} is smaller than its header", entry.blob_size)));
        }

        let header = self.blob_header(entry)?;
        if header.magic != XTG_MAGIC {
            return Err(ReadError::InvalidMagic {
                what: "page blob",
                expected: XTG_MAGIC,
                actual: header.magic,
            });
        }
        if header.color_mode != ColorMode::Monochrome as u8 {
            return Err(invalid(format!("unsupported color mode {}", header.color_mode)));
        }
        if header.compression != Compression::None as u8 {
            return Err(invalid(format!("unsupported compression {}", header.compression)));
        }
        if (header.width, header.height) != (entry.width, entry.height) {
            return Err(invalid(format!(
                "blob is {}x{}, index says {}x{}",
                header.width, header.height, entry.width, entry.height
            )));
        }

        let expected = bit_plane_size(header.width as u32, header.height as u32);
        if header.data_size as usize != expected {
            return Err(invalid(format!(
                "data size {} should be {}",
                header.data_size, expected
            )));
        }
        if XTG_HEADER_SIZE + expected != entry.blob_size as usize {
            return Err(invalid(format!(
                "index size {} does not match header plus data {}",
                entry.blob_size,
                XTG_HEADER_SIZE + expected
            )));
        }
        Ok(())
    }

    fn blob_header(&self, entry: &IndexEntry) -> Result<BlobHeader, ReadError> {
        let bytes = slice_at(self.data, "page blob", entry.blob_offset, XTG_HEADER_SIZE)?;
        let mut header = [0u8; XTG_HEADER_SIZE];
        header.copy_from_slice(bytes);
        Ok(BlobHeader::from_bytes(&header))
    }

    pub fn header(&self) -> &XtcHeader {
        &self.header
    }

    pub fn page_count(&self) -> usize {
        self.index.len()
    }

    pub fn index(&self) -> &[IndexEntry] {
        &self.index
    }

    /// Title from the metadata block, empty when the container has none.
    pub fn title(&self) -> String {
        if !self.header.has_metadata {
            return String::new();
        }
        let start = self.header.metadata_offset as usize;
        parse_title(&self.data[start..start + METADATA_SIZE])
    }

    /// Random access to one page through the index table.
    ///
    /// # Errors
    ///
    /// Returns `ReadError::PageOutOfRange` for an index past the last page.
    pub fn page(&self, index: usize) -> Result<PageView<'a>, ReadError> {
        let entry = self.index.get(index).ok_or(ReadError::PageOutOfRange {
            index,
            count: self.index.len(),
        })?;
        let header = self.blob_header(entry)?;
        let data = slice_at(
            self.data,
            "page data",
            entry.blob_offset + XTG_HEADER_SIZE as u64,
            header.data_size as usize,
        )?;

        Ok(PageView {
            index,
            header,
            data,
        })
    }

    pub fn pages(&self) -> impl Iterator<Item = Result<PageView<'a>, ReadError>> + '_ {
        (0..self.index.len()).map(move |i| self.page(i))
    }
}

/// One page blob inside a parsed container.
#[derive(Debug, Clone, Copy)]
pub struct PageView<'a> {
    index: usize,
    header: BlobHeader,
    data: &'a [u8],
}

impl<'a> PageView<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn header(&self) -> &BlobHeader {
        &self.header
    }

    pub fn width(&self) -> u32 {
        self.header.width as u32
    }

    pub fn height(&self) -> u32 {
        self.header.height as u32
    }

    /// The packed bit-plane.
    pub fn bit_plane(&self) -> &'a [u8] {
        self.data
    }

    /// Unpacked luma pixels: 255 for white, 0 for black.
    pub fn pixels(&self) -> Vec<u8> {
        // Length was checked against the dimensions when the reader was built.
        unpack_bits(self.data, self.width(), self.height()).unwrap_or_default()
    }

    pub fn to_gray_image(&self) -> Result<GrayImage, ReadError> {
        GrayImage::from_raw(self.width(), self.height(), self.pixels()).ok_or_else(|| {
            ReadError::Image(format!(
                "page {} pixels do not fill {}x{}",
                self.index,
                self.width(),
                self.height()
            ))
        })
    }

    /// Encode the page as a PNG for previews.
    pub fn to_png(&self) -> Result<Vec<u8>, ReadError> {
        let img = self.to_gray_image()?;
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| ReadError::Image(e.to_string()))?;
        Ok(buffer.into_inner())
    }
}

fn slice_at<'a>(
    data: &'a [u8],
    what: &'static str,
    offset: u64,
    len: usize,
) -> Result<&'a [u8], ReadError> {
    let truncated = || ReadError::Truncated {
        what,
        offset,
        needed: len as u64,
        len: data.len() as u64,
    };
    let start = usize::try_from(offset).map_err(|_| truncated())?;
    let end = start.checked_add(len).ok_or_else(truncated)?;
    data.get(start..end).ok_or_else(truncated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::ContainerAssembler;
    use crate::config::XtcConfig;
    use crate::format::ReadingDirection;
    use crate::monochrome::{pack_bits, MonochromeMode};
    use crate::page::{BitmapPage, PackedPage, Page};

    fn checkerboard(width: u32, height: u32) -> PackedPage {
        PackedPage::new(width, height, pack_bits(width, height, |x, y| (x + y) % 2 == 0))
    }

    fn build(pages: Vec<Page>, title: &str) -> Vec<u8> {
        let (width, height) = pages[0].dimensions();
        let config = XtcConfig::new()
            .with_resolution(width, height)
            .with_reading_direction(ReadingDirection::LeftToRight);
        ContainerAssembler::new(config)
            .unwrap()
            .assemble(pages, title)
            .unwrap()
            .to_bytes()
    }

    #[test]
    fn test_parse_roundtrip() {
        let pages: Vec<Page> = vec![
            checkerboard(10, 3).into(),
            PackedPage::blank(10, 3).into(),
        ];
        let bytes = build(pages, "Round trip");
        let reader = XtcReader::parse(&bytes).unwrap();

        assert_eq!(reader.page_count(), 2);
        assert_eq!(reader.title(), "Round trip");
        assert_eq!(reader.header().reading_direction, ReadingDirection::LeftToRight);

        let first = reader.page(0).unwrap();
        assert_eq!((first.width(), first.height()), (10, 3));
        assert_eq!(first.bit_plane(), checkerboard(10, 3).data.as_slice());
        assert_eq!(first.pixels()[0], 255);
        assert_eq!(first.pixels()[1], 0);

        let second = reader.page(1).unwrap();
        assert!(second.pixels().iter().all(|&p| p == 255));
    }

    #[test]
    fn test_page_out_of_range() {
        let bytes = build(vec![PackedPage::blank(8, 1).into()], "");
        let reader = XtcReader::parse(&bytes).unwrap();
        assert!(matches!(
            reader.page(1),
            Err(ReadError::PageOutOfRange { index: 1, count: 1 })
        ));
    }

    #[test]
    fn test_truncated_file() {
        let bytes = build(vec![PackedPage::blank(8, 2).into()], "");
        let result = XtcReader::parse(&bytes[..bytes.len() - 1]);
        assert!(result.is_err());

        let result = XtcReader::parse(&bytes[..20]);
        assert!(matches!(result, Err(ReadError::Truncated { what: "header", .. })));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = build(vec![PackedPage::blank(8, 2).into()], "");
        bytes.push(0);
        assert!(matches!(
            XtcReader::parse(&bytes),
            Err(ReadError::InvalidLayout(_))
        ));
    }

    #[test]
    fn test_bad_container_magic() {
        let mut bytes = build(vec![PackedPage::blank(8, 2).into()], "");
        bytes[0] = b'Z';
        assert!(matches!(
            XtcReader::parse(&bytes),
            Err(ReadError::InvalidMagic { what: "container", .. })
        ));
    }

    #[test]
    fn test_bad_blob_magic() {
        let mut bytes = build(vec![PackedPage::blank(8, 2).into()], "");
        let data_offset = 56 + 256 + 16;
        bytes[data_offset + 2] = b'X';
        assert!(matches!(
            XtcReader::parse(&bytes),
            Err(ReadError::InvalidMagic { what: "page blob", .. })
        ));
    }

    #[test]
    fn test_index_entry_pointing_elsewhere() {
        let mut bytes = build(
            vec![PackedPage::blank(8, 2).into(), PackedPage::blank(8, 2).into()],
            "",
        );
        // Bump the second entry's offset by one
        let second_entry = 56 + 256 + 16;
        bytes[second_entry] = bytes[second_entry].wrapping_add(1);
        assert!(matches!(
            XtcReader::parse(&bytes),
            Err(ReadError::InvalidLayout(_))
        ));
    }

    #[test]
    fn test_dimension_disagreement() {
        let mut bytes = build(vec![PackedPage::blank(8, 2).into()], "");
        // Index entry width (offset 12 within the entry)
        let entry = 56 + 256;
        bytes[entry + 12] = 16;
        assert!(matches!(
            XtcReader::parse(&bytes),
            Err(ReadError::InvalidBlob { page: 0, .. })
        ));
    }

    #[test]
    fn test_to_png() {
        let page = BitmapPage::filled(8, 4, 0);
        let config = XtcConfig::new()
            .with_resolution(8, 4)
            .with_monochrome(MonochromeMode::threshold());
        let bytes = ContainerAssembler::new(config)
            .unwrap()
            .assemble(vec![page], "Png")
            .unwrap()
            .to_bytes();
        let reader = XtcReader::parse(&bytes).unwrap();
        let png = reader.page(0).unwrap().to_png().unwrap();

        assert_eq!(&png[1..4], b"PNG");
        let decoded = image::load_from_memory(&png).unwrap().into_luma8();
        assert!(decoded.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_pages_iterator() {
        let bytes = build(
            vec![
                PackedPage::blank(8, 1).into(),
                checkerboard(8, 1).into(),
                PackedPage::blank(8, 1).into(),
            ],
            "",
        );
        let reader = XtcReader::parse(&bytes).unwrap();
        let indices: Vec<usize> = reader.pages().map(|p| p.unwrap().index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }
}
