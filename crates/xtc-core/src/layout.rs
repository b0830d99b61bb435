//! Section offsets and index table construction.
//!
//! The header, metadata and index sizes depend only on the page count, so
//! every offset up to the data area is known before any page is encoded.
//! Blob offsets are then accumulated in page order from the data offset.

use tracing::debug;

use crate::blob::PageBlob;
use crate::error::XtcError;
use crate::format::{IndexEntry, INDEX_ENTRY_SIZE, MAX_PAGE_COUNT, METADATA_SIZE, XTC_HEADER_SIZE};

/// Absolute offsets of the fixed sections for a given page count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionLayout {
    pub page_count: u16,
    pub metadata_offset: u64,
    pub index_offset: u64,
    pub data_offset: u64,
}

impl SectionLayout {
    /// Compute offsets for `page_count` pages.
    ///
    /// # Errors
    ///
    /// Returns `XtcError::InputEmpty` for zero pages and
    /// `XtcError::PageCountOverflow` above [`MAX_PAGE_COUNT`].
    pub fn for_page_count(page_count: usize) -> Result<Self, XtcError> {
        if page_count == 0 {
            return Err(XtcError::InputEmpty);
        }
        let count = u16::try_from(page_count).map_err(|_| XtcError::PageCountOverflow {
            count: page_count,
            max: MAX_PAGE_COUNT,
        })?;

        let metadata_offset = XTC_HEADER_SIZE as u64;
        let index_offset = metadata_offset + METADATA_SIZE as u64;
        let data_offset = index_offset + page_count as u64 * INDEX_ENTRY_SIZE as u64;

        debug!(
            page_count,
            metadata_offset, index_offset, data_offset, "Computed section layout"
        );

        Ok(Self {
            page_count: count,
            metadata_offset,
            index_offset,
            data_offset,
        })
    }

    /// Size of the index table in bytes.
    #[inline]
    pub fn index_size(&self) -> usize {
        self.page_count as usize * INDEX_ENTRY_SIZE
    }
}

/// Pair every blob with its index entry, accumulating offsets in order.
///
/// Returns the pairs and the total file length.
///
/// # Errors
///
/// Returns `XtcError::InvalidConfig` if a blob is too large for the 32-bit
/// size field.
pub fn index_blobs(
    layout: &SectionLayout,
    blobs: Vec<PageBlob>,
) -> Result<(Vec<(IndexEntry, PageBlob)>, u64), XtcError> {
    let mut offset = layout.data_offset;
    let mut pages = Vec::with_capacity(blobs.len());

    for (index, blob) in blobs.into_iter().enumerate() {
        let blob_size = u32::try_from(blob.len()).map_err(|_| {
            XtcError::InvalidConfig(format!(
                "page {} blob of {} bytes exceeds the 32-bit size field",
                index,
                blob.len()
            ))
        })?;

        let entry = IndexEntry {
            blob_offset: offset,
            blob_size,
            width: blob.width(),
            height: blob.height(),
        };
        offset = entry.end_offset();
        pages.push((entry, blob));
    }

    Ok((pages, offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(width: u32, height: u32) -> PageBlob {
        let size = crate::format::bit_plane_size(width, height);
        PageBlob::from_bit_plane(width, height, vec![0xFF; size]).unwrap()
    }

    #[test]
    fn test_single_page_layout() {
        let layout = SectionLayout::for_page_count(1).unwrap();
        assert_eq!(layout.metadata_offset, 56);
        assert_eq!(layout.index_offset, 312);
        assert_eq!(layout.data_offset, 56 + 256 + 16);
        assert_eq!(layout.index_size(), 16);
    }

    #[test]
    fn test_layout_depends_only_on_count() {
        let layout = SectionLayout::for_page_count(100).unwrap();
        assert_eq!(layout.data_offset, 312 + 1600);
    }

    #[test]
    fn test_zero_pages_is_input_empty() {
        assert!(matches!(
            SectionLayout::for_page_count(0),
            Err(XtcError::InputEmpty)
        ));
    }

    #[test]
    fn test_page_count_limits() {
        assert!(SectionLayout::for_page_count(MAX_PAGE_COUNT).is_ok());
        assert!(matches!(
            SectionLayout::for_page_count(MAX_PAGE_COUNT + 1),
            Err(XtcError::PageCountOverflow {
                count: 65536,
                max: 65535
            })
        ));
    }

    #[test]
    fn test_index_offsets_accumulate() {
        let layout = SectionLayout::for_page_count(3).unwrap();
        let blobs = vec![blob(8, 1), blob(16, 2), blob(8, 3)];
        let (pages, end) = index_blobs(&layout, blobs).unwrap();

        assert_eq!(pages[0].0.blob_offset, layout.data_offset);
        assert_eq!(pages[0].0.blob_size, 23);
        assert_eq!(pages[1].0.blob_offset, layout.data_offset + 23);
        assert_eq!(pages[1].0.blob_size, 26);
        assert_eq!(pages[2].0.blob_offset, layout.data_offset + 49);
        assert_eq!(pages[2].0.blob_size, 25);
        assert_eq!(end, layout.data_offset + 74);
    }

    #[test]
    fn test_index_entries_carry_dimensions() {
        let layout = SectionLayout::for_page_count(1).unwrap();
        let (pages, _) = index_blobs(&layout, vec![blob(480, 800)]).unwrap();
        assert_eq!((pages[0].0.width, pages[0].0.height), (480, 800));
    }
}
