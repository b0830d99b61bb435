//! Container inspection WASM bindings.
//!
//! Lets a web front end check a finished file and preview its pages
//! without a device.

use serde::Serialize;
use wasm_bindgen::prelude::*;
use xtc_core::{ReadError, ReadingDirection, XtcReader};

use crate::types::JsPageImage;

/// Summary of a parsed container, returned to JavaScript as a plain object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerSummary {
    pub title: String,
    pub page_count: usize,
    pub reading_direction: ReadingDirection,
    pub current_page: u32,
    pub metadata_offset: u64,
    pub index_offset: u64,
    pub data_offset: u64,
    pub file_size: usize,
    pub pages: Vec<PageSummary>,
}

/// One index table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    pub width: u16,
    pub height: u16,
    pub offset: u64,
    pub size: u32,
}

pub(crate) fn summarize(bytes: &[u8]) -> Result<ContainerSummary, ReadError> {
    let reader = XtcReader::parse(bytes)?;
    let header = reader.header();

    Ok(ContainerSummary {
        title: reader.title(),
        page_count: reader.page_count(),
        reading_direction: header.reading_direction,
        current_page: header.current_page,
        metadata_offset: header.metadata_offset,
        index_offset: header.index_offset,
        data_offset: header.data_offset,
        file_size: bytes.len(),
        pages: reader
            .index()
            .iter()
            .map(|entry| PageSummary {
                width: entry.width,
                height: entry.height,
                offset: entry.blob_offset,
                size: entry.blob_size,
            })
            .collect(),
    })
}

pub(crate) fn render_page(bytes: &[u8], index: usize) -> Result<JsPageImage, ReadError> {
    let reader = XtcReader::parse(bytes)?;
    let view = reader.page(index)?;
    Ok(JsPageImage::from_page_view(&view))
}

/// Parse an XTC file and describe its layout.
///
/// # Errors
///
/// Returns an error string if the file is not a valid container.
#[wasm_bindgen]
pub fn inspect_xtc(bytes: &[u8]) -> Result<JsValue, JsValue> {
    let summary = summarize(bytes).map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_wasm_bindgen::to_value(&summary).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Decode one page of an XTC file to an RGB image for preview.
#[wasm_bindgen]
pub fn render_xtc_page(bytes: &[u8], index: usize) -> Result<JsPageImage, JsValue> {
    render_page(bytes, index).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Decode one page of an XTC file to PNG bytes.
#[wasm_bindgen]
pub fn render_xtc_page_png(bytes: &[u8], index: usize) -> Result<Vec<u8>, JsValue> {
    XtcReader::parse(bytes)
        .and_then(|reader| reader.page(index)?.to_png())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use xtc_core::{assemble_container, PackedPage, XtcConfig};

    fn sample() -> Vec<u8> {
        let config = XtcConfig::new().with_resolution(8, 2);
        let pages = vec![
            PackedPage::new(8, 2, vec![0xF0, 0x0F]),
            PackedPage::blank(8, 2),
        ];
        assemble_container(config, pages, "Inspect").unwrap()
    }

    #[test]
    fn test_summarize() {
        let bytes = sample();
        let summary = summarize(&bytes).unwrap();

        assert_eq!(summary.title, "Inspect");
        assert_eq!(summary.page_count, 2);
        assert_eq!(summary.reading_direction, ReadingDirection::RightToLeft);
        assert_eq!(summary.metadata_offset, 56);
        assert_eq!(summary.index_offset, 312);
        assert_eq!(summary.data_offset, 344);
        assert_eq!(summary.file_size, bytes.len());
        assert_eq!(
            summary.pages[0],
            PageSummary {
                width: 8,
                height: 2,
                offset: 344,
                size: 24
            }
        );
        assert_eq!(summary.pages[1].offset, 368);
    }

    #[test]
    fn test_summarize_rejects_garbage() {
        assert!(summarize(b"not a container").is_err());
    }

    #[test]
    fn test_render_page() {
        let bytes = sample();
        let image = render_page(&bytes, 0).unwrap();

        assert_eq!((image.width(), image.height()), (8, 2));
        let pixels = image.pixels();
        assert_eq!(pixels.len(), 8 * 2 * 3);
        // First row: four white then four black
        assert_eq!(&pixels[0..3], &[255, 255, 255]);
        assert_eq!(&pixels[12..15], &[0, 0, 0]);
        // Second row starts black
        assert_eq!(&pixels[24..27], &[0, 0, 0]);
    }

    #[test]
    fn test_render_out_of_range() {
        assert!(matches!(
            render_page(&sample(), 5),
            Err(ReadError::PageOutOfRange { index: 5, count: 2 })
        ));
    }
}

/// WASM-specific tests that require JsValue.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;
    use xtc_core::{assemble_container, PackedPage, XtcConfig};

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_inspect_returns_object() {
        let config = XtcConfig::new().with_resolution(8, 1);
        let bytes = assemble_container(config, vec![PackedPage::blank(8, 1)], "Js").unwrap();
        let value = inspect_xtc(&bytes).unwrap();
        assert!(value.is_object());
    }

    #[wasm_bindgen_test]
    fn test_inspect_error() {
        assert!(inspect_xtc(&[0u8; 4]).is_err());
    }

    #[wasm_bindgen_test]
    fn test_render_png() {
        let config = XtcConfig::new().with_resolution(8, 1);
        let bytes = assemble_container(config, vec![PackedPage::blank(8, 1)], "").unwrap();
        let png = render_xtc_page_png(&bytes, 0).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }
}
