//! End-to-end container tests through the public API.

use image::{GrayImage, Luma};
use tempfile::TempDir;
use xtc_core::format::{INDEX_ENTRY_SIZE, METADATA_SIZE, XTC_HEADER_SIZE};
use xtc_core::{
    assemble_container, write_atomic, BitmapPage, ContainerAssembler, MonochromeMode, PackedPage,
    Page, ReadingDirection, XtcConfig, XtcError, XtcReader,
};

/// Stripes whose width depends on the page number, so pages differ.
fn striped_page(page: u32) -> GrayImage {
    GrayImage::from_fn(480, 800, |x, y| {
        if ((x + y) / (page + 2)) % 2 == 0 {
            Luma([0])
        } else {
            Luma([255])
        }
    })
}

fn sample_config() -> XtcConfig {
    XtcConfig::new()
        .with_resolution(480, 800)
        .with_reading_direction(ReadingDirection::RightToLeft)
}

#[test]
fn test_three_page_sample_container() {
    let pages: Vec<GrayImage> = (0..3).map(striped_page).collect();
    let bytes = assemble_container(sample_config(), pages, "Sample").unwrap();
    let reader = XtcReader::parse(&bytes).unwrap();
    let header = reader.header();

    assert_eq!(header.page_count, 3);
    assert_eq!(header.version, 0x0100);
    assert_eq!(header.reading_direction as u8, 1);

    let metadata = header.metadata_offset as usize;
    assert_eq!(metadata, XTC_HEADER_SIZE);
    assert_eq!(&bytes[metadata..metadata + 6], b"Sample");
    assert_eq!(reader.title(), "Sample");

    assert_eq!(reader.index().len(), 3);
    let blob_total: u64 = reader.index().iter().map(|e| e.blob_size as u64).sum();
    assert_eq!(blob_total, bytes.len() as u64 - header.data_offset);
}

#[test]
fn test_offsets_are_contiguous() {
    let pages: Vec<GrayImage> = (0..4).map(striped_page).collect();
    let bytes = assemble_container(sample_config(), pages, "Offsets").unwrap();
    let reader = XtcReader::parse(&bytes).unwrap();
    let index = reader.index();

    assert_eq!(index[0].blob_offset, reader.header().data_offset);
    for pair in index.windows(2) {
        assert_eq!(pair[0].blob_offset + pair[0].blob_size as u64, pair[1].blob_offset);
    }
}

#[test]
fn test_pixels_survive_roundtrip() {
    let config = sample_config().with_monochrome(MonochromeMode::threshold());
    let pages: Vec<GrayImage> = (0..2).map(striped_page).collect();
    let bytes = assemble_container(config, pages.clone(), "Pixels").unwrap();
    let reader = XtcReader::parse(&bytes).unwrap();

    for (i, original) in pages.iter().enumerate() {
        let view = reader.page(i).unwrap();
        assert_eq!((view.width(), view.height()), (480, 800));
        assert_eq!(view.pixels(), original.as_raw().clone());
    }
}

#[test]
fn test_parallel_encoding_is_byte_identical() {
    let pages: Vec<GrayImage> = (0..5).map(striped_page).collect();
    let sequential = assemble_container(sample_config(), pages.clone(), "Same").unwrap();
    let parallel =
        assemble_container(sample_config().with_encode_threads(3), pages, "Same").unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn test_single_page_data_offset() {
    let bytes = assemble_container(sample_config(), vec![striped_page(0)], "").unwrap();
    let reader = XtcReader::parse(&bytes).unwrap();
    assert_eq!(
        reader.header().data_offset,
        (XTC_HEADER_SIZE + METADATA_SIZE + INDEX_ENTRY_SIZE) as u64
    );
    assert_eq!(reader.header().data_offset, 328);
}

#[test]
fn test_zero_pages_is_input_empty() {
    let result = assemble_container(sample_config(), Vec::<Page>::new(), "Empty");
    assert!(matches!(result, Err(XtcError::InputEmpty)));
}

#[test]
fn test_corrupted_page_writes_no_file() {
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("broken.xtc");

    let mut corrupted = PackedPage::blank(480, 800);
    corrupted.data.pop();
    let pages: Vec<Page> = vec![
        BitmapPage::from_gray_image(striped_page(0)).into(),
        corrupted.into(),
    ];

    let result = ContainerAssembler::new(sample_config())
        .and_then(|assembler| assembler.assemble(pages, "Broken"))
        .and_then(|container| write_atomic(&container, &dest));

    assert!(matches!(
        result,
        Err(XtcError::SizeMismatch {
            page: Some(1),
            expected: 48000,
            actual: 47999,
        })
    ));
    assert!(!dest.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_written_file_parses() {
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("book.xtc");

    let container = ContainerAssembler::new(sample_config())
        .unwrap()
        .assemble((0..2).map(striped_page), "On disk")
        .unwrap();
    write_atomic(&container, &dest).unwrap();

    let bytes = std::fs::read(&dest).unwrap();
    let reader = XtcReader::parse(&bytes).unwrap();
    assert_eq!(reader.page_count(), 2);
    assert_eq!(reader.title(), "On disk");
}
