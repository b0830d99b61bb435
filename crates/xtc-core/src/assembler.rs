//! Container assembly: pages in, complete XTC byte stream out.
//!
//! Assembly runs in a fixed order:
//!
//! 1. Validate the page count and every page's resolution
//! 2. Encode all pages to XTG blobs (optionally on worker threads)
//! 3. Compute section offsets and the index table in one ordered pass
//! 4. Emit header, metadata, index table and blobs, in that order
//!
//! Nothing is written anywhere until every page has been encoded, so a
//! failed assembly never leaves a partial container behind.

use std::io::Write;

use tracing::{debug, info};

use crate::blob::{encode_page, PageBlob};
use crate::config::XtcConfig;
use crate::error::{Section, XtcError};
use crate::format::{IndexEntry, XtcHeader, XTC_MAGIC, XTC_VERSION};
use crate::layout::{index_blobs, SectionLayout};
use crate::metadata::MetadataBlock;
use crate::monochrome::MonochromeMode;
use crate::page::Page;

/// A fully assembled container, ready to be written.
///
/// Index entries and blobs are stored as pairs in page order. The pairs
/// are produced together by one offset accumulation and cannot be
/// reordered afterwards, so the index always points at real blob
/// boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    header: XtcHeader,
    metadata: MetadataBlock,
    pages: Vec<(IndexEntry, PageBlob)>,
    len: u64,
}

impl Container {
    pub fn header(&self) -> &XtcHeader {
        &self.header
    }

    /// Title as stored in the metadata block.
    pub fn title(&self) -> &str {
        self.metadata.title()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn index_entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.pages.iter().map(|(entry, _)| entry)
    }

    pub fn blobs(&self) -> impl Iterator<Item = &PageBlob> {
        self.pages.iter().map(|(_, blob)| blob)
    }

    /// Total size of the serialized container in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Always false; a container holds at least one page.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Write the container section by section.
    ///
    /// # Errors
    ///
    /// Returns `XtcError::WriteFailure` naming the section being written
    /// when the writer fails. Bytes already accepted by `writer` are not
    /// rolled back; use [`crate::write_atomic`] for files.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), XtcError> {
        self.header
            .write_to(writer)
            .map_err(|e| XtcError::write(Section::Header, e))?;

        writer
            .write_all(self.metadata.as_bytes())
            .map_err(|e| XtcError::write(Section::Metadata, e))?;

        for entry in self.index_entries() {
            writer
                .write_all(&entry.to_bytes())
                .map_err(|e| XtcError::write(Section::Index, e))?;
        }

        for blob in self.blobs() {
            blob.write_to(writer)
                .map_err(|e| XtcError::write(Section::Data, e))?;
        }

        debug!(bytes = self.len, "Container written");
        Ok(())
    }

    /// Serialize the container into a single buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(self.len as usize);

        buffer.extend_from_slice(&self.header.to_bytes());
        buffer.extend_from_slice(self.metadata.as_bytes());
        for entry in self.index_entries() {
            buffer.extend_from_slice(&entry.to_bytes());
        }
        for blob in self.blobs() {
            buffer.extend_from_slice(&blob.to_bytes());
        }

        debug_assert_eq!(buffer.len() as u64, self.len);
        buffer
    }
}

/// Builds containers with one fixed configuration.
#[derive(Debug, Clone)]
pub struct ContainerAssembler {
    config: XtcConfig,
}

impl ContainerAssembler {
    /// Create an assembler after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns `XtcError::InvalidConfig` if the configuration is unusable.
    pub fn new(config: XtcConfig) -> Result<Self, XtcError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &XtcConfig {
        &self.config
    }

    /// Assemble pages, in the given order, into a container.
    ///
    /// # Arguments
    ///
    /// * `pages` - Pages in reading order; each must match the configured resolution
    /// * `title` - Title stored in the metadata block
    ///
    /// # Errors
    ///
    /// * `XtcError::InputEmpty` - no pages
    /// * `XtcError::PageCountOverflow` - more than 65535 pages
    /// * `XtcError::TitleTooLong` - title too long under `TitlePolicy::Reject`
    /// * `XtcError::ResolutionMismatch` - a page has the wrong size
    /// * `XtcError::SizeMismatch` - a packed page has the wrong byte length
    /// * `XtcError::PixelBufferMismatch` - a bitmap page's luma buffer is the wrong length
    pub fn assemble<I, P>(&self, pages: I, title: &str) -> Result<Container, XtcError>
    where
        I: IntoIterator<Item = P>,
        P: Into<Page>,
    {
        let pages: Vec<Page> = pages.into_iter().map(Into::into).collect();

        let layout = SectionLayout::for_page_count(pages.len())?;
        let metadata = MetadataBlock::new(title, self.config.title_policy)?;
        self.check_resolution(&pages)?;

        let blobs = encode_pages(&pages, self.config.monochrome, self.config.encode_threads)?;
        let (pages, len) = index_blobs(&layout, blobs)?;

        let header = XtcHeader {
            magic: XTC_MAGIC,
            version: XTC_VERSION,
            page_count: layout.page_count,
            reading_direction: self.config.reading_direction,
            has_metadata: true,
            has_thumbnails: false,
            has_chapters: false,
            current_page: 0,
            metadata_offset: layout.metadata_offset,
            index_offset: layout.index_offset,
            data_offset: layout.data_offset,
            thumbnails_offset: 0,
            chapters_offset: 0,
        };

        info!(
            pages = pages.len(),
            bytes = len,
            title = metadata.title(),
            "Assembled XTC container"
        );

        Ok(Container {
            header,
            metadata,
            pages,
            len,
        })
    }

    fn check_resolution(&self, pages: &[Page]) -> Result<(), XtcError> {
        let expected = self.config.resolution();
        match pages
            .iter()
            .enumerate()
            .find(|(_, page)| page.dimensions() != expected)
        {
            Some((page, mismatched)) => Err(XtcError::ResolutionMismatch {
                page,
                expected,
                actual: mismatched.dimensions(),
            }),
            None => Ok(()),
        }
    }
}

/// Assemble pages into a complete XTC byte stream.
///
/// Convenience wrapper around [`ContainerAssembler`] for one-off use.
pub fn assemble_container<I, P>(config: XtcConfig, pages: I, title: &str) -> Result<Vec<u8>, XtcError>
where
    I: IntoIterator<Item = P>,
    P: Into<Page>,
{
    let assembler = ContainerAssembler::new(config)?;
    Ok(assembler.assemble(pages, title)?.to_bytes())
}

/// Encode pages in order, splitting them into contiguous chunks across
/// `threads` scoped workers when there is more than one.
fn encode_pages(
    pages: &[Page],
    mode: MonochromeMode,
    threads: usize,
) -> Result<Vec<PageBlob>, XtcError> {
    if threads <= 1 || pages.len() <= 1 {
        return encode_chunk(pages, 0, mode);
    }

    let chunk_size = pages.len().div_ceil(threads);
    debug!(
        pages = pages.len(),
        workers = pages.len().div_ceil(chunk_size),
        "Encoding pages in parallel"
    );

    std::thread::scope(|scope| {
        let handles: Vec<_> = pages
            .chunks(chunk_size)
            .enumerate()
            .map(|(chunk, slice)| {
                scope.spawn(move || encode_chunk(slice, chunk * chunk_size, mode))
            })
            .collect();

        let mut blobs = Vec::with_capacity(pages.len());
        for handle in handles {
            match handle.join() {
                Ok(chunk) => blobs.extend(chunk?),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
        Ok(blobs)
    })
}

fn encode_chunk(
    pages: &[Page],
    first_index: usize,
    mode: MonochromeMode,
) -> Result<Vec<PageBlob>, XtcError> {
    pages
        .iter()
        .enumerate()
        .map(|(i, page)| {
            let index = first_index + i;
            let blob = encode_page(page, mode).map_err(|e| e.at_page(index))?;
            debug!(page = index, bytes = blob.len(), "Encoded page");
            Ok(blob)
        })
        .collect()
}


// ============================================================================
// Property-Based Tests
// ============================================================================
