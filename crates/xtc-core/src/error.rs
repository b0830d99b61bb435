//! Error types for container assembly and parsing.

use thiserror::Error;

/// Container section a write failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Header,
    Metadata,
    Index,
    Data,
    /// Flushing, syncing or renaming the finished file.
    Commit,
}

impl Section {
    /// Lowercase section name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Section::Header => "header",
            Section::Metadata => "metadata",
            Section::Index => "index table",
            Section::Data => "data area",
            Section::Commit => "commit",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors that can occur while encoding pages or assembling a container.
#[derive(Debug, Error)]
pub enum XtcError {
    /// No pages were supplied.
    #[error("Cannot assemble a container from zero pages")]
    InputEmpty,

    /// A page is not at the container's target resolution.
    #[error(
        "Page {page} is {}x{}, expected {}x{}",
        .actual.0, .actual.1, .expected.0, .expected.1
    )]
    ResolutionMismatch {
        page: usize,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// Packed bit-plane length disagrees with `ceil(width / 8) * height`.
    #[error("{}bit-plane size mismatch: expected {expected} bytes, got {actual}", page_prefix(.page))]
    SizeMismatch {
        page: Option<usize>,
        expected: usize,
        actual: usize,
    },

    /// Luma buffer length disagrees with `width * height`.
    #[error("{}pixel buffer mismatch: expected {expected} pixels, got {actual}", page_prefix(.page))]
    PixelBufferMismatch {
        page: Option<usize>,
        expected: usize,
        actual: usize,
    },

    /// More pages than the 16-bit page count field can describe.
    #[error("Page count {count} exceeds the maximum of {max}")]
    PageCountOverflow { count: usize, max: usize },

    /// Title longer than the metadata block allows (only with `TitlePolicy::Reject`).
    #[error("Title is {len} bytes, the metadata block holds at most {max}")]
    TitleTooLong { len: usize, max: usize },

    /// The destination rejected or only partially accepted the byte stream.
    #[error("Failed to write {section}: {source}")]
    WriteFailure {
        section: Section,
        #[source]
        source: std::io::Error,
    },

    /// The assembler configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl XtcError {
    /// Attach a page index to a page-scoped error that does not carry one yet.
    pub(crate) fn at_page(self, index: usize) -> Self {
        match self {
            XtcError::SizeMismatch {
                page: None,
                expected,
                actual,
            } => XtcError::SizeMismatch {
                page: Some(index),
                expected,
                actual,
            },
            XtcError::PixelBufferMismatch {
                page: None,
                expected,
                actual,
            } => XtcError::PixelBufferMismatch {
                page: Some(index),
                expected,
                actual,
            },
            XtcError::ResolutionMismatch {
                expected, actual, ..
            } => XtcError::ResolutionMismatch {
                page: index,
                expected,
                actual,
            },
            other => other,
        }
    }

    pub(crate) fn write(section: Section, source: std::io::Error) -> Self {
        XtcError::WriteFailure { section, source }
    }
}

fn page_prefix(page: &Option<usize>) -> String {
    match page {
        Some(index) => format!("Page {index}: "),
        None => String::new(),
    }
}

/// Errors that can occur while parsing an XTC container.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The input ends before a structure it claims to contain.
    #[error("Truncated container: {what} needs {needed} bytes at offset {offset}, file is {len} bytes")]
    Truncated {
        what: &'static str,
        offset: u64,
        needed: u64,
        len: u64,
    },

    /// A magic marker did not match.
    #[error("Invalid {what} magic: expected {expected:#010x}, got {actual:#010x}")]
    InvalidMagic {
        what: &'static str,
        expected: u32,
        actual: u32,
    },

    /// The header carries a version this reader does not understand.
    #[error("Unsupported container version {0:#06x}")]
    UnsupportedVersion(u16),

    /// Section offsets or index entries do not describe a sound layout.
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// A page blob header disagrees with its index entry or its payload.
    #[error("Invalid blob for page {page}: {reason}")]
    InvalidBlob { page: usize, reason: String },

    /// Requested page index is past the end of the index table.
    #[error("Page {index} out of range (container has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },

    /// Converting a page to an image failed.
    #[error("Image error: {0}")]
    Image(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_mismatch_display_with_page() {
        let err = XtcError::SizeMismatch {
            page: Some(2),
            expected: 48000,
            actual: 47999,
        };
        assert_eq!(
            err.to_string(),
            "Page 2: bit-plane size mismatch: expected 48000 bytes, got 47999"
        );
    }

    #[test]
    fn test_size_mismatch_display_without_page() {
        let err = XtcError::SizeMismatch {
            page: None,
            expected: 10,
            actual: 12,
        };
        assert_eq!(
            err.to_string(),
            "bit-plane size mismatch: expected 10 bytes, got 12"
        );
    }

    #[test]
    fn test_at_page_fills_missing_index() {
        let err = XtcError::SizeMismatch {
            page: None,
            expected: 1,
            actual: 2,
        }
        .at_page(7);
        assert!(matches!(err, XtcError::SizeMismatch { page: Some(7), .. }));
    }

    #[test]
    fn test_at_page_keeps_existing_index() {
        let err = XtcError::SizeMismatch {
            page: Some(3),
            expected: 1,
            actual: 2,
        }
        .at_page(7);
        assert!(matches!(err, XtcError::SizeMismatch { page: Some(3), .. }));
    }

    #[test]
    fn test_pixel_buffer_mismatch_display() {
        let err = XtcError::PixelBufferMismatch {
            page: None,
            expected: 32,
            actual: 31,
        }
        .at_page(1);
        assert_eq!(
            err.to_string(),
            "Page 1: pixel buffer mismatch: expected 32 pixels, got 31"
        );
    }

    #[test]
    fn test_resolution_mismatch_display() {
        let err = XtcError::ResolutionMismatch {
            page: 0,
            expected: (480, 800),
            actual: (600, 800),
        };
        assert_eq!(err.to_string(), "Page 0 is 600x800, expected 480x800");
    }

    #[test]
    fn test_write_failure_names_section() {
        let err = XtcError::write(
            Section::Index,
            std::io::Error::new(std::io::ErrorKind::WriteZero, "disk full"),
        );
        assert_eq!(err.to_string(), "Failed to write index table: disk full");
    }

    #[test]
    fn test_read_error_display() {
        let err = ReadError::PageOutOfRange { index: 5, count: 3 };
        assert_eq!(err.to_string(), "Page 5 out of range (container has 3 pages)");

        let err = ReadError::UnsupportedVersion(0x0200);
        assert_eq!(err.to_string(), "Unsupported container version 0x0200");
    }
}
