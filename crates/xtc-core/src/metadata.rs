//! The fixed 256-byte metadata block.

use tracing::warn;

use crate::config::TitlePolicy;
use crate::error::XtcError;
use crate::format::{MAX_TITLE_BYTES, METADATA_SIZE};

/// Metadata block: zero-filled, title at offset 0.
///
/// Creation time and chapter count are left at zero so the same input
/// always produces the same bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataBlock {
    bytes: [u8; METADATA_SIZE],
    title_len: usize,
}

impl MetadataBlock {
    /// Build the block for `title` under the given policy.
    ///
    /// # Errors
    ///
    /// Returns `XtcError::TitleTooLong` when the title exceeds
    /// [`MAX_TITLE_BYTES`] and the policy is `TitlePolicy::Reject`.
    pub fn new(title: &str, policy: TitlePolicy) -> Result<Self, XtcError> {
        let stored = match (title.len() > MAX_TITLE_BYTES, policy) {
            (false, _) => title,
            (true, TitlePolicy::Reject) => {
                return Err(XtcError::TitleTooLong {
                    len: title.len(),
                    max: MAX_TITLE_BYTES,
                })
            }
            (true, TitlePolicy::Truncate) => {
                let cut = truncate_utf8(title, MAX_TITLE_BYTES);
                warn!(
                    original_bytes = title.len(),
                    stored_bytes = cut.len(),
                    "Title truncated to fit metadata block"
                );
                cut
            }
        };

        let mut bytes = [0u8; METADATA_SIZE];
        bytes[..stored.len()].copy_from_slice(stored.as_bytes());

        Ok(Self {
            bytes,
            title_len: stored.len(),
        })
    }

    /// The title as stored (possibly truncated).
    pub fn title(&self) -> &str {
        // Only ever filled from a &str cut at a char boundary.
        std::str::from_utf8(&self.bytes[..self.title_len]).unwrap_or_default()
    }

    pub fn as_bytes(&self) -> &[u8; METADATA_SIZE] {
        &self.bytes
    }
}

/// Longest prefix of `s` that is at most `max` bytes and ends on a char boundary.
pub fn truncate_utf8(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Read the title back out of a metadata block.
///
/// The title runs up to the first NUL within the first [`MAX_TITLE_BYTES`]
/// bytes. Invalid UTF-8 is replaced rather than rejected.
pub fn parse_title(block: &[u8]) -> String {
    let field = &block[..block.len().min(MAX_TITLE_BYTES)];
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}
