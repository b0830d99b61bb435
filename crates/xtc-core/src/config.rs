//! Assembler configuration.

use serde::{Deserialize, Serialize};

use crate::error::XtcError;
use crate::format::ReadingDirection;
use crate::monochrome::MonochromeMode;

/// Target width of the reference reader's panel.
pub const DEFAULT_WIDTH: u32 = 480;

/// Target height of the reference reader's panel.
pub const DEFAULT_HEIGHT: u32 = 800;

/// What to do with a title longer than the metadata block allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TitlePolicy {
    /// Cut at the last UTF-8 character boundary that fits.
    #[default]
    Truncate,
    /// Fail with `XtcError::TitleTooLong`.
    Reject,
}

/// Settings for one container.
///
/// Passed to [`crate::ContainerAssembler::new`]; several assemblers with
/// different settings can run side by side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XtcConfig {
    /// Page width every page must have, in pixels.
    pub width: u32,
    /// Page height every page must have, in pixels.
    pub height: u32,
    pub reading_direction: ReadingDirection,
    /// Grayscale to 1-bit reduction applied to every bitmap page.
    pub monochrome: MonochromeMode,
    pub title_policy: TitlePolicy,
    /// Worker threads used to encode pages. 1 encodes on the calling thread.
    pub encode_threads: usize,
}

impl Default for XtcConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            reading_direction: ReadingDirection::default(),
            monochrome: MonochromeMode::default(),
            title_policy: TitlePolicy::default(),
            encode_threads: 1,
        }
    }
}

impl XtcConfig {
    /// Create a config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_reading_direction(mut self, direction: ReadingDirection) -> Self {
        self.reading_direction = direction;
        self
    }

    pub fn with_monochrome(mut self, mode: MonochromeMode) -> Self {
        self.monochrome = mode;
        self
    }

    pub fn with_title_policy(mut self, policy: TitlePolicy) -> Self {
        self.title_policy = policy;
        self
    }

    pub fn with_encode_threads(mut self, threads: usize) -> Self {
        self.encode_threads = threads;
        self
    }

    /// Target resolution as `(width, height)`.
    #[inline]
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Check that every setting can be honored.
    ///
    /// # Errors
    ///
    /// Returns `XtcError::InvalidConfig` if a dimension is zero or does not
    /// fit the 16-bit header fields, or if `encode_threads` is zero.
    pub fn validate(&self) -> Result<(), XtcError> {
        if self.width == 0 || self.height == 0 {
            return Err(XtcError::InvalidConfig(format!(
                "resolution {}x{} must be non-zero",
                self.width, self.height
            )));
        }
        if self.width > u16::MAX as u32 || self.height > u16::MAX as u32 {
            return Err(XtcError::InvalidConfig(format!(
                "resolution {}x{} exceeds {} pixels per side",
                self.width,
                self.height,
                u16::MAX
            )));
        }
        if self.encode_threads == 0 {
            return Err(XtcError::InvalidConfig(
                "encode_threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = XtcConfig::new();
        assert_eq!(config.resolution(), (480, 800));
        assert_eq!(config.reading_direction, ReadingDirection::RightToLeft);
        assert_eq!(config.monochrome, MonochromeMode::FloydSteinberg);
        assert_eq!(config.title_policy, TitlePolicy::Truncate);
        assert_eq!(config.encode_threads, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = XtcConfig::new()
            .with_resolution(600, 800)
            .with_reading_direction(ReadingDirection::LeftToRight)
            .with_monochrome(MonochromeMode::threshold())
            .with_title_policy(TitlePolicy::Reject)
            .with_encode_threads(4);

        assert_eq!(config.resolution(), (600, 800));
        assert_eq!(config.reading_direction, ReadingDirection::LeftToRight);
        assert_eq!(config.monochrome, MonochromeMode::Threshold { level: 128 });
        assert_eq!(config.title_policy, TitlePolicy::Reject);
        assert_eq!(config.encode_threads, 4);
    }

    #[test]
    fn test_validate_zero_resolution() {
        let config = XtcConfig::new().with_resolution(0, 800);
        assert!(matches!(config.validate(), Err(XtcError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_oversized_resolution() {
        let config = XtcConfig::new().with_resolution(480, 70_000);
        assert!(matches!(config.validate(), Err(XtcError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_zero_threads() {
        let config = XtcConfig::new().with_encode_threads(0);
        assert!(matches!(config.validate(), Err(XtcError::InvalidConfig(_))));
    }
}
