//! XTC Core - e-reader page container codec
//!
//! This crate turns a sequence of page images into a single XTC container
//! for monochrome e-ink readers, and reads such containers back. Each page
//! becomes an XTG blob holding a packed 1-bit plane; the container adds a
//! fixed header, a metadata block with the title, and an index table for
//! random page access.

pub mod assembler;
pub mod blob;
pub mod config;
pub mod error;
pub mod format;
pub mod layout;
pub mod luminance;
pub mod metadata;
pub mod monochrome;
pub mod page;
pub mod prepare;
pub mod reader;
#[cfg(feature = "fs")]
pub mod sink;

pub use assembler::{assemble_container, Container, ContainerAssembler};
pub use blob::{encode_page, PageBlob};
pub use config::{TitlePolicy, XtcConfig};
pub use error::{ReadError, Section, XtcError};
pub use format::ReadingDirection;
pub use monochrome::MonochromeMode;
pub use page::{BitmapPage, PackedPage, Page};
pub use prepare::{fit_to_resolution, FilterType};
pub use reader::{PageView, XtcReader};
#[cfg(feature = "fs")]
pub use sink::write_atomic;
