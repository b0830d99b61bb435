//! XTC WASM - WebAssembly bindings for the XTC container codec
//!
//! This crate exposes xtc-core to JavaScript/TypeScript so a browser can
//! turn page images into XTC files for e-ink readers and inspect existing
//! files.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper for RGB page images
//! - `builder` - Page collection and container assembly
//! - `inspect` - Container parsing, summaries and page previews
//!
//! # Usage
//!
//! ```typescript
//! import init, { XtcBuilder, JsPageImage, inspect_xtc } from '@xtc/wasm';
//!
//! await init();
//!
//! const builder = new XtcBuilder(480, 800);
//! builder.add_page(new JsPageImage(width, height, rgb), 2);
//! const bytes = builder.finish("Converted Comic");
//! console.log(inspect_xtc(bytes).page_count);
//! ```

use wasm_bindgen::prelude::*;

mod builder;
mod inspect;
mod types;

// Re-export public types
pub use builder::XtcBuilder;
pub use inspect::{inspect_xtc, render_xtc_page, render_xtc_page_png, ContainerSummary, PageSummary};
pub use types::JsPageImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
