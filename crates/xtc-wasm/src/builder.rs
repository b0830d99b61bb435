//! Container builder WASM bindings.
//!
//! Pages are collected one at a time from JavaScript and assembled into a
//! complete XTC file by [`XtcBuilder::finish`].
//!
//! # Example
//!
//! ```typescript
//! import { XtcBuilder, JsPageImage } from '@xtc/wasm';
//!
//! const builder = new XtcBuilder(480, 800);
//! for (const page of pages) {
//!   builder.add_page(new JsPageImage(page.width, page.height, page.rgb), 2);
//! }
//! const xtc = builder.finish("Converted Comic");
//! ```

use wasm_bindgen::prelude::*;
use xtc_core::{
    fit_to_resolution, ContainerAssembler, FilterType, MonochromeMode, PackedPage, Page,
    ReadingDirection, XtcConfig, XtcError,
};

use crate::types::JsPageImage;

/// Collects pages and settings for one container.
#[wasm_bindgen]
pub struct XtcBuilder {
    config: XtcConfig,
    pages: Vec<Page>,
}

#[wasm_bindgen]
impl XtcBuilder {
    /// Create a builder for pages of `width` x `height` with default settings.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            config: XtcConfig::new().with_resolution(width, height),
            pages: Vec::new(),
        }
    }

    /// Create a builder from a plain JS object matching `XtcConfig`.
    ///
    /// Missing fields take their defaults.
    pub fn from_config(value: JsValue) -> Result<XtcBuilder, JsValue> {
        let config: XtcConfig = serde_wasm_bindgen::from_value(value)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;
        Self::with_config(config).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Current settings as a JS object.
    pub fn config_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.config).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Get whether pages turn right to left
    #[wasm_bindgen(getter)]
    pub fn right_to_left(&self) -> bool {
        self.config.reading_direction == ReadingDirection::RightToLeft
    }

    /// Set whether pages turn right to left
    #[wasm_bindgen(setter)]
    pub fn set_right_to_left(&mut self, value: bool) {
        self.config.reading_direction = if value {
            ReadingDirection::RightToLeft
        } else {
            ReadingDirection::LeftToRight
        };
    }

    /// Reduce bitmap pages with a fixed luma threshold instead of dithering.
    pub fn use_threshold(&mut self, level: u8) {
        self.config.monochrome = MonochromeMode::Threshold { level };
    }

    /// Reduce bitmap pages with Floyd-Steinberg dithering (the default).
    pub fn use_dithering(&mut self) {
        self.config.monochrome = MonochromeMode::FloydSteinberg;
    }

    /// Number of pages added so far
    #[wasm_bindgen(getter)]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Add an RGB page, resampling it to the container resolution if needed.
    ///
    /// # Arguments
    ///
    /// * `image` - The page image
    /// * `filter` - 0 = Nearest, 1 = Bilinear, 2 = Lanczos3
    pub fn add_page(&mut self, image: &JsPageImage, filter: u8) -> Result<(), JsValue> {
        self.push_image(image, FilterType::from_u8(filter))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Add a page that is already a packed 1-bit plane (MSB first, 1 = white).
    ///
    /// The plane length is checked when the container is assembled.
    pub fn add_packed_page(&mut self, width: u32, height: u32, bits: Vec<u8>) {
        self.pages.push(PackedPage::new(width, height, bits).into());
    }

    /// Assemble all pages into an XTC file.
    ///
    /// The builder is empty afterwards, whether or not assembly succeeded.
    pub fn finish(&mut self, title: &str) -> Result<Vec<u8>, JsValue> {
        self.build(title).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl XtcBuilder {
    pub(crate) fn with_config(config: XtcConfig) -> Result<Self, XtcError> {
        config.validate()?;
        Ok(Self {
            config,
            pages: Vec::new(),
        })
    }

    pub(crate) fn push_image(
        &mut self,
        image: &JsPageImage,
        filter: FilterType,
    ) -> Result<(), XtcError> {
        if !image.is_well_formed() {
            return Err(XtcError::InvalidConfig(format!(
                "page {} has {} bytes, expected {}x{} RGB",
                self.pages.len(),
                image.byte_length(),
                image.width(),
                image.height()
            )));
        }

        let page = image.to_bitmap_page();
        let (width, height) = self.config.resolution();
        let page = fit_to_resolution(&page, width, height, filter)?;
        self.pages.push(page.into());
        Ok(())
    }

    pub(crate) fn build(&mut self, title: &str) -> Result<Vec<u8>, XtcError> {
        let pages = std::mem::take(&mut self.pages);
        // No worker threads on wasm32
        let config = self.config.clone().with_encode_threads(1);
        let container = ContainerAssembler::new(config)?.assemble(pages, title)?;
        Ok(container.to_bytes())
    }
}
